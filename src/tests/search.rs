use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::search::{
    Category, EmbeddingError, ErrorKind, IndexError, RetryPolicy, SearchError, SearchQuery,
    StructuredFilter,
};
use crate::tests::fakes::{
    candidate, product, service, service_with_config, EmbedMode, FakeEmbedder, FakeIndex,
};

fn ids(matches: &[crate::search::Match]) -> Vec<&str> {
    matches.iter().map(|m| m.id.as_str()).collect()
}

#[tokio::test]
async fn test_feature_boost_outranks_higher_similarity() {
    let a = product(
        "laptop-a",
        Category::Laptops,
        1800.0,
        &["RTX 4070 for gaming", "long battery life"],
    );
    let b = product("laptop-b", Category::Laptops, 700.0, &["Intel i3", "8GB RAM"]);
    let index = Arc::new(FakeIndex::new(vec![candidate(b, 0.85), candidate(a, 0.80)]));
    let embedder = Arc::new(FakeEmbedder::new());
    let service = service(embedder.clone(), index.clone());

    let query = SearchQuery::new("gaming laptop with good battery life").with_category("laptops");
    let matches = service.search(&query).await.unwrap();

    assert_eq!(ids(&matches), vec!["laptop-a", "laptop-b"]);
    assert!((matches[0].score - 2.40).abs() < 1e-5);
    assert!((matches[0].raw_score - 0.80).abs() < 1e-6);
    assert_eq!(matches[0].matched_features, vec!["battery", "gaming"]);
    assert!((matches[1].score - 0.85).abs() < 1e-6);
    assert!(matches[1].matched_features.is_empty());
    assert_eq!(embedder.calls(), 1);
}

#[tokio::test]
async fn test_price_filter_applied_after_oversampling() {
    let prices = [450.0, 899.0, 300.0, 650.0, 500.0, 120.0];
    let candidates = prices
        .iter()
        .enumerate()
        .map(|(i, price)| {
            candidate(
                product(&format!("tablet-{}", i), Category::Tablets, *price, &[]),
                0.9 - i as f32 * 0.1,
            )
        })
        .collect();
    let index = Arc::new(FakeIndex::new(candidates));
    let service = service(Arc::new(FakeEmbedder::new()), index.clone());

    let query = SearchQuery::new("cheap tablet")
        .with_category("tablets")
        .with_min_price(0.0)
        .with_max_price(500.0)
        .with_top_k(3);
    let matches = service.search(&query).await.unwrap();

    // 899 and 650 are dropped, the 500 boundary is kept
    assert_eq!(ids(&matches), vec!["tablet-0", "tablet-2", "tablet-4"]);
    assert!(matches.iter().all(|m| m.product.price <= 500.0));

    let queries = index.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].0, 6);
    assert_eq!(
        queries[0].1,
        Some(StructuredFilter {
            category: Some(Category::Tablets),
            min_price: Some(0.0),
            max_price: Some(500.0),
            exclude_id: None,
        })
    );
}

#[tokio::test]
async fn test_unknown_category_makes_no_external_calls() {
    let embedder = Arc::new(FakeEmbedder::new());
    let index = Arc::new(FakeIndex::default());
    let service = service(embedder.clone(), index.clone());

    let err = service
        .search(&SearchQuery::new("x").with_category("drones"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidCategory);
    assert!(err.to_string().contains("laptops, smartphones, tablets, audio"));
    assert_eq!(embedder.calls(), 0);
    assert!(index.queries().is_empty());
}

#[tokio::test]
async fn test_fewer_survivors_than_top_k() {
    let candidates = vec![
        candidate(product("phone-1", Category::Smartphones, 400.0, &[]), 0.9),
        candidate(
            product("audio-1", Category::Audio, 199.0, &["Studio sound"]),
            0.8,
        ),
        candidate(product("phone-2", Category::Smartphones, 900.0, &[]), 0.7),
        candidate(
            product("audio-2", Category::Audio, 349.0, &["Active noise cancellation"]),
            0.6,
        ),
    ];
    let index = Arc::new(FakeIndex::new(candidates));
    let service = service(Arc::new(FakeEmbedder::new()), index.clone());

    let query = SearchQuery::new("quiet headphones")
        .with_category("audio")
        .with_top_k(5);
    let matches = service.search(&query).await.unwrap();

    // the filter is re-applied even though the index ignored it
    assert_eq!(ids(&matches), vec!["audio-2", "audio-1"]);
    assert_eq!(matches[0].matched_features, vec!["noise"]);
    assert_eq!(index.queries()[0].0, 10);
}

#[tokio::test]
async fn test_empty_index_result_is_not_an_error() {
    let service = service(Arc::new(FakeEmbedder::new()), Arc::new(FakeIndex::new(vec![])));
    let matches = service.search(&SearchQuery::new("anything")).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_without_category_no_features_and_no_filter() {
    let candidates = vec![
        candidate(product("a", Category::Audio, 10.0, &["gaming"]), 0.5),
        candidate(product("b", Category::Laptops, 10.0, &["gaming"]), 0.6),
    ];
    let index = Arc::new(FakeIndex::new(candidates));
    let service = service(Arc::new(FakeEmbedder::new()), index.clone());

    let matches = service
        .search(&SearchQuery::new("gaming laptop"))
        .await
        .unwrap();

    // no category, so ordering is the pure similarity order
    assert_eq!(ids(&matches), vec!["b", "a"]);
    assert!((matches[0].score - 0.6).abs() < 1e-6);
    assert_eq!(index.queries()[0].1, None);
}

#[tokio::test]
async fn test_equal_scores_keep_index_order() {
    let candidates = vec![
        candidate(product("first", Category::Audio, 10.0, &[]), 0.7),
        candidate(product("second", Category::Audio, 10.0, &[]), 0.7),
        candidate(product("third", Category::Audio, 10.0, &[]), 0.7),
    ];
    let service = service(Arc::new(FakeEmbedder::new()), Arc::new(FakeIndex::new(candidates)));

    let matches = service
        .search(&SearchQuery::new("speaker").with_category("audio"))
        .await
        .unwrap();
    assert_eq!(ids(&matches), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_invalid_requests_fail_fast() {
    let embedder = Arc::new(FakeEmbedder::new());
    let index = Arc::new(FakeIndex::default());
    let service = service(embedder.clone(), index.clone());

    let cases = [
        (SearchQuery::new("   "), ErrorKind::InvalidQuery),
        (SearchQuery::new("tablet").with_top_k(0), ErrorKind::InvalidQuery),
        (
            SearchQuery::new("tablet").with_min_price(-1.0),
            ErrorKind::InvalidQuery,
        ),
        (
            SearchQuery::new("tablet")
                .with_min_price(600.0)
                .with_max_price(500.0),
            ErrorKind::InvalidPriceRange,
        ),
        (
            SearchQuery::new("tablet").with_category("Tablets "),
            ErrorKind::InvalidCategory,
        ),
    ];

    for (query, kind) in cases {
        let err = service.search(&query).await.unwrap_err();
        assert_eq!(err.kind(), kind, "query: {:?}", query);
        assert!(!err.is_retryable());
    }

    assert_eq!(embedder.calls(), 0);
    assert!(index.queries().is_empty());
}

#[tokio::test]
async fn test_embedding_failure() {
    let index = Arc::new(FakeIndex::default());
    let service = service(Arc::new(FakeEmbedder::with_mode(EmbedMode::Fail)), index.clone());

    let err = service.search(&SearchQuery::new("tablet")).await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::EmbeddingFailure(EmbeddingError::EmbeddingFailed(_))
    ));
    assert!(err.is_retryable());
    assert!(index.queries().is_empty());
}

#[tokio::test]
async fn test_malformed_embedding_is_rejected() {
    for (mode, got) in [(EmbedMode::WrongDimensions, 17), (EmbedMode::Empty, 0)] {
        let index = Arc::new(FakeIndex::default());
        let service = service(Arc::new(FakeEmbedder::with_mode(mode)), index.clone());

        let err = service.search(&SearchQuery::new("tablet")).await.unwrap_err();
        assert!(
            matches!(
                err,
                SearchError::EmbeddingFailure(EmbeddingError::Malformed { expected: 16, got: g }) if g == got
            ),
            "unexpected error: {:?}",
            err
        );
        assert!(index.queries().is_empty());
    }
}

#[tokio::test]
async fn test_embedding_timeout() {
    let config = SearchConfig {
        call_timeout_ms: 20,
        ..Default::default()
    };
    let embedder = Arc::new(FakeEmbedder::with_mode(EmbedMode::Slow(Duration::from_secs(5))));
    let index = Arc::new(FakeIndex::default());
    let service = service_with_config(config, embedder, index.clone());

    let err = service.search(&SearchQuery::new("tablet")).await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::EmbeddingFailure(EmbeddingError::Timeout(_))
    ));
    assert!(err.is_retryable());
    assert!(index.queries().is_empty());
}

#[tokio::test]
async fn test_index_failure() {
    let service = service(Arc::new(FakeEmbedder::new()), Arc::new(FakeIndex::failing()));

    let err = service.search(&SearchQuery::new("tablet")).await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::IndexUnavailable {
            operation: "query",
            source: IndexError::Backend(_)
        }
    ));
    assert_eq!(err.kind(), ErrorKind::IndexUnavailable);
}

#[tokio::test]
async fn test_oversample_factor_from_config() {
    let config = SearchConfig {
        oversample_factor: 3,
        ..Default::default()
    };
    let index = Arc::new(FakeIndex::new(vec![]));
    let service = service_with_config(config, Arc::new(FakeEmbedder::new()), index.clone());

    service
        .search(&SearchQuery::new("tablet").with_top_k(4))
        .await
        .unwrap();
    assert_eq!(index.queries()[0].0, 12);
    assert_eq!(service.oversampled(4), 12);
}

#[tokio::test]
async fn test_retry_policy_reruns_index_failures() {
    let index = Arc::new(FakeIndex::failing());
    let embedder = Arc::new(FakeEmbedder::new());
    let service = service(embedder.clone(), index.clone());
    let retry = RetryPolicy::new(3, Duration::from_millis(1));

    let service = &service;
    let query = SearchQuery::new("tablet");
    let query = &query;
    let result = retry
        .run("search", move || async move { service.search(query).await })
        .await;

    assert!(result.is_err());
    assert_eq!(index.queries().len(), 3);
    assert_eq!(embedder.calls(), 3);
}

#[tokio::test]
async fn test_retry_policy_skips_validation_errors() {
    let embedder = Arc::new(FakeEmbedder::new());
    let service = service(embedder.clone(), Arc::new(FakeIndex::default()));
    let retry = RetryPolicy::new(3, Duration::from_millis(1));

    let service = &service;
    let query = SearchQuery::new("x").with_category("drones");
    let query = &query;
    let err = retry
        .run("search", move || async move { service.search(query).await })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidCategory);
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_searches_share_service() {
    let candidates = vec![
        candidate(product("tab", Category::Tablets, 300.0, &["Apple Pencil stylus"]), 0.5),
        candidate(product("buds", Category::Audio, 99.0, &["gym ready"]), 0.6),
    ];
    let service = service(Arc::new(FakeEmbedder::new()), Arc::new(FakeIndex::new(candidates)));

    let tablets = SearchQuery::new("drawing tablet with stylus").with_category("tablets");
    let audio = SearchQuery::new("earbuds for the gym").with_category("audio");
    let (tablets, audio) = tokio::join!(service.search(&tablets), service.search(&audio));

    assert_eq!(ids(&tablets.unwrap()), vec!["tab"]);
    let audio = audio.unwrap();
    assert_eq!(ids(&audio), vec!["buds"]);
    assert_eq!(audio[0].matched_features, vec!["sports"]);
}

#[tokio::test]
async fn test_extract_features() {
    let service = service(Arc::new(FakeEmbedder::new()), Arc::new(FakeIndex::default()));

    let features = service
        .extract_features("phone with a great camera and 5G", Some("smartphones"))
        .unwrap();
    assert!(features.contains("camera"));
    assert!(features.contains("5g"));

    assert!(service.extract_features("anything", None).unwrap().is_empty());
    assert!(matches!(
        service.extract_features("anything", Some("drones")),
        Err(SearchError::InvalidCategory(_))
    ));
}
