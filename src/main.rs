use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use prodsearch::catalog;
use prodsearch::config::{self, Config};
use prodsearch::logging;
use prodsearch::search::{Category, FeatureExtractor, RetryPolicy, SearchQuery, SearchService};
use prodsearch::semantic::EmbeddingModel;

mod cli;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    logging::init(args.verbose);

    let base_path = config::base_path()?;
    let config = Config::load_with(&base_path)?;

    // lexicon lookups don't need the model or the catalog
    if let cli::Command::Features { query, category } = &args.command {
        return print_features(&config, query, category);
    }

    let model = EmbeddingModel::new(&config.embedding.model, config.base_path().to_path_buf())
        .context("failed to load embedding model")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(args.command, config, model))
}

async fn run(command: cli::Command, config: Config, model: EmbeddingModel) -> anyhow::Result<()> {
    let catalog_file = config.catalog_file();
    let products = catalog::load_products(&catalog_file)?;
    let index = catalog::build_index(products, &model).await?;

    let service = SearchService::new(
        config.search.clone(),
        Arc::new(config.feature_lexicon()),
        Arc::new(model),
        Arc::new(index),
    );
    let retry = RetryPolicy::from_config(&config.retry);
    let service = &service;

    match command {
        cli::Command::Search {
            query,
            category,
            min_price,
            max_price,
            top_k,
        } => {
            let query = SearchQuery {
                text: query,
                category,
                min_price,
                max_price,
                top_k: top_k.unwrap_or(config.search.default_top_k),
            };
            let query = &query;

            let matches = retry
                .run("search", move || async move { service.search(query).await })
                .await?;

            if matches.is_empty() {
                bail!("no products match the query");
            }
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }

        cli::Command::Similar {
            id,
            category,
            top_k,
        } => {
            let top_k = top_k.unwrap_or(config.search.default_similar_top_k);
            let (id, category) = (id.as_str(), category.as_deref());

            let matches = retry
                .run("similar", move || async move {
                    service.recommend_similar(id, category, top_k).await
                })
                .await?;

            if matches.is_empty() {
                bail!("no similar products found for {}", id);
            }
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }

        cli::Command::Product { id } => {
            let id = id.as_str();
            let product = retry
                .run("product", move || async move { service.get_product(id).await })
                .await?;

            match product {
                Some(product) => println!("{}", serde_json::to_string_pretty(&product)?),
                None => bail!("product {} not found", id),
            }
        }

        // answered in main before the model loads
        cli::Command::Features { .. } => unreachable!("features needs no service"),
    }

    Ok(())
}

fn print_features(config: &Config, query: &str, category: &str) -> anyhow::Result<()> {
    let category: Category = category.parse()?;
    let extractor = FeatureExtractor::new(Arc::new(config.feature_lexicon()));
    let features = extractor.extract(query, Some(category));
    println!("{}", serde_json::to_string_pretty(&features)?);
    Ok(())
}
