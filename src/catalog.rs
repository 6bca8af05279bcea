//! Product catalog loading and index construction.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::search::{EmbeddingError, EmbeddingProvider, IndexError, Product};
use crate::semantic::{preprocess_product, MemoryIndex};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid product {id}: {reason}")]
    InvalidProduct { id: String, reason: String },

    #[error("failed to embed catalog: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("failed to index catalog: {0}")]
    Index(#[from] IndexError),
}

/// Read a JSON array of products.
pub fn load_products(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let products: Vec<Product> =
        serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    log::info!("loaded {} products from {}", products.len(), path.display());
    Ok(products)
}

/// Embed every product and store it in a fresh [`MemoryIndex`].
///
/// The whole catalog is validated before the first embedding call.
pub async fn build_index(
    products: Vec<Product>,
    embedder: &dyn EmbeddingProvider,
) -> Result<MemoryIndex, CatalogError> {
    let texts = embedding_texts(&products)?;

    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != products.len() {
        return Err(CatalogError::Embedding(EmbeddingError::EmbeddingFailed(
            format!(
                "expected {} embeddings, got {}",
                products.len(),
                embeddings.len()
            ),
        )));
    }

    let mut index = MemoryIndex::with_capacity(embedder.dimensions(), products.len());
    for (product, embedding) in products.into_iter().zip(embeddings) {
        index.insert(product, embedding)?;
    }

    log::info!("indexed {} products", index.len());
    Ok(index)
}

/// Validate the catalog and build one embedding input per product.
fn embedding_texts(products: &[Product]) -> Result<Vec<String>, CatalogError> {
    let mut seen = HashSet::with_capacity(products.len());
    let mut texts = Vec::with_capacity(products.len());

    for product in products {
        if product.id.trim().is_empty() {
            return Err(invalid(product, "id is empty"));
        }
        if !seen.insert(product.id.as_str()) {
            return Err(CatalogError::Index(IndexError::DuplicateId(product.id.clone())));
        }
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(invalid(product, "price must be a non-negative number"));
        }
        match preprocess_product(product) {
            Some(text) => texts.push(text),
            None => return Err(invalid(product, "no text to embed")),
        }
    }

    Ok(texts)
}

fn invalid(product: &Product, reason: &str) -> CatalogError {
    CatalogError::InvalidProduct {
        id: product.id.clone(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Category;

    const CATALOG: &str = r#"[
        {
            "id": "laptop-1",
            "name": "Gaming Beast",
            "description": "RTX graphics",
            "price": 1499.0,
            "category": "laptops",
            "features": ["RTX 4070", "144Hz display"],
            "brand": "Acme"
        },
        {
            "id": "audio-1",
            "name": "Quiet Buds",
            "price": 129.99,
            "category": "audio",
            "features": ["ANC"]
        }
    ]"#;

    #[test]
    fn test_load_products() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();

        let products = load_products(&path).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].category, Category::Laptops);
        assert_eq!(products[0].brand.as_deref(), Some("Acme"));
        assert_eq!(products[1].description, "");
        assert!(products[1].use_case.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = load_products(&tmp.path().join("nope.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_load_unknown_category() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id": "x", "name": "Drone", "price": 1.0, "category": "drones"}]"#,
        )
        .unwrap();

        assert!(matches!(
            load_products(&path),
            Err(CatalogError::Parse { .. })
        ));
    }
}
