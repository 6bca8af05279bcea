//! Content preprocessing for embedding generation.
//!
//! Prepares product name, description and features for embedding:
//! 1. Trim whitespace
//! 2. Skip if everything is empty
//! 3. Concatenate with separator
//! 4. Truncate to max length with ellipsis

use crate::search::Product;

/// Maximum content length for embedding input (characters, not tokens)
const MAX_CONTENT_LENGTH: usize = 512;

/// Ellipsis suffix when content is truncated
const TRUNCATION_SUFFIX: &str = "...";

/// Build the text a product is embedded from.
///
/// Returns `None` if name, description and features are all empty after
/// trimming. Otherwise joins the non-empty parts as
/// `name - description - feature, feature` and truncates to
/// `MAX_CONTENT_LENGTH`.
pub fn preprocess_product(product: &Product) -> Option<String> {
    let features = product
        .features
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let parts: Vec<&str> = [product.name.trim(), product.description.trim(), features.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return None;
    }

    Some(truncate_content(&parts.join(" - ")))
}

/// Truncate content to MAX_CONTENT_LENGTH characters, adding ellipsis if truncated.
fn truncate_content(content: &str) -> String {
    if content.chars().count() <= MAX_CONTENT_LENGTH {
        return content.to_string();
    }

    let max_chars = MAX_CONTENT_LENGTH - TRUNCATION_SUFFIX.len();
    let truncated: String = content.chars().take(max_chars).collect();

    format!("{}{}", truncated, TRUNCATION_SUFFIX)
}
