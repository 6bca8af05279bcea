//! Product search that blends vector similarity with keyword features.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod search;
pub mod semantic;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use search::{Match, Product, SearchError, SearchQuery, SearchService};
