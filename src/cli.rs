use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Debug logging for prodsearch. RUST_LOG overrides this.
    #[clap(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search products by free text
    Search {
        /// What you are looking for
        query: String,

        /// One of: laptops, smartphones, tablets, audio
        #[clap(short, long)]
        category: Option<String>,

        /// Lowest acceptable price
        #[clap(long)]
        min_price: Option<f64>,

        /// Highest acceptable price
        #[clap(long)]
        max_price: Option<f64>,

        /// Number of results. Defaults to search.default_top_k.
        #[clap(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Products similar to a given product
    Similar {
        /// Product id
        id: String,

        /// Only recommend products of this category
        #[clap(short, long)]
        category: Option<String>,

        /// Number of results. Defaults to search.default_similar_top_k.
        #[clap(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Print a single product
    Product {
        /// Product id
        id: String,
    },
    /// Show which feature types a query mentions
    Features {
        query: String,

        #[clap(short, long)]
        category: String,
    },
}
