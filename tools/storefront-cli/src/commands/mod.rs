//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod favorites;
pub mod products;

use anyhow::anyhow;
use clap::{Args, Subcommand};
use storefront_data::FetchError;

/// Wrap an API error with its user-facing text.
pub(crate) fn api_error(err: FetchError) -> anyhow::Error {
    let message = err.user_message();
    anyhow!(err).context(message)
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List products with optional search, filters and sorting.
    List(ListArgs),
    /// Show details for one product.
    Show {
        /// Product ID.
        id: String,
    },
    /// Show products related to one product.
    Related {
        /// Product ID.
        id: String,
        /// Maximum number of products.
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List categories.
    Categories {
        /// Only active categories.
        #[arg(long)]
        active: bool,
    },
}

/// Arguments for `products list`.
#[derive(Args)]
pub struct ListArgs {
    /// Free-text search over name, description, brand and tags.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only fetch this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Only these brands (repeatable).
    #[arg(short, long = "brand")]
    pub brands: Vec<String>,

    /// Minimum price.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Minimum rating.
    #[arg(long)]
    pub rating: Option<f64>,

    /// Only products in stock.
    #[arg(long)]
    pub in_stock: bool,

    /// Only products on sale.
    #[arg(long)]
    pub on_sale: bool,

    /// Sort key: name_asc, name_desc, price_asc, price_desc, rating_desc, newest.
    #[arg(long, default_value = "newest")]
    pub sort: String,

    /// Page number.
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    pub page: i64,

    /// Products per page (default: display.page_size).
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    Show,
    /// Add a product to the cart.
    Add {
        /// Product ID.
        product_id: String,
        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Set the quantity of a cart line; 0 removes it.
    Update {
        /// Cart line ID.
        line_id: String,
        /// New quantity.
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line.
    Remove {
        /// Cart line ID.
        line_id: String,
    },
    /// Remove every line.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the favorites command.
#[derive(Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Subcommand)]
pub enum FavoritesCommand {
    /// List favorite products.
    List,
    /// Add a product to favorites.
    Add {
        /// Product ID.
        product_id: String,
    },
    /// Remove a product from favorites.
    Remove {
        /// Product ID.
        product_id: String,
    },
    /// Add or remove a product depending on its current state.
    Toggle {
        /// Product ID.
        product_id: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
