//! Favorites commands.

use anyhow::Result;
use storefront_commerce::prelude::*;
use storefront_store::Storefront;

use super::{api_error, FavoritesArgs, FavoritesCommand};
use crate::context::Context;
use crate::output::stock_badge;

/// Run the favorites command.
pub async fn run(args: FavoritesArgs, ctx: &Context) -> Result<()> {
    let store = ctx.storefront()?;

    match args.command {
        FavoritesCommand::List => list_favorites(&store, ctx).await,
        FavoritesCommand::Add { product_id } => add_favorite(&store, ProductId::new(product_id), ctx).await,
        FavoritesCommand::Remove { product_id } => {
            let product_id = ProductId::new(product_id);
            store.remove_favorite(&product_id).await.map_err(api_error)?;
            ctx.output.success(&format!("Removed {} from favorites", product_id));
            Ok(())
        }
        FavoritesCommand::Toggle { product_id } => {
            let product_id = ProductId::new(product_id);
            store.fetch_favorites().await.map_err(api_error)?;
            let now_favorite = store.toggle_favorite(&product_id).await.map_err(api_error)?;
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({
                    "productId": product_id,
                    "favorite": now_favorite,
                }));
            } else if now_favorite {
                ctx.output.success(&format!("Added {} to favorites", product_id));
            } else {
                ctx.output.success(&format!("Removed {} from favorites", product_id));
            }
            Ok(())
        }
    }
}

async fn list_favorites(store: &Storefront, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Fetching favorites...");
    let result = store.fetch_favorite_products().await;
    spinner.finish_and_clear();
    let products = result.map_err(api_error)?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(&format!("Favorites ({})", products.len()));
    if products.is_empty() {
        ctx.output.info("No favorites yet.");
        return Ok(());
    }
    for product in &products {
        ctx.output.list_item(&format!(
            "{} {} {} [{}]",
            product.id,
            product.name,
            ctx.price(product.price),
            stock_badge(product)
        ));
    }
    Ok(())
}

async fn add_favorite(store: &Storefront, product_id: ProductId, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Checking product...");
    let result = store.fetch_product(&product_id).await;
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    store.fetch_favorites().await.map_err(api_error)?;
    if store.read(|s| s.favorites.is_favorite(&product_id)) {
        ctx.output.info(&format!("{} is already a favorite", product_id));
        return Ok(());
    }

    store.add_favorite(&product_id).await.map_err(api_error)?;
    ctx.output.success(&format!("Added {} to favorites", product_id));
    Ok(())
}
