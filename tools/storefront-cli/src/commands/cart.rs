//! Cart commands.

use std::collections::HashMap;

use anyhow::{bail, Result};
use dialoguer::Confirm;
use storefront_commerce::prelude::*;
use storefront_store::Storefront;

use super::{api_error, CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let store = ctx.storefront()?;

    match args.command {
        CartCommand::Show => show_cart(&store, ctx).await,
        CartCommand::Add { product_id, quantity } => {
            add_to_cart(&store, ProductId::new(product_id), quantity, ctx).await
        }
        CartCommand::Update { line_id, quantity } => {
            update_quantity(&store, &LineItemId::new(line_id), quantity, ctx).await
        }
        CartCommand::Remove { line_id } => remove_line(&store, &LineItemId::new(line_id), ctx).await,
        CartCommand::Clear { yes } => clear_cart(&store, yes, ctx).await,
    }
}

async fn show_cart(store: &Storefront, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Fetching cart...");
    let result = store.fetch_cart().await;
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    let (items, total, count) =
        store.read(|s| (s.cart.items().to_vec(), s.cart.total_amount(), s.cart.total_items()));

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "items": items,
            "totalAmount": total,
            "totalItems": count,
        }));
        return Ok(());
    }

    ctx.output.header("Cart");
    if items.is_empty() {
        ctx.output.info("Your cart is empty.");
        return Ok(());
    }

    // Lines only carry product ids; look the names up best-effort.
    let mut names: HashMap<ProductId, String> = HashMap::new();
    for item in &items {
        if names.contains_key(&item.product_id) {
            continue;
        }
        if store.fetch_product(&item.product_id).await.is_ok() {
            if let Some(name) = store.read(|s| s.products.product_by_id(&item.product_id).map(|p| p.name.clone())) {
                names.insert(item.product_id.clone(), name);
            }
        }
    }

    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            let name = names
                .get(&item.product_id)
                .map(|n| truncate_text(n, 26))
                .unwrap_or_else(|| format!("#{}", item.product_id));
            vec![
                item.id.to_string(),
                name,
                item.quantity.to_string(),
                ctx.price(item.price),
                ctx.price(calculate_cart_total(std::slice::from_ref(item))),
            ]
        })
        .collect();
    ctx.output
        .table(&["LINE", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"], &rows, &[14, 30, 5, 12, 12]);

    println!();
    ctx.output.kv("items", &count.to_string());
    ctx.output.kv("total", &ctx.price(total));
    Ok(())
}

async fn add_to_cart(store: &Storefront, product_id: ProductId, quantity: u32, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Checking product...");
    let result = store.fetch_product(&product_id).await;
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    let Some(product) = store.read(|s| s.products.product_by_id(&product_id).cloned()) else {
        bail!("Product {} not found", product_id);
    };

    let already = store.read(|s| s.cart.quantity_for_product(&product_id));
    if !is_in_stock(&product, quantity.saturating_add(already)) {
        bail!(
            "Only {} of {} in stock ({} already in cart)",
            product.stock,
            product.name,
            already
        );
    }

    let item = NewCartLineItem::new(product_id.clone(), quantity, product.price)?;

    let spinner = ctx.output.spinner("Adding to cart...");
    let result = store.add_to_cart(item).await;
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    let (line, count) = store.read(|s| {
        (
            s.cart.item_by_product_id(&product_id).cloned(),
            s.cart.total_items(),
        )
    });

    if ctx.output.is_json() {
        ctx.output.json(&line);
    } else {
        ctx.output.success(&format!(
            "Added {} x {} ({} items in cart)",
            quantity, product.name, count
        ));
    }
    Ok(())
}

async fn update_quantity(store: &Storefront, line_id: &LineItemId, quantity: i64, ctx: &Context) -> Result<()> {
    let result = store.update_cart_quantity(line_id, quantity).await;
    result.map_err(api_error)?;

    let line = store.read(|s| s.cart.item_by_id(line_id).cloned());
    if ctx.output.is_json() {
        ctx.output.json(&line);
        return Ok(());
    }

    match line {
        Some(line) => ctx
            .output
            .success(&format!("Line {} now has quantity {}", line.id, line.quantity)),
        None => ctx.output.success(&format!("Removed line {}", line_id)),
    }
    Ok(())
}

async fn remove_line(store: &Storefront, line_id: &LineItemId, ctx: &Context) -> Result<()> {
    store.remove_from_cart(line_id).await.map_err(api_error)?;
    ctx.output.success(&format!("Removed line {}", line_id));
    Ok(())
}

async fn clear_cart(store: &Storefront, yes: bool, ctx: &Context) -> Result<()> {
    store.fetch_cart().await.map_err(api_error)?;
    let count = store.read(|s| s.cart.lines().len());
    if count == 0 {
        ctx.output.info("Cart is already empty.");
        return Ok(());
    }

    if !yes && !ctx.output.is_json() {
        let proceed = Confirm::new()
            .with_prompt(format!("Remove all {} lines from the cart?", count))
            .default(false)
            .interact()?;
        if !proceed {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Clearing cart...");
    let result = store.clear_cart().await;
    spinner.finish_and_clear();

    if let Err(err) = result {
        let left = store.read(|s| s.cart.lines().len());
        ctx.output
            .warn(&format!("Clear stopped part way; {} lines remain locally. Run `cart show` to refresh.", left));
        return Err(api_error(err));
    }

    ctx.output.success("Cart cleared");
    Ok(())
}
