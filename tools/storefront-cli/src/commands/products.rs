//! Catalog commands.

use anyhow::{bail, Result};
use storefront_commerce::prelude::*;
use storefront_data::ProductQuery;
use storefront_store::Storefront;

use super::{api_error, ListArgs, ProductsArgs, ProductsCommand};
use crate::context::Context;
use crate::output::{rating_stars, stock_badge};

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ProductsCommand::List(list) => list_products(list, ctx).await,
        ProductsCommand::Show { id } => show_product(&ProductId::new(id), ctx).await,
        ProductsCommand::Related { id, limit } => related_products(&ProductId::new(id), limit, ctx).await,
        ProductsCommand::Categories { active } => list_categories(active, ctx).await,
    }
}

async fn list_products(args: ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.storefront()?;

    let spinner = ctx.output.spinner("Fetching products...");
    let result = match &args.category {
        Some(category) => store.fetch_products_by_category(category).await,
        None => store.fetch_products(&ProductQuery::default()).await,
    };
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    let sort = SortOption::parse(&args.sort);
    if sort == SortOption::Unsorted {
        ctx.output.warn(&format!("Unknown sort key '{}', keeping server order", args.sort));
    }
    let limit = args.limit.unwrap_or(ctx.config.display.page_size);

    store.dispatch(|s| -> Result<()> {
        let products = &mut s.products;
        if let Some(search) = &args.search {
            products.set_search_query(search.as_str());
        }
        products.set_filters(FilterPatch {
            brands: (!args.brands.is_empty()).then(|| args.brands.clone()),
            rating: args.rating,
            in_stock: Some(args.in_stock),
            on_sale: Some(args.on_sale),
            ..Default::default()
        })?;
        products.set_price_range(args.min_price.unwrap_or(0.0), args.max_price.unwrap_or(f64::INFINITY))?;
        products.set_sort(sort);
        products.set_page_limit(limit)?;
        products.set_page(args.page);
        Ok(())
    })?;

    let page = store.read(|s| s.products.visible());

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header("Products");
    if page.is_empty() {
        ctx.output.info("No products match.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = page
        .items
        .iter()
        .map(|product| {
            vec![
                product.id.to_string(),
                truncate_text(&product.name, 28),
                ctx.price(product.price),
                format!("{:.1}", product.rating),
                stock_badge(product),
            ]
        })
        .collect();
    ctx.output
        .table(&["ID", "NAME", "PRICE", "RATING", "STOCK"], &rows, &[8, 32, 12, 8, 16]);

    let p = page.pagination;
    ctx.output.info(&format!(
        "Page {} of {} ({} products)",
        p.page,
        p.total_pages.max(1),
        p.total
    ));
    Ok(())
}

async fn show_product(id: &ProductId, ctx: &Context) -> Result<()> {
    let store = ctx.storefront()?;

    let spinner = ctx.output.spinner("Fetching product...");
    let result = store.fetch_product(id).await;
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    let Some(product) = store.read(|s| s.products.product_by_id(id).cloned()) else {
        bail!("Product {} not found", id);
    };

    if ctx.output.is_json() {
        ctx.output.json(&product);
        return Ok(());
    }

    print_product(&product, &store, ctx);
    Ok(())
}

fn print_product(product: &Product, store: &Storefront, ctx: &Context) {
    ctx.output.header(&product.name);
    ctx.output.kv("id", product.id.as_str());
    if !product.brand.is_empty() {
        ctx.output.kv("brand", &product.brand);
    }
    ctx.output.kv("category", &product.category);

    let mut price = ctx.price(product.price);
    if let Some(original) = product.original_price.filter(|_| product.is_on_sale) {
        price = format!(
            "{} (was {}, -{}%)",
            price,
            ctx.price(original),
            product.discount_percentage()
        );
    }
    ctx.output.kv("price", &price);
    ctx.output.kv(
        "rating",
        &format!("{} ({} reviews)", rating_stars(product.rating), product.review_count),
    );
    ctx.output.kv("stock", &stock_badge(product));

    let (in_cart, favorite) = store.read(|s| {
        (
            s.cart.quantity_for_product(&product.id),
            s.favorites.is_favorite(&product.id),
        )
    });
    if in_cart > 0 {
        ctx.output.kv("in cart", &in_cart.to_string());
    }
    if favorite {
        ctx.output.kv("favorite", "yes");
    }

    if !product.description.is_empty() {
        ctx.output.kv("description", &truncate_text(&product.description, 200));
    }
    if !product.tags.is_empty() {
        ctx.output.kv("tags", &product.tags.join(", "));
    }
    for (key, value) in &product.specifications {
        ctx.output.list_item(&format!("{}: {}", key, value));
    }
}

async fn related_products(id: &ProductId, limit: Option<usize>, ctx: &Context) -> Result<()> {
    let store = ctx.storefront()?;

    let spinner = ctx.output.spinner("Fetching related products...");
    let result = store.fetch_related_products(id, limit).await;
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    let related: Vec<Product> = store.read(|s| s.products.items().to_vec());
    if ctx.output.is_json() {
        ctx.output.json(&related);
        return Ok(());
    }

    ctx.output.header(&format!("Related to {}", id));
    if related.is_empty() {
        ctx.output.info("Nothing related found.");
    }
    for product in &related {
        ctx.output
            .list_item(&format!("{} {} ({})", product.id, product.name, ctx.price(product.price)));
    }
    Ok(())
}

async fn list_categories(active_only: bool, ctx: &Context) -> Result<()> {
    let store = ctx.storefront()?;

    let spinner = ctx.output.spinner("Fetching categories...");
    let result = store.fetch_categories().await;
    spinner.finish_and_clear();
    result.map_err(api_error)?;

    let categories: Vec<_> = store.read(|s| {
        s.products
            .categories()
            .iter()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect()
    });

    if ctx.output.is_json() {
        ctx.output.json(&categories);
        return Ok(());
    }

    ctx.output.header("Categories");
    for category in &categories {
        let label = if category.is_root() {
            format!("{} ({})", category.name, category.slug)
        } else {
            format!("  {} ({})", category.name, category.slug)
        };
        ctx.output.list_item(&label);
    }
    Ok(())
}
