//! Config command implementation.

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(ctx, force),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.output.is_json() {
        ctx.output.json(config);
        return Ok(());
    }

    ctx.output.header("Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("source", &path.display().to_string()),
        None => ctx.output.kv("source", "defaults"),
    }

    println!();
    ctx.output.header("API");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output.kv("timeout", &format!("{}s", config.api.timeout_secs));
    ctx.output.kv("user_id", &config.api.user_id);

    println!();
    ctx.output.header("Display");
    ctx.output.kv("currency", &config.display.currency);
    ctx.output.kv("locale", &config.display.locale);
    ctx.output.kv("page_size", &config.display.page_size.to_string());

    println!();
    ctx.output.header("Storage");
    ctx.output.kv("enabled", &config.storage.enabled.to_string());
    ctx.output.kv("dir", &ctx.storage_dir().display().to_string());

    println!();
    ctx.output.header("Logging");
    ctx.output.kv("format", &format!("{:?}", config.logging.format).to_lowercase());
    ctx.output.kv("level", &config.logging.level);

    Ok(())
}

fn init_config(ctx: &Context, force: bool) -> Result<()> {
    let config_path = ctx.cwd.join("storefront.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, generate_default_config())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output
        .success(&format!("Created {}", config_path.display()));
    Ok(())
}
