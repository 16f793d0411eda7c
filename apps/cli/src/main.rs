//! # tally
//!
//! Command line front end for the Tally pricing engine.
//!
//! ```text
//! tally [--catalog <PATH>] [--json] price [--promo <CODE>]... <ITEM_CODE>...
//! tally [--catalog <PATH>] [--json] products
//! tally [--catalog <PATH>] [--json] rules
//! ```
//!
//! Results go to stdout. Logs go to stderr, filtered by `RUST_LOG`.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{Catalog, ShoppingCart};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Price shopping carts against a rule-driven catalog", long_about = None)]
struct Cli {
    /// Catalog TOML file (overrides TALLY_CATALOG and the config directory)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a cart built from catalog item codes
    Price {
        /// Promo code to enter after the items (repeatable)
        #[arg(long = "promo")]
        promo_codes: Vec<String>,

        /// Item codes in the order they are scanned
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// List the catalog's products
    Products,

    /// List the catalog's rules in pipeline order
    Rules,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let (catalog, source) = config::load_catalog(cli.catalog)?;
    debug!(%source, "Using catalog");

    match cli.cmd {
        Commands::Price { promo_codes, codes } => price(&catalog, &codes, &promo_codes, cli.json),
        Commands::Products => products(&catalog, cli.json),
        Commands::Rules => rules(&catalog, cli.json),
    }
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=trace` - Every cart re-price
/// - `RUST_LOG=tally_core=debug` - Per-rule contributions
/// - Default: `info`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Commands
// =============================================================================

fn price(catalog: &Catalog, codes: &[String], promo_codes: &[String], json: bool) -> Result<()> {
    let rules = catalog
        .rule_set()
        .with_context(|| format!("catalog '{}' has an invalid rule set", catalog.name()))?;
    let mut cart = ShoppingCart::new(rules);

    for code in codes {
        let product = catalog
            .product(code)
            .with_context(|| format!("cannot add '{}' to the cart", code))?;
        cart.add_item(product.clone())
            .with_context(|| format!("pricing failed after adding '{}'", code))?;
    }
    for promo in promo_codes {
        cart.add_promo_code(promo.as_str())
            .with_context(|| format!("pricing failed after entering promo code '{}'", promo))?;
    }

    if json {
        let out = serde_json::to_string_pretty(&cart.summary())
            .context("failed to serialize cart summary")?;
        println!("{}", out);
        return Ok(());
    }

    let summary = cart.summary();

    println!("Items ({}):", summary.item_count);
    for item in &summary.items {
        println!("  {}", item);
    }
    if !summary.promo_items.is_empty() {
        println!("Free items ({}):", summary.promo_items.len());
        for item in &summary.promo_items {
            println!("  {}", item);
        }
    }
    if !summary.promo_codes.is_empty() {
        println!("Promo codes: {}", summary.promo_codes.join(", "));
    }

    println!("Breakdown:");
    let width = summary
        .adjustments
        .iter()
        .map(|a| a.rule.len())
        .max()
        .unwrap_or(0);
    for adjustment in &summary.adjustments {
        println!(
            "  {:<width$}  {:>10}",
            adjustment.rule,
            adjustment.amount.to_string(),
            width = width
        );
    }

    println!("Total: {}", summary.total);
    Ok(())
}

fn products(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(catalog.products())
            .context("failed to serialize products")?;
        println!("{}", out);
        return Ok(());
    }

    println!("Catalog: {}", catalog.name());
    for product in catalog.products() {
        println!(
            "  {:<12} {:<24} {:>10}",
            product.code(),
            product.name(),
            product.price().to_string()
        );
    }
    Ok(())
}

fn rules(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        let out =
            serde_json::to_string_pretty(catalog.rules()).context("failed to serialize rules")?;
        println!("{}", out);
        return Ok(());
    }

    println!("Catalog: {}", catalog.name());
    for (position, rule) in catalog.rules().iter().enumerate() {
        println!("  {}. [{}] {}", position + 1, rule.label(), rule);
    }
    Ok(())
}
