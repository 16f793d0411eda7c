//! # Catalog
//!
//! A catalog is configuration: the products a deployment sells and the
//! ordered rules that price them. The engine never reaches for a global
//! catalog; callers build a [`RuleSet`] from one and hand it to each cart.
//!
//! ## File Format
//! ```toml
//! name = "telecom"
//!
//! [[products]]
//! code = "ult_small"
//! name = "Unlimited 1GB"
//! price_cents = 2490
//!
//! [[rules]]
//! kind = "flat_price"
//!
//! [[rules]]
//! kind = "promo_code_discount"
//! promo_code = "I<3AMAYSIM"
//! rate_bps = 1000
//! ```
//!
//! Parsing takes a string; reading the file is the caller's job.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rules::{PricingRule, RuleSet};
use crate::types::{DiscountRate, Product};
use crate::validation::{validate_price, validate_product_code, validate_product_name};

/// Products plus the ordered rules that price them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_catalog_name")]
    name: String,

    #[serde(default)]
    products: Vec<Product>,

    #[serde(default)]
    rules: Vec<PricingRule>,
}

fn default_catalog_name() -> String {
    "custom".to_string()
}

impl Catalog {
    /// Builds and validates a catalog.
    pub fn new(
        name: impl Into<String>,
        products: Vec<Product>,
        rules: Vec<PricingRule>,
    ) -> CoreResult<Self> {
        let catalog = Catalog {
            name: name.into(),
            products,
            rules,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses and validates a catalog from TOML.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let catalog: Catalog = toml::from_str(contents)?;
        catalog.validate()?;
        debug!(
            name = %catalog.name,
            products = catalog.products.len(),
            rules = catalog.rules.len(),
            "Catalog parsed"
        );
        Ok(catalog)
    }

    /// The built-in prepaid SIM catalog.
    ///
    /// | code       | price | promotion                               |
    /// |------------|-------|-----------------------------------------|
    /// | ult_small  | 24.90 | 3 for the price of 2                    |
    /// | ult_medium | 29.90 | free `1gb` with each                    |
    /// | ult_large  | 44.90 | every 5 repriced to 39.90 each          |
    /// | 1gb        |  9.90 | none                                    |
    ///
    /// Promo code `I<3AMAYSIM` takes 10% off the whole cart.
    pub fn telecom() -> Self {
        let data_pack = Product::new("1gb", "1 GB Data-pack", Money::from_cents(990));

        Catalog {
            name: "telecom".to_string(),
            products: vec![
                Product::new("ult_small", "Unlimited 1GB", Money::from_cents(2490)),
                Product::new("ult_medium", "Unlimited 2GB", Money::from_cents(2990)),
                Product::new("ult_large", "Unlimited 5GB", Money::from_cents(4490)),
                data_pack.clone(),
            ],
            rules: vec![
                PricingRule::FlatPrice,
                PricingRule::BundleDeal {
                    code: "ult_small".to_string(),
                    buy: 3,
                    pay_for: 2,
                    discount_unit_price: Money::from_cents(2490),
                },
                PricingRule::BulkRebate {
                    code: "ult_large".to_string(),
                    threshold: 5,
                    discounted_price: Money::from_cents(3990),
                },
                PricingRule::FreeCompanion {
                    code: "ult_medium".to_string(),
                    companion: data_pack,
                },
                PricingRule::PromoCodeDiscount {
                    promo_code: "I<3AMAYSIM".to_string(),
                    rate_bps: DiscountRate::from_percent(10),
                },
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    /// Looks up a product by code.
    pub fn product(&self, code: &str) -> CoreResult<&Product> {
        self.products
            .iter()
            .find(|p| p.matches(code))
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))
    }

    /// Builds the validated rule set for carts priced by this catalog.
    pub fn rule_set(&self) -> CoreResult<RuleSet> {
        RuleSet::new(self.rules.clone())
    }

    /// Checks products and rules.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = HashSet::new();

        for product in &self.products {
            validate_product_code(product.code())?;
            validate_product_name(product.name())?;
            validate_price("price", product.price())?;

            if !seen.insert(product.code()) {
                return Err(CoreError::DuplicateProduct(product.code().to_string()));
            }
        }

        self.rule_set().map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
