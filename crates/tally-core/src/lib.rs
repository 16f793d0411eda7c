//! # tally-core: Rule-Driven Cart Pricing
//!
//! This crate prices shopping carts by folding them through an ordered list
//! of pricing rules. It has zero I/O: catalogs are parsed from strings and
//! every operation is a deterministic function of its inputs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally CLI (apps/cli)                         │   │
//! │  │    catalog file ──► RuleSet ──► ShoppingCart ──► receipt        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   rules   │  │   cart    │  │   │
//! │  │   │  Product  │  │   Money   │  │ RuleSet   │  │ Shopping  │  │   │
//! │  │   │ Discount  │  │ (cents)   │  │ Pricing   │  │   Cart    │  │   │
//! │  │   │   Rate    │  │           │  │   Rule    │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   catalog (example configuration) • validation • error          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product and DiscountRate
//! - [`money`] - Money type with integer arithmetic (no floating point)
//! - [`rules`] - PricingRule variants, the pricing pass and RuleSet
//! - [`cart`] - ShoppingCart and CartSummary
//! - [`catalog`] - Catalog files and the built-in telecom catalog
//! - [`validation`] - Field checks for catalog and rule configuration
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Recompute from scratch**: every cart mutation re-runs every rule
//! 2. **Pure fold**: rules take the running result by value and return the next one
//! 3. **Integer Money**: all amounts are whole cents, so nothing needs re-rounding
//! 4. **Explicit configuration**: rule sets are passed to carts, never looked up globally
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Catalog, ShoppingCart};
//!
//! let catalog = Catalog::telecom();
//! let mut cart = ShoppingCart::new(catalog.rule_set().unwrap());
//!
//! let small = catalog.product("ult_small").unwrap();
//! for _ in 0..3 {
//!     cart.add_item(small.clone()).unwrap();
//! }
//! cart.add_item(catalog.product("ult_large").unwrap().clone()).unwrap();
//!
//! // 3-for-2 on ult_small: 24.90 * 2 + 44.90
//! assert_eq!(cart.total_price().to_string(), "$94.70");
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartSummary, ShoppingCart};
pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use rules::{PricingInput, PricingResult, PricingRule, RuleContribution, RuleSet};
pub use types::{DiscountRate, Product};
