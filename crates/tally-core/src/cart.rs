//! # Shopping Cart
//!
//! Holds cart state and re-prices it from scratch on every mutation.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add_item(p) ──────────► items.push(p) ─────────┐                       │
//! │                                                 ├──► RuleSet::price()   │
//! │  add_promo_code(c) ────► promo_codes.push(c) ───┘          │            │
//! │                                                            │            │
//! │                       Ok ──► snapshot = result ◄───────────┤            │
//! │                       Err ─► pop the push, keep snapshot ◄─┘            │
//! │                                                                         │
//! │  total_price() / total_items() / summary() ──► read the snapshot        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! A cart has no interior locking. It is `Send + Sync`, so a host that shares
//! one between threads wraps it (`Arc<Mutex<ShoppingCart>>`); every mutation
//! then runs its full pricing pass under the lock.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{trace, warn};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::rules::{PricingResult, RuleContribution, RuleSet};
use crate::types::Product;

// =============================================================================
// Shopping Cart
// =============================================================================

/// A cart priced by an explicit, shared [`RuleSet`].
///
/// ## Invariants
/// - `items` keeps insertion order; duplicates are allowed
/// - `promo_codes` is stored as given (no de-duplication)
/// - `pricing` always reflects a complete pass over the current items and codes
#[derive(Debug, Clone)]
pub struct ShoppingCart {
    rules: Arc<RuleSet>,
    items: Vec<Product>,
    promo_codes: Vec<String>,
    pricing: PricingResult,
}

impl ShoppingCart {
    /// Creates an empty cart priced by `rules`.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use tally_core::{Catalog, ShoppingCart};
    ///
    /// let catalog = Catalog::telecom();
    /// let rules = Arc::new(catalog.rule_set().unwrap());
    ///
    /// let mut cart = ShoppingCart::new(Arc::clone(&rules));
    /// cart.add_item(catalog.product("ult_small").unwrap().clone()).unwrap();
    /// assert_eq!(cart.total_price().to_string(), "$24.90");
    /// ```
    pub fn new(rules: impl Into<Arc<RuleSet>>) -> Self {
        ShoppingCart {
            rules: rules.into(),
            items: Vec::new(),
            promo_codes: Vec::new(),
            pricing: PricingResult::default(),
        }
    }

    /// Adds a product and re-prices the cart.
    ///
    /// No validation is done on `product`. If a rule fails, the product is
    /// not kept and the previous pricing stays in place.
    pub fn add_item(&mut self, product: Product) -> CoreResult<()> {
        self.items.push(product);
        if let Err(e) = self.reprice() {
            self.items.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Adds a promo code and re-prices the cart.
    ///
    /// Unknown codes are kept but match no rule. Rolls back like [`add_item`](Self::add_item).
    pub fn add_promo_code(&mut self, code: impl Into<String>) -> CoreResult<()> {
        self.promo_codes.push(code.into());
        if let Err(e) = self.reprice() {
            self.promo_codes.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Raw items in insertion order.
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn promo_codes(&self) -> &[String] {
        &self.promo_codes
    }

    /// Companion items granted by the last pricing pass.
    pub fn promo_items(&self) -> &[Product] {
        &self.pricing.promo_items
    }

    /// Raw items followed by promo items.
    pub fn total_items(&self) -> Vec<Product> {
        self.items
            .iter()
            .chain(self.pricing.promo_items.iter())
            .cloned()
            .collect()
    }

    /// Total of the last pricing pass, in whole cents.
    pub fn total_price(&self) -> Money {
        self.pricing.subtotal
    }

    /// The full snapshot of the last pass, including per-rule contributions.
    pub fn pricing(&self) -> &PricingResult {
        &self.pricing
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serializable view for presentation layers.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(self)
    }

    /// Runs a full pass over the current state and commits it on success.
    fn reprice(&mut self) -> CoreResult<()> {
        match self.rules.price(&self.items, &self.promo_codes) {
            Ok(pricing) => {
                trace!(
                    items = self.items.len(),
                    promo_codes = self.promo_codes.len(),
                    promo_items = pricing.promo_items.len(),
                    total = %pricing.subtotal,
                    "Cart repriced"
                );
                self.pricing = pricing;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, items = self.items.len(), "Cart pricing failed, rolling back");
                Err(e)
            }
        }
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Cart summary for receipts, JSON output and frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub items: Vec<Product>,
    pub promo_items: Vec<Product>,
    pub promo_codes: Vec<String>,
    pub adjustments: Vec<RuleContribution>,
    pub item_count: usize,
    pub total_item_count: usize,
    pub total: Money,
}

impl From<&ShoppingCart> for CartSummary {
    fn from(cart: &ShoppingCart) -> Self {
        CartSummary {
            items: cart.items.clone(),
            promo_items: cart.pricing.promo_items.clone(),
            promo_codes: cart.promo_codes.clone(),
            adjustments: cart.pricing.adjustments.clone(),
            item_count: cart.items.len(),
            total_item_count: cart.items.len() + cart.pricing.promo_items.len(),
            total: cart.total_price(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::rules::PricingRule;
    use crate::types::DiscountRate;

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            PricingRule::FlatPrice,
            PricingRule::FreeCompanion {
                code: "ult_medium".into(),
                companion: Product::new("1gb", "1 GB Data-pack", Money::from_cents(990)),
            },
            PricingRule::PromoCodeDiscount {
                promo_code: "HALF".into(),
                rate_bps: DiscountRate::from_percent(50),
            },
        ])
        .unwrap()
    }

    fn medium() -> Product {
        Product::new("ult_medium", "Unlimited 2GB", Money::from_cents(2990))
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = ShoppingCart::new(rules());
        assert!(cart.is_empty());
        assert!(cart.total_price().is_zero());
        assert!(cart.total_items().is_empty());
        assert!(cart.pricing().adjustments.is_empty());
    }

    #[test]
    fn test_promo_items_are_replaced_not_accumulated() {
        let mut cart = ShoppingCart::new(rules());
        cart.add_item(medium()).unwrap();
        cart.add_item(medium()).unwrap();
        cart.add_promo_code("HALF").unwrap();

        assert_eq!(cart.promo_items().len(), 2);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total_items().len(), 4);
    }

    #[test]
    fn test_total_price_is_idempotent() {
        let mut cart = ShoppingCart::new(rules());
        cart.add_item(medium()).unwrap();
        assert_eq!(cart.total_price(), cart.total_price());
        assert_eq!(cart.total_price().cents(), 2990);
    }

    #[test]
    fn test_duplicate_promo_codes_kept_and_applied_once() {
        let mut cart = ShoppingCart::new(rules());
        cart.add_item(medium()).unwrap();
        cart.add_promo_code("HALF").unwrap();
        cart.add_promo_code("HALF").unwrap();

        assert_eq!(cart.promo_codes(), ["HALF".to_string(), "HALF".to_string()]);
        assert_eq!(cart.total_price().cents(), 1495);
    }

    #[test]
    fn test_failed_add_item_rolls_back() {
        let mut cart = ShoppingCart::new(rules());
        cart.add_item(Product::new("x", "Huge", Money::from_cents(i64::MAX)))
            .unwrap();
        let before = cart.summary();

        let err = cart
            .add_item(Product::new("y", "One more", Money::from_cents(1)))
            .unwrap_err();

        assert!(matches!(err, CoreError::Overflow { .. }));
        assert_eq!(cart.summary(), before);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_carts_share_one_rule_set() {
        let shared = Arc::new(rules());
        let mut a = ShoppingCart::new(Arc::clone(&shared));
        let b = ShoppingCart::new(Arc::clone(&shared));

        a.add_item(medium()).unwrap();

        assert_eq!(a.total_price().cents(), 2990);
        assert!(b.total_price().is_zero());
        assert_eq!(Arc::strong_count(&shared), 3);
    }

    #[test]
    fn test_summary_counts() {
        let mut cart = ShoppingCart::new(rules());
        cart.add_item(medium()).unwrap();
        cart.add_promo_code("HALF").unwrap();

        let summary = cart.summary();
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.total_item_count, 2);
        assert_eq!(summary.total.cents(), 1495);
        assert_eq!(summary.adjustments.len(), 3);
        assert_eq!(summary.adjustments[2].amount.cents(), -1495);
    }

    #[test]
    fn test_promo_discount_rounds_final_total_half_up() {
        let rules = RuleSet::new(vec![
            PricingRule::FlatPrice,
            PricingRule::PromoCodeDiscount {
                promo_code: "TEN".into(),
                rate_bps: DiscountRate::from_percent(10),
            },
        ])
        .unwrap();
        let mut cart = ShoppingCart::new(rules);
        cart.add_item(Product::new("gum", "Gum", Money::from_cents(105)))
            .unwrap();
        cart.add_promo_code("TEN").unwrap();

        // 1.05 * 0.90 = 0.945
        assert_eq!(cart.total_price().cents(), 95);
        assert_eq!(
            cart.pricing().contribution_of("promo_code_discount:TEN"),
            Some(Money::from_cents(-10))
        );
    }

    #[test]
    fn test_cart_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShoppingCart>();
    }
}
