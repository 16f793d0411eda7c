//! # Domain Types
//!
//! Value types shared by the rule pipeline, the cart and catalogs.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    Product      │   │  DiscountRate   │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  code (match)   │   │  bps (u32)      │                              │
//! │  │  name           │   │  1000 = 10%     │                              │
//! │  │  price (Money)  │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Rules match products by `code`, never by position or reference. Two
//! `Product` values with the same code are the same product as far as
//! pricing is concerned.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10%. Valid rates are 0..=10000;
/// range is checked by [`crate::validation::validate_discount_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// 100% off.
    pub const FULL: DiscountRate = DiscountRate(10_000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a whole percentage (`10` = 10%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be put in a cart.
///
/// Immutable once created: fields are private and only readable through
/// accessors. The cart accepts any product; catalogs validate theirs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Business identifier used by rules to match items.
    code: String,

    /// Display name shown on receipts.
    name: String,

    /// Unit price.
    #[serde(rename = "price_cents")]
    price: Money,
}

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Product {
            code: code.into(),
            name: name.into(),
            price,
        }
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    /// Checks whether this product is the one identified by `code`.
    #[inline]
    pub fn matches(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.code, self.price)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_from_bps() {
        let rate = DiscountRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert_eq!(rate.to_string(), "10%");
    }

    #[test]
    fn test_discount_rate_from_percent() {
        assert_eq!(DiscountRate::from_percent(10), DiscountRate::from_bps(1000));
        assert_eq!(DiscountRate::from_percent(100), DiscountRate::FULL);
    }

    #[test]
    fn test_discount_rate_display() {
        assert_eq!(DiscountRate::from_bps(1000).to_string(), "10%");
        assert_eq!(DiscountRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(DiscountRate::from_bps(5).to_string(), "0.05%");
    }

    #[test]
    fn test_product_matches_by_code() {
        let a = Product::new("ult_small", "Unlimited 1GB", Money::from_cents(2490));
        let renamed = Product::new("ult_small", "Renamed", Money::from_cents(1));

        assert!(a.matches("ult_small"));
        assert!(renamed.matches(a.code()));
        assert!(!a.matches("ult_large"));
        assert_ne!(a, renamed);
    }

    #[test]
    fn test_product_serde_uses_price_cents() {
        let product = Product::new("1gb", "1 GB Data-pack", Money::from_cents(990));
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price_cents"], 990);

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }
}
