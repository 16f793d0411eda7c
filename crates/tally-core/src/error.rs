//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Pricing, rule set and catalog failures          │
//! │  └── ValidationError  - Field-level input failures                      │
//! │                                                                         │
//! │  tally CLI (apps/cli)                                                   │
//! │  └── anyhow::Error    - CoreError + I/O, with context                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → anyhow → stderr + exit code        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown promo codes and unrecognized product codes are NOT errors: the
//! discount rule simply does not match, and the flat-price catch-all prices
//! any item no bundle rule claims.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// Monetary arithmetic overflowed while a rule was pricing the cart.
    ///
    /// The recomputation is aborted and the cart rolls back the mutation
    /// that triggered it.
    #[error("Monetary overflow while applying rule {rule}")]
    Overflow { rule: String },

    /// An item-level rule sits after a promo-code discount rule.
    ///
    /// Discounts must see the fully accumulated item subtotal, so they go last.
    #[error("Rule {rule} at position {position} must come before every promo-code discount rule")]
    RuleOrder { rule: String, position: usize },

    /// Two bundle rules claim the same product code (items would be priced twice).
    #[error("Product code '{code}' is claimed by more than one bundle rule")]
    CodeClaimedTwice { code: String },

    /// More than one flat-price catch-all in a rule set.
    #[error("A rule set may contain at most one flat-price rule")]
    MultipleCatchAll,

    /// Catalog lookup by code failed.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Two catalog products share a code.
    #[error("Duplicate product code in catalog: {0}")]
    DuplicateProduct(String),

    /// The catalog TOML could not be parsed.
    #[error("Invalid catalog: {0}")]
    CatalogParse(#[from] toml::de::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for catalog and rule configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A decimal amount could not be parsed into whole cents.
    #[error("'{input}' is not a valid amount: {reason}")]
    InvalidAmount { input: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::RuleOrder {
            rule: "bundle_deal:ult_small".to_string(),
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "Rule bundle_deal:ult_small at position 3 must come before every promo-code discount rule"
        );

        let err = CoreError::Overflow {
            rule: "flat_price".to_string(),
        };
        assert_eq!(err.to_string(), "Monetary overflow while applying rule flat_price");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::InvalidAmount {
            input: "1.234".to_string(),
            reason: "at most two decimal places are allowed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'1.234' is not a valid amount: at most two decimal places are allowed"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
