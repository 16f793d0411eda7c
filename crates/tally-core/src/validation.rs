//! # Validation Module
//!
//! Field checks for catalog and rule configuration.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Catalog::from_toml_str / Catalog::validate                             │
//! │  ├── product code, name, price                                          │
//! │  └── duplicate product codes                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  RuleSet::new                                                           │
//! │  ├── PricingRule::validate (THIS MODULE's field checks)                 │
//! │  └── ordering / claim conflicts                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ShoppingCart::add_item / add_promo_code                                │
//! │  └── NO validation: any product or code string is accepted              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_product_code, validate_promo_code};
//!
//! validate_product_code("ult_small").unwrap();
//! validate_promo_code("I<3AMAYSIM").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::DiscountRate;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product or promo code accepted in a catalog.
pub const MAX_CODE_LEN: usize = 50;

/// Longest product name accepted in a catalog.
pub const MAX_NAME_LEN: usize = 200;

/// Largest bundle group / rebate threshold a rule may use.
pub const MAX_GROUP_SIZE: u32 = 1000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ```rust
/// use tally_core::validation::validate_product_code;
///
/// assert!(validate_product_code("1gb").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("ult small").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a promo code configured on a discount rule.
///
/// Promo codes are opaque, so any printable characters are allowed, but
/// whitespace is not: a code with spaces could never be typed back reliably.
pub fn validate_promo_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "promo_code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "promo_code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if code.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: "promo_code".to_string(),
            reason: "must not contain whitespace or control characters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a catalog price. Zero is allowed (free items), negative is not.
///
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_cents(2490)).is_ok());
/// assert!(validate_price("price", Money::zero()).is_ok());
/// assert!(validate_price("price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount rate: 0% to 100%.
pub fn validate_discount_rate(rate: DiscountRate) -> ValidationResult<()> {
    if rate.bps() > DiscountRate::FULL.bps() {
        return Err(ValidationError::OutOfRange {
            field: "rate_bps".to_string(),
            min: 0,
            max: DiscountRate::FULL.bps() as i64,
        });
    }

    Ok(())
}

/// Validates a group size (bundle `buy`, rebate `threshold`).
pub fn validate_group_size(field: &str, size: u32) -> ValidationResult<()> {
    if size == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if size > MAX_GROUP_SIZE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_GROUP_SIZE as i64,
        });
    }

    Ok(())
}

/// Validates N-for-price-of-M bundle terms: `pay_for` must be below `buy`.
pub fn validate_bundle_terms(buy: u32, pay_for: u32) -> ValidationResult<()> {
    validate_group_size("buy", buy)?;

    if pay_for >= buy {
        return Err(ValidationError::OutOfRange {
            field: "pay_for".to_string(),
            min: 0,
            max: buy as i64 - 1,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
