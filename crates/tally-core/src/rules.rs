//! # Pricing Rules
//!
//! The rule pipeline: a closed set of rule variants that share one
//! capability, `apply(input, result) -> result`, and the validated ordered
//! [`RuleSet`] that folds a cart through them.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One Pricing Pass                                 │
//! │                                                                         │
//! │  PricingResult::default()          (subtotal 0, no promo items)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  flat_price          + unclaimed item prices                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bundle rules        + their own code's contribution, in catalog order  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  promo_code_discount   subtotal × (1 - rate)   ◄── reads result only    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  final PricingResult ──► ShoppingCart snapshot                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each rule takes the result by value and returns the next snapshot. Rules
//! never see the cart, only a read-only [`PricingInput`], so a rule cannot
//! reach around the pipeline to read or overwrite the running total.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountRate, Product};
use crate::validation::{
    validate_bundle_terms, validate_discount_rate, validate_group_size, validate_price,
    validate_product_code, validate_product_name, validate_promo_code, ValidationResult,
};

// =============================================================================
// Pipeline Input / Output
// =============================================================================

/// Read-only view of the cart handed to every rule.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    /// Cart items in insertion order.
    pub items: &'a [Product],

    /// Promo codes as entered (duplicates possible).
    pub promo_codes: &'a [String],

    claimed_codes: &'a BTreeSet<String>,
}

impl<'a> PricingInput<'a> {
    pub fn new(
        items: &'a [Product],
        promo_codes: &'a [String],
        claimed_codes: &'a BTreeSet<String>,
    ) -> Self {
        PricingInput {
            items,
            promo_codes,
            claimed_codes,
        }
    }

    /// True if some bundle rule in the set owns this product code.
    pub fn is_claimed(&self, code: &str) -> bool {
        self.claimed_codes.contains(code)
    }

    pub fn has_promo_code(&self, code: &str) -> bool {
        self.promo_codes.iter().any(|c| c == code)
    }

    /// Items with the given code, in insertion order.
    pub fn matching<'c>(&self, code: &'c str) -> impl Iterator<Item = &'a Product> + 'c
    where
        'a: 'c,
    {
        let items: &'a [Product] = self.items;
        items.iter().filter(move |item| item.matches(code))
    }
}

/// What one rule did to the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuleContribution {
    /// Rule label, see [`PricingRule::label`].
    pub rule: String,

    /// Signed change to the subtotal (negative for discounts).
    pub amount: Money,
}

/// The accumulator threaded through the rule pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    /// Cart items some item-level rule priced, grouped by rule.
    pub computed_items: Vec<Product>,

    /// Companion items granted during this pass.
    pub promo_items: Vec<Product>,

    /// Cumulative total after the rules applied so far.
    pub subtotal: Money,

    /// One entry per rule that ran, in pipeline order.
    pub adjustments: Vec<RuleContribution>,
}

impl PricingResult {
    /// Contribution recorded by the rule with this label, if it ran.
    pub fn contribution_of(&self, rule: &str) -> Option<Money> {
        self.adjustments
            .iter()
            .find(|a| a.rule == rule)
            .map(|a| a.amount)
    }
}

// =============================================================================
// Pricing Rule
// =============================================================================

/// One pricing behavior.
///
/// ## Catalog Format
/// Rules are internally tagged by `kind` so a catalog file reads as an
/// ordered list:
/// ```toml
/// [[rules]]
/// kind = "bundle_deal"
/// code = "ult_small"
/// buy = 3
/// pay_for = 2
/// discount_unit_price_cents = 2490
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingRule {
    /// Catch-all: every item no bundle rule claims, at its own price.
    FlatPrice,

    /// Buy `buy`, pay for `pay_for`: each complete group of `buy` matching
    /// items takes `(buy - pay_for) * discount_unit_price` off.
    BundleDeal {
        code: String,
        buy: u32,
        pay_for: u32,
        #[serde(rename = "discount_unit_price_cents")]
        discount_unit_price: Money,
    },

    /// Every `threshold`-th matching item reprices its whole group to
    /// `discounted_price` per unit.
    BulkRebate {
        code: String,
        threshold: u32,
        #[serde(rename = "discounted_price_cents")]
        discounted_price: Money,
    },

    /// Each matching item is charged normally and grants one `companion`.
    FreeCompanion { code: String, companion: Product },

    /// Across-the-board discount on the accumulated subtotal when the cart
    /// carries `promo_code`.
    PromoCodeDiscount {
        promo_code: String,
        rate_bps: DiscountRate,
    },
}

impl PricingRule {
    /// Stable label used in breakdowns and logs, e.g. `bundle_deal:ult_small`.
    pub fn label(&self) -> String {
        match self {
            PricingRule::FlatPrice => "flat_price".to_string(),
            PricingRule::BundleDeal { code, .. } => format!("bundle_deal:{}", code),
            PricingRule::BulkRebate { code, .. } => format!("bulk_rebate:{}", code),
            PricingRule::FreeCompanion { code, .. } => format!("free_companion:{}", code),
            PricingRule::PromoCodeDiscount { promo_code, .. } => {
                format!("promo_code_discount:{}", promo_code)
            }
        }
    }

    /// The product code a bundle rule owns (excluded from the catch-all).
    pub fn claimed_code(&self) -> Option<&str> {
        match self {
            PricingRule::BundleDeal { code, .. }
            | PricingRule::BulkRebate { code, .. }
            | PricingRule::FreeCompanion { code, .. } => Some(code),
            PricingRule::FlatPrice | PricingRule::PromoCodeDiscount { .. } => None,
        }
    }

    pub fn is_discount(&self) -> bool {
        matches!(self, PricingRule::PromoCodeDiscount { .. })
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, PricingRule::FlatPrice)
    }

    /// Field-level checks.
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            PricingRule::FlatPrice => Ok(()),
            PricingRule::BundleDeal {
                code,
                buy,
                pay_for,
                discount_unit_price,
            } => {
                validate_product_code(code)?;
                validate_bundle_terms(*buy, *pay_for)?;
                validate_price("discount_unit_price", *discount_unit_price)
            }
            PricingRule::BulkRebate {
                code,
                threshold,
                discounted_price,
            } => {
                validate_product_code(code)?;
                validate_group_size("threshold", *threshold)?;
                validate_price("discounted_price", *discounted_price)
            }
            PricingRule::FreeCompanion { code, companion } => {
                validate_product_code(code)?;
                validate_product_code(companion.code())?;
                validate_product_name(companion.name())?;
                validate_price("companion price", companion.price())
            }
            PricingRule::PromoCodeDiscount {
                promo_code,
                rate_bps,
            } => {
                validate_promo_code(promo_code)?;
                validate_discount_rate(*rate_bps)
            }
        }
    }

    /// Applies this rule to the running result and returns the next snapshot.
    ///
    /// Item-level rules add their own contribution to `subtotal`; the
    /// discount rule replaces `subtotal` with the discounted amount. Either
    /// way the signed change is recorded in `adjustments`.
    pub fn apply(
        &self,
        input: &PricingInput<'_>,
        mut result: PricingResult,
    ) -> CoreResult<PricingResult> {
        let label = self.label();
        let overflow = || CoreError::Overflow {
            rule: label.clone(),
        };

        let contribution = match self {
            PricingRule::FlatPrice => {
                let unclaimed: Vec<&Product> = input
                    .items
                    .iter()
                    .filter(|item| !input.is_claimed(item.code()))
                    .collect();
                let total = sum_prices(unclaimed.iter().copied()).ok_or_else(overflow)?;
                result.computed_items.extend(unclaimed.into_iter().cloned());
                total
            }

            PricingRule::BundleDeal {
                code,
                buy,
                pay_for,
                discount_unit_price,
            } => {
                let matching: Vec<&Product> = input.matching(code).collect();
                let gross = sum_prices(matching.iter().copied()).ok_or_else(overflow)?;

                let groups = matching.len().checked_div(*buy as usize).unwrap_or(0) as i64;
                let discount = groups
                    .checked_mul(i64::from(buy.saturating_sub(*pay_for)))
                    .and_then(|free_units| discount_unit_price.checked_mul(free_units))
                    .ok_or_else(overflow)?;

                result.computed_items.extend(matching.into_iter().cloned());
                gross.checked_sub(discount).ok_or_else(overflow)?
            }

            PricingRule::BulkRebate {
                code,
                threshold,
                discounted_price,
            } => {
                let group_price = discounted_price
                    .checked_mul(i64::from(*threshold))
                    .ok_or_else(overflow)?;

                let mut total = Money::zero();
                let mut counter = 0;

                for item in input.matching(code) {
                    total = total.checked_add(item.price()).ok_or_else(overflow)?;
                    counter += 1;

                    // Group complete: the group is repriced at `threshold` times
                    // the price of the item that completed it.
                    if counter == *threshold {
                        total = item
                            .price()
                            .checked_mul(i64::from(*threshold))
                            .and_then(|charged| total.checked_sub(charged))
                            .and_then(|t| t.checked_add(group_price))
                            .ok_or_else(overflow)?;
                        counter = 0;
                    }

                    result.computed_items.push(item.clone());
                }

                total
            }

            PricingRule::FreeCompanion { code, companion } => {
                let mut total = Money::zero();
                for item in input.matching(code) {
                    total = total.checked_add(item.price()).ok_or_else(overflow)?;
                    result.computed_items.push(item.clone());
                    result.promo_items.push(companion.clone());
                }
                total
            }

            PricingRule::PromoCodeDiscount {
                promo_code,
                rate_bps,
            } => {
                if input.has_promo_code(promo_code) {
                    result.subtotal.apply_percentage_discount(*rate_bps) - result.subtotal
                } else {
                    Money::zero()
                }
            }
        };

        result.subtotal = result
            .subtotal
            .checked_add(contribution)
            .ok_or_else(overflow)?;
        result.adjustments.push(RuleContribution {
            rule: label,
            amount: contribution,
        });

        Ok(result)
    }
}

fn sum_prices<'p>(items: impl Iterator<Item = &'p Product>) -> Option<Money> {
    Money::checked_sum(items.map(Product::price))
}

/// Human description, used by `tally rules`.
impl fmt::Display for PricingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingRule::FlatPrice => write!(f, "Every other item at its listed price"),
            PricingRule::BundleDeal {
                code,
                buy,
                pay_for,
                discount_unit_price,
            } => write!(
                f,
                "{} for the price of {} on {} ({} off per free unit)",
                buy, pay_for, code, discount_unit_price
            ),
            PricingRule::BulkRebate {
                code,
                threshold,
                discounted_price,
            } => write!(
                f,
                "Every {} {} repriced to {} each",
                threshold, code, discounted_price
            ),
            PricingRule::FreeCompanion { code, companion } => write!(
                f,
                "Free {} ({}) with every {}",
                companion.name(),
                companion.code(),
                code
            ),
            PricingRule::PromoCodeDiscount {
                promo_code,
                rate_bps,
            } => write!(f, "{} off everything with code {}", rate_bps, promo_code),
        }
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// A validated, ordered list of pricing rules.
///
/// ## Invariants (checked by [`RuleSet::new`])
/// - every rule passes [`PricingRule::validate`]
/// - a product code is claimed by at most one bundle rule
/// - at most one flat-price catch-all
/// - no item-level rule after a promo-code discount rule
///
/// A `RuleSet` is immutable; share one between carts behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<PricingRule>,
    claimed_codes: BTreeSet<String>,
}

impl RuleSet {
    pub fn new(rules: Vec<PricingRule>) -> CoreResult<Self> {
        let mut claimed_codes = BTreeSet::new();
        let mut seen_catch_all = false;
        let mut seen_discount = false;

        for (position, rule) in rules.iter().enumerate() {
            rule.validate()?;

            if rule.is_discount() {
                seen_discount = true;
            } else if seen_discount {
                return Err(CoreError::RuleOrder {
                    rule: rule.label(),
                    position,
                });
            }

            if rule.is_catch_all() {
                if seen_catch_all {
                    return Err(CoreError::MultipleCatchAll);
                }
                seen_catch_all = true;
            }

            if let Some(code) = rule.claimed_code() {
                if !claimed_codes.insert(code.to_string()) {
                    return Err(CoreError::CodeClaimedTwice {
                        code: code.to_string(),
                    });
                }
            }
        }

        debug!(
            rules = rules.len(),
            claimed = claimed_codes.len(),
            catch_all = seen_catch_all,
            "Rule set built"
        );

        Ok(RuleSet {
            rules,
            claimed_codes,
        })
    }

    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricingRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Product codes owned by bundle rules.
    pub fn claimed_codes(&self) -> &BTreeSet<String> {
        &self.claimed_codes
    }

    /// Runs one full pricing pass from an empty result.
    pub fn price(&self, items: &[Product], promo_codes: &[String]) -> CoreResult<PricingResult> {
        let input = PricingInput::new(items, promo_codes, &self.claimed_codes);

        self.rules
            .iter()
            .try_fold(PricingResult::default(), |result, rule| {
                let result = rule.apply(&input, result)?;
                if let Some(last) = result.adjustments.last() {
                    debug!(
                        rule = %last.rule,
                        contribution = %last.amount,
                        subtotal = %result.subtotal,
                        "Pricing rule applied"
                    );
                }
                Ok(result)
            })
    }
}

impl TryFrom<Vec<PricingRule>> for RuleSet {
    type Error = CoreError;

    fn try_from(rules: Vec<PricingRule>) -> CoreResult<Self> {
        RuleSet::new(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a PricingRule;
    type IntoIter = std::slice::Iter<'a, PricingRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
