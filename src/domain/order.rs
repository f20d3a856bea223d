use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

pub const DEFAULT_SEARCH_LIMIT: i64 = 5;
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Tendered amounts carry at most this many fractional digits.
pub const MAX_AMOUNT_SCALE: i64 = 2;
/// ...and at most this many digits before the decimal point.
pub const MAX_AMOUNT_INTEGER_DIGITS: i64 = 15;

/// Rejects amounts outside the money range before any arithmetic touches
/// them. Works on the raw digits and exponent only, so it stays cheap for
/// inputs like `1e20000000`.
fn check_amount(field: &str, amount: &BigDecimal) -> Result<(), DomainError> {
    let (_, scale) = amount.as_bigint_and_exponent();
    if scale > MAX_AMOUNT_SCALE {
        return Err(DomainError::InvalidInput(format!(
            "{field} must have at most {MAX_AMOUNT_SCALE} decimal places"
        )));
    }
    let integer_digits = (amount.digits() as i64).saturating_sub(scale);
    if integer_digits > MAX_AMOUNT_INTEGER_DIGITS {
        return Err(DomainError::InvalidInput(format!(
            "{field} must have at most {MAX_AMOUNT_INTEGER_DIGITS} integer digits"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A raw checkout request, before any catalog state has been consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub customer_id: Uuid,
    pub payment_amount: BigDecimal,
    pub change: BigDecimal,
    pub lines: Vec<CheckoutLine>,
}

impl CheckoutRequest {
    /// Shape checks that need no catalog access.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_amount("paid", &self.payment_amount)?;
        check_amount("change", &self.change)?;
        if self.lines.is_empty() {
            return Err(DomainError::InvalidInput(
                "at least one product line is required".to_string(),
            ));
        }
        if let Some(line) = self.lines.iter().find(|l| l.quantity < 1) {
            return Err(DomainError::InvalidInput(format!(
                "quantity for product {} must be greater than 0",
                line.product_id
            )));
        }
        if self.payment_amount <= BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "paid must be greater than 0".to_string(),
            ));
        }
        if self.change < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "change must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A priced line. `unit_price` and `line_total` are snapshots taken at
/// checkout time and never follow later catalog price edits.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

/// A fully validated order that has not been committed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub total_price: BigDecimal,
    pub payment_amount: BigDecimal,
    pub change: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub total_price: BigDecimal,
    pub payment_amount: BigDecimal,
    pub change: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DomainError::InvalidInput(format!(
                "createdAt must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

/// Checkout history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSearch {
    pub customer_id: Option<Uuid>,
    pub created_at: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl Default for OrderSearch {
    fn default() -> Self {
        Self {
            customer_id: None,
            created_at: SortOrder::Desc,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

impl OrderSearch {
    /// Limit clamped to `1..=MAX_SEARCH_LIMIT`, offset to non-negative.
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_SEARCH_LIMIT);
        self.offset = self.offset.max(0);
        self
    }
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: i64,
}
