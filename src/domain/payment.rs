use bigdecimal::BigDecimal;

use super::errors::DomainError;

/// The tendered amount must cover the total and the declared change must be
/// exactly `payment_amount - total`.
pub fn validate_payment(
    payment_amount: &BigDecimal,
    declared_change: &BigDecimal,
    total: &BigDecimal,
) -> Result<(), DomainError> {
    if payment_amount < total {
        return Err(DomainError::InsufficientFund);
    }
    if &(payment_amount - total) != declared_change {
        return Err(DomainError::InvalidChange);
    }
    Ok(())
}
