use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{CheckoutLine, OrderLine};
use super::product::Product;

/// Price each line from the catalog snapshot the checkout already holds.
/// Returns the priced lines in request order and their grand total.
pub fn price_lines(
    lines: &[CheckoutLine],
    catalog: &HashMap<Uuid, Product>,
) -> Result<(Vec<OrderLine>, BigDecimal), DomainError> {
    let mut total = BigDecimal::zero();
    let mut priced = Vec::with_capacity(lines.len());

    for line in lines {
        let product = catalog.get(&line.product_id).ok_or(DomainError::NotFound)?;
        let unit_price = product.price.clone();
        let line_total = &unit_price * BigDecimal::from(line.quantity);
        total += &line_total;
        priced.push(OrderLine {
            id: Uuid::new_v4(),
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price,
            line_total,
        });
    }

    Ok((priced, total))
}
