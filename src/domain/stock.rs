use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use super::errors::DomainError;
use super::order::CheckoutLine;
use super::product::Product;

/// The stock write a checkout intends to make, guarded by the value it was
/// computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockUpdate {
    pub product_id: Uuid,
    pub observed_stock: i32,
    pub new_stock: i32,
}

/// Check every line against the observed catalog and compute the post-checkout
/// stock of each product touched. Nothing is written here.
///
/// Lines naming the same product are summed before comparing with stock. The
/// returned updates are ordered by product id so that commits touching
/// overlapping products always write rows in the same order.
pub fn reserve(
    lines: &[CheckoutLine],
    catalog: &HashMap<Uuid, Product>,
) -> Result<Vec<StockUpdate>, DomainError> {
    let mut requested: BTreeMap<Uuid, i64> = BTreeMap::new();

    for line in lines {
        let product = catalog
            .get(&line.product_id)
            .filter(|p| !p.is_deleted())
            .ok_or(DomainError::NotFound)?;

        let total = requested.entry(line.product_id).or_insert(0);
        *total += i64::from(line.quantity);
        if !product.can_supply(*total) {
            return Err(DomainError::InsufficientStock);
        }
    }

    requested
        .into_iter()
        .map(|(product_id, quantity)| {
            let product = catalog.get(&product_id).ok_or(DomainError::NotFound)?;
            let new_stock = i32::try_from(i64::from(product.stock) - quantity)
                .map_err(|_| DomainError::InsufficientStock)?;
            Ok(StockUpdate {
                product_id,
                observed_stock: product.stock,
                new_stock,
            })
        })
        .collect()
}
