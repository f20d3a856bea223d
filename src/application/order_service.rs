use std::collections::HashMap;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::domain::errors::{CommitError, DomainError};
use crate::domain::order::{CheckoutRequest, NewOrder, Order, OrderPage, OrderSearch};
use crate::domain::payment::validate_payment;
use crate::domain::ports::{CustomerDirectory, OrderRepository, ProductCatalog};
use crate::domain::pricing::price_lines;
use crate::domain::product::Product;
use crate::domain::stock::{reserve, StockUpdate};

/// Turns checkout requests into committed orders.
///
/// Every attempt reads the catalog, validates stock, prices the lines and
/// checks payment before issuing a single atomic commit. The commit only
/// applies if no other checkout changed the stock it was computed from; when
/// one did, the whole cycle is repeated against fresh catalog state, up to
/// `CheckoutConfig::max_attempts` times.
pub struct OrderService<C, P, R> {
    customers: C,
    catalog: P,
    orders: R,
    config: CheckoutConfig,
}

impl<C, P, R> OrderService<C, P, R>
where
    C: CustomerDirectory,
    P: ProductCatalog,
    R: OrderRepository,
{
    pub fn new(customers: C, catalog: P, orders: R, config: CheckoutConfig) -> Self {
        Self {
            customers,
            catalog,
            orders,
            config,
        }
    }

    pub fn create_order(&self, request: CheckoutRequest) -> Result<Order, DomainError> {
        request.validate()?;

        if self
            .customers
            .find_customer_by_id(request.customer_id)?
            .is_none()
        {
            debug!("checkout rejected: customer {} not found", request.customer_id);
            return Err(DomainError::NotFound);
        }

        let product_ids = distinct_product_ids(&request);
        let attempts = self.config.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 1..=attempts {
            let catalog = self.catalog.find_products_by_ids(&product_ids)?;
            let (order, stock) = match prepare(&request, &catalog) {
                Ok(prepared) => prepared,
                Err(e) => {
                    debug!(
                        "checkout for customer {} rejected on attempt {}: {}",
                        request.customer_id, attempt, e
                    );
                    return Err(e);
                }
            };

            match self.orders.commit_order(order, &stock) {
                Ok(committed) => {
                    info!(
                        "order {} committed for customer {}: {} line(s), total {}",
                        committed.id,
                        committed.customer_id,
                        committed.lines.len(),
                        committed.total_price
                    );
                    return Ok(committed);
                }
                Err(CommitError::Domain(e)) => return Err(e),
                Err(e) => {
                    warn!("checkout attempt {}/{} not committed: {}", attempt, attempts, e);
                    last_failure = Some(e);
                }
            }
        }

        Err(match last_failure {
            Some(CommitError::StaleStock(_)) => DomainError::InsufficientStock,
            Some(CommitError::Transient(msg)) => DomainError::SavingData(msg),
            Some(CommitError::Domain(e)) => e,
            None => DomainError::SavingData("no commit attempted".to_string()),
        })
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.orders.find_by_id(id)
    }

    pub fn search_orders(&self, query: OrderSearch) -> Result<OrderPage, DomainError> {
        self.orders.search(&query.normalized())
    }
}

fn distinct_product_ids(request: &CheckoutRequest) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = request.lines.iter().map(|l| l.product_id).collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Validation and pricing against one catalog snapshot. Pure: nothing is
/// written until the returned order and stock updates are committed.
fn prepare(
    request: &CheckoutRequest,
    catalog: &HashMap<Uuid, Product>,
) -> Result<(NewOrder, Vec<StockUpdate>), DomainError> {
    let stock = reserve(&request.lines, catalog)?;
    let (lines, total_price) = price_lines(&request.lines, catalog)?;
    validate_payment(&request.payment_amount, &request.change, &total_price)?;

    let order = NewOrder {
        id: Uuid::now_v7(),
        customer_id: request.customer_id,
        lines,
        total_price,
        payment_amount: request.payment_amount.clone(),
        change: request.change.clone(),
    };
    Ok((order, stock))
}
