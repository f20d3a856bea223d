use std::collections::HashMap;

use uuid::Uuid;

use super::customer::Customer;
use super::errors::{CommitError, DomainError};
use super::order::{NewOrder, Order, OrderPage, OrderSearch};
use super::product::Product;
use super::stock::StockUpdate;

pub trait CustomerDirectory: Send + Sync + 'static {
    fn find_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError>;
}

pub trait ProductCatalog: Send + Sync + 'static {
    /// One batched read. Soft-deleted products are omitted from the result.
    fn find_products_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Product>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Insert the order header and its lines and apply every stock update,
    /// all or nothing. A stock update whose `observed_stock` no longer matches
    /// the stored value aborts the whole commit with `CommitError::StaleStock`.
    fn commit_order(&self, order: NewOrder, stock: &[StockUpdate]) -> Result<Order, CommitError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn search(&self, query: &OrderSearch) -> Result<OrderPage, DomainError>;
}
