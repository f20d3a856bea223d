//! In-memory port implementations for coordinator tests.
//!
//! The store applies a commit under one lock, comparing every observed stock
//! value before writing anything, which gives the same all-or-nothing
//! behaviour as the PostgreSQL adapter.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::errors::{CommitError, DomainError};
use crate::domain::order::{NewOrder, Order, OrderPage, OrderSearch, SortOrder};
use crate::domain::ports::{CustomerDirectory, OrderRepository, ProductCatalog};
use crate::domain::product::{Product, ProductCategory};
use crate::domain::stock::StockUpdate;

#[derive(Default)]
struct State {
    customers: HashMap<Uuid, Customer>,
    products: HashMap<Uuid, Product>,
    orders: Vec<Order>,
    injected_failures: VecDeque<CommitError>,
    reprice_on_failure: Option<(Uuid, BigDecimal)>,
    commit_calls: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    racing_reads: Arc<AtomicUsize>,
    race_barrier: Arc<Mutex<Option<Arc<Barrier>>>>,
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store poisoned")
    }

    pub fn add_customer(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.state().customers.insert(
            id,
            Customer {
                id,
                phone_number: "+6281234567890".to_string(),
                name: "Walk-in".to_string(),
            },
        );
        id
    }

    pub fn add_product(&self, price: BigDecimal, stock: i32, is_available: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.state().products.insert(
            id,
            Product {
                id,
                name: format!("Product {}", &id.to_string()[..8]),
                sku: id.simple().to_string()[..12].to_string(),
                category: ProductCategory::Accessories,
                price,
                stock,
                is_available,
                deleted_at: None,
            },
        );
        id
    }

    pub fn stock_of(&self, id: Uuid) -> i32 {
        self.state().products[&id].stock
    }

    pub fn set_price(&self, id: Uuid, price: BigDecimal) {
        if let Some(p) = self.state().products.get_mut(&id) {
            p.price = price;
        }
    }

    pub fn order_count(&self) -> usize {
        self.state().orders.len()
    }

    pub fn commit_calls(&self) -> usize {
        self.state().commit_calls
    }

    /// Fail the next commits with these errors, in order, before touching state.
    pub fn fail_next_commits(&self, errors: impl IntoIterator<Item = CommitError>) {
        self.state().injected_failures.extend(errors);
    }

    /// Change a product's price at the moment the next injected failure fires,
    /// as if a catalog edit landed between two checkout attempts.
    pub fn reprice_on_next_failure(&self, id: Uuid, price: BigDecimal) {
        self.state().reprice_on_failure = Some((id, price));
    }

    /// Make the next `parties` catalog reads wait for each other, so that every
    /// one of them observes the same stock before any commit runs.
    pub fn synchronize_reads(&self, parties: usize) {
        self.racing_reads.store(parties, Ordering::SeqCst);
        *self.race_barrier.lock().expect("barrier poisoned") = Some(Arc::new(Barrier::new(parties)));
    }
}

impl CustomerDirectory for MemoryStore {
    fn find_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        Ok(self.state().customers.get(&id).cloned())
    }
}

impl ProductCatalog for MemoryStore {
    fn find_products_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Product>, DomainError> {
        let snapshot: HashMap<Uuid, Product> = {
            let state = self.state();
            ids.iter()
                .filter_map(|id| state.products.get(id))
                .filter(|p| !p.is_deleted())
                .map(|p| (p.id, p.clone()))
                .collect()
        };

        let racing = self
            .racing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if racing {
            let barrier = self.race_barrier.lock().expect("barrier poisoned").clone();
            if let Some(barrier) = barrier {
                barrier.wait();
            }
        }

        Ok(snapshot)
    }
}

impl OrderRepository for MemoryStore {
    fn commit_order(&self, order: NewOrder, stock: &[StockUpdate]) -> Result<Order, CommitError> {
        let mut state = self.state();
        state.commit_calls += 1;

        if let Some(err) = state.injected_failures.pop_front() {
            if let Some((id, price)) = state.reprice_on_failure.take() {
                if let Some(p) = state.products.get_mut(&id) {
                    p.price = price;
                }
            }
            return Err(err);
        }

        for update in stock {
            match state.products.get(&update.product_id) {
                Some(p) if p.stock == update.observed_stock && !p.is_deleted() => {}
                _ => return Err(CommitError::StaleStock(update.product_id)),
            }
        }
        for update in stock {
            if let Some(p) = state.products.get_mut(&update.product_id) {
                p.stock = update.new_stock;
            }
        }

        let committed = Order {
            id: order.id,
            customer_id: order.customer_id,
            lines: order.lines,
            total_price: order.total_price,
            payment_amount: order.payment_amount,
            change: order.change,
            created_at: Utc::now(),
        };
        state.orders.push(committed.clone());
        Ok(committed)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.state().orders.iter().find(|o| o.id == id).cloned())
    }

    fn search(&self, query: &OrderSearch) -> Result<OrderPage, DomainError> {
        let state = self.state();
        let mut matching: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| query.customer_id.map_or(true, |c| o.customer_id == c))
            .cloned()
            .collect();
        matching.sort_by_key(|o| o.id);
        if query.created_at == SortOrder::Desc {
            matching.reverse();
        }
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(OrderPage { items, total })
    }
}
