use std::time::Duration;

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::{CommitError, DomainError};
use crate::domain::order::{NewOrder, Order, OrderPage, OrderSearch, SortOrder};
use crate::domain::ports::OrderRepository;
use crate::domain::stock::StockUpdate;
use crate::schema::{order_lines, orders, products};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Messages PostgreSQL reports for lock waits and deadlocks. Diesel has no
/// dedicated kind for these, they arrive as `DatabaseErrorKind::Unknown`.
const CONTENTION_MESSAGES: [&str; 4] = [
    "lock timeout",
    "statement timeout",
    "deadlock detected",
    "could not obtain lock",
];

impl From<DieselError> for CommitError {
    fn from(e: DieselError) -> Self {
        match &e {
            DieselError::DatabaseError(
                DatabaseErrorKind::SerializationFailure | DatabaseErrorKind::ClosedConnection,
                _,
            ) => CommitError::Transient(e.to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::Unknown, info)
                if CONTENTION_MESSAGES
                    .iter()
                    .any(|m| info.message().contains(m)) =>
            {
                CommitError::Transient(e.to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info)
                if info.constraint_name() == Some("products_stock_check") =>
            {
                CommitError::Domain(DomainError::InsufficientStock)
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                CommitError::Domain(DomainError::NotFound)
            }
            _ => CommitError::Domain(DomainError::SavingData(e.to_string())),
        }
    }
}

impl From<r2d2::Error> for CommitError {
    fn from(e: r2d2::Error) -> Self {
        CommitError::Transient(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
    lock_timeout: Duration,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn commit_order(&self, order: NewOrder, stock: &[StockUpdate]) -> Result<Order, CommitError> {
        let mut conn = self.pool.get()?;
        let lock_timeout_ms = self.lock_timeout.as_millis();

        conn.transaction::<_, CommitError, _>(|conn| {
            diesel::sql_query(format!("SET LOCAL lock_timeout = {lock_timeout_ms}"))
                .execute(conn)?;

            // 1. Stock first: each update only applies if the row still holds
            //    the value the checkout was validated against. Rows are written
            //    in product id order.
            for update in stock {
                let affected = diesel::update(
                    products::table
                        .filter(products::id.eq(update.product_id))
                        .filter(products::stock.eq(update.observed_stock))
                        .filter(products::deleted_at.is_null()),
                )
                .set((
                    products::stock.eq(update.new_stock),
                    products::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

                if affected == 0 {
                    return Err(CommitError::StaleStock(update.product_id));
                }
            }

            // 2. Order header
            let header = diesel::insert_into(orders::table)
                .values(&NewOrderRow::from(&order))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 3. Order lines, with their price snapshots
            let new_lines: Vec<NewOrderLineRow> = order
                .lines
                .iter()
                .zip(1..)
                .map(|(line, line_no)| NewOrderLineRow::for_order(order.id, line_no, line))
                .collect();
            diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            Ok(header.with_lines(order.lines))
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = order_lines::table
            .filter(order_lines::order_id.eq(order.id))
            .order(order_lines::line_no.asc())
            .select(OrderLineRow::as_select())
            .load(&mut conn)?;

        Ok(Some(order.into_order(lines)))
    }

    fn search(&self, query: &OrderSearch) -> Result<OrderPage, DomainError> {
        let mut conn = self.pool.get()?;

        let filtered = || {
            let mut q = orders::table.into_boxed::<Pg>();
            if let Some(customer_id) = query.customer_id {
                q = q.filter(orders::customer_id.eq(customer_id));
            }
            q
        };

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered().count().get_result(conn)?;

            let ordered = match query.created_at {
                SortOrder::Asc => filtered().order((orders::created_at.asc(), orders::id.asc())),
                SortOrder::Desc => {
                    filtered().order((orders::created_at.desc(), orders::id.desc()))
                }
            };
            let rows = ordered
                .select(OrderRow::as_select())
                .limit(query.limit)
                .offset(query.offset)
                .load(conn)?;

            let lines = OrderLineRow::belonging_to(&rows)
                .order(order_lines::line_no.asc())
                .select(OrderLineRow::as_select())
                .load(conn)?;

            let items = lines
                .grouped_by(&rows)
                .into_iter()
                .zip(rows)
                .map(|(lines, order)| order.into_order(lines))
                .collect();

            Ok(OrderPage { items, total })
        })
    }
}
