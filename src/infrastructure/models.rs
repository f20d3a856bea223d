use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderLine};
use crate::domain::product::Product;
use crate::schema::{customers, order_lines, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerRow {
    pub id: Uuid,
    pub phone_number: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            phone_number: row.phone_number,
            name: row.name,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow {
    pub id: Uuid,
    pub phone_number: String,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            sku: row.sku,
            category: row.category.parse().map_err(DomainError::Internal)?,
            price: row.price,
            stock: row.stock,
            is_available: row.is_available,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_available: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_price: BigDecimal,
    pub payment_amount: BigDecimal,
    pub change: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    /// `lines` must already be sorted by line number.
    pub fn into_order(self, lines: Vec<OrderLineRow>) -> Order {
        self.with_lines(lines.into_iter().map(OrderLine::from).collect())
    }

    pub fn with_lines(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            customer_id: self.customer_id,
            lines,
            total_price: self.total_price,
            payment_amount: self.payment_amount,
            change: self.change,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_price: BigDecimal,
    pub payment_amount: BigDecimal,
    pub change: BigDecimal,
}

impl From<&NewOrder> for NewOrderRow {
    fn from(order: &NewOrder) -> Self {
        NewOrderRow {
            id: order.id,
            customer_id: order.customer_id,
            total_price: order.total_price.clone(),
            payment_amount: order.payment_amount.clone(),
            change: order.change.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub line_no: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_total: row.line_total,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub line_no: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

impl NewOrderLineRow {
    pub fn for_order(order_id: Uuid, line_no: i32, line: &OrderLine) -> Self {
        NewOrderLineRow {
            id: line.id,
            order_id,
            product_id: line.product_id,
            line_no,
            quantity: line.quantity,
            unit_price: line.unit_price.clone(),
            line_total: line.line_total.clone(),
        }
    }
}
