use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CheckoutLine, CheckoutRequest, Order, OrderSearch, SortOrder, DEFAULT_SEARCH_LIMIT,
};
use crate::errors::AppError;
use crate::infrastructure::{DieselCustomerRepository, DieselOrderRepository, DieselProductCatalog};

pub type CheckoutService =
    OrderService<DieselCustomerRepository, DieselProductCatalog, DieselOrderRepository>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequestBody {
    pub customer_id: String,
    pub product_details: Vec<ProductDetailRequest>,
    /// Decimal amount as a string to avoid floating-point issues, e.g. "20.00"
    pub paid: String,
    /// Change handed back to the customer; must equal `paid - total` exactly
    pub change: String,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value)
        .map_err(|_| DomainError::InvalidInput(format!("{field} '{value}' is not a valid id")))
}

fn parse_amount(field: &str, value: &str) -> Result<BigDecimal, DomainError> {
    BigDecimal::from_str(value.trim())
        .map_err(|e| DomainError::InvalidInput(format!("invalid {field} '{value}': {e}")))
}

impl CheckoutRequestBody {
    pub fn into_domain(self) -> Result<CheckoutRequest, DomainError> {
        let lines = self
            .product_details
            .iter()
            .map(|d| {
                Ok(CheckoutLine {
                    product_id: parse_uuid("productId", &d.product_id)?,
                    quantity: d.quantity,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let request = CheckoutRequest {
            customer_id: parse_uuid("customerId", &self.customer_id)?,
            payment_amount: parse_amount("paid", &self.paid)?,
            change: parse_amount("change", &self.change)?,
            lines,
        };
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub transaction_id: Uuid,
    pub customer_id: Uuid,
    pub product_details: Vec<ProductDetailResponse>,
    pub total_price: String,
    pub paid: String,
    pub change: String,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            transaction_id: order.id,
            customer_id: order.customer_id,
            product_details: order
                .lines
                .into_iter()
                .map(|l| ProductDetailResponse {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                    line_total: l.line_total.to_string(),
                })
                .collect(),
            total_price: order.total_price.to_string(),
            paid: order.payment_amount.to_string(),
            change: order.change.to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersParams {
    /// Only orders of this customer.
    pub customer_id: Option<String>,
    /// Items per page. Defaults to 5, maximum 100.
    pub limit: Option<i64>,
    /// Number of items to skip. Defaults to 0.
    pub offset: Option<i64>,
    /// `asc` or `desc` on creation time. Defaults to `desc`.
    pub created_at: Option<String>,
}

impl ListOrdersParams {
    pub fn into_search(self) -> Result<OrderSearch, DomainError> {
        Ok(OrderSearch {
            customer_id: self
                .customer_id
                .filter(|c| !c.is_empty())
                .map(|c| parse_uuid("customerId", &c))
                .transpose()?,
            created_at: self
                .created_at
                .filter(|c| !c.is_empty())
                .map(|c| c.parse())
                .transpose()?
                .unwrap_or(SortOrder::Desc),
            limit: self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            offset: self.offset.unwrap_or(0),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checks out a customer's products. Stock, pricing and payment are validated
/// against current catalog state, then the order, its lines and the stock
/// decrements are committed in one database transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CheckoutRequestBody,
    responses(
        (status = 201, description = "Order committed", body = OrderResponse),
        (status = 400, description = "Invalid body, insufficient stock, insufficient fund or invalid change"),
        (status = 404, description = "Customer or product not found"),
        (status = 503, description = "Commit failed, safe to retry"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<CheckoutService>,
    body: web::Json<CheckoutRequestBody>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_domain()?;

    let order = web::block(move || service.create_order(request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
///
/// Returns the order together with its lines and their price snapshots.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<CheckoutService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let result = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders
///
/// Checkout history, newest first unless `createdAt=asc`.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("customerId" = Option<Uuid>, Query, description = "Filter by customer"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 5, max 100)"),
        ("offset" = Option<i64>, Query, description = "Items to skip (default 0)"),
        ("createdAt" = Option<String>, Query, description = "asc or desc (default desc)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<CheckoutService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let search = query.into_inner().into_search()?.normalized();
    let (limit, offset) = (search.limit, search.offset);

    let page = web::block(move || service.search_orders(search))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: page.items.into_iter().map(OrderResponse::from).collect(),
        total: page.total,
        limit,
        offset,
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(create_order, get_order, list_orders),
    components(schemas(
        CheckoutRequestBody,
        ProductDetailRequest,
        OrderResponse,
        ProductDetailResponse,
        ListOrdersResponse
    )),
    tags((name = "orders", description = "Checkout and order history"))
)]
pub struct ApiDoc;
