use std::collections::HashMap;

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductCatalog;
use crate::domain::product::Product;
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

#[derive(Clone)]
pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn insert(&self, product: NewProductRow) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&product)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Product::try_from(row)
    }

    pub fn soft_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let affected = diesel::update(
            products::table
                .filter(products::id.eq(id))
                .filter(products::deleted_at.is_null()),
        )
        .set((
            products::deleted_at.eq(diesel::dsl::now),
            products::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    /// Current stock, including soft-deleted products.
    pub fn stock_of(&self, id: Uuid) -> Result<Option<i32>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(products::table
            .find(id)
            .select(products::stock)
            .first(&mut conn)
            .optional()?)
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn find_products_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Product>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get()?;

        let rows = products::table
            .filter(products::id.eq_any(ids.to_vec()))
            .filter(products::deleted_at.is_null())
            .select(ProductRow::as_select())
            .load(&mut conn)?;

        rows.into_iter()
            .map(|row| Product::try_from(row).map(|p| (p.id, p)))
            .collect()
    }
}
