use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::customer::Customer;
use crate::domain::errors::DomainError;
use crate::domain::ports::CustomerDirectory;
use crate::schema::customers;

use super::models::{CustomerRow, NewCustomerRow};

#[derive(Clone)]
pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn insert(&self, customer: NewCustomerRow) -> Result<Customer, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(customers::table)
            .values(&customer)
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }
}

impl CustomerDirectory for DieselCustomerRepository {
    fn find_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Customer::from))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::ports::CustomerDirectory;
    use crate::infrastructure::test_support::TestDb;

    #[tokio::test]
    async fn finds_existing_customer() {
        let db = TestDb::start().await;
        let seeded = db.customer("+628111111111");

        let found = db
            .customers
            .find_customer_by_id(seeded.id)
            .expect("find failed")
            .expect("customer should exist");

        assert_eq!(found, seeded);
    }

    #[tokio::test]
    async fn unknown_customer_is_none() {
        let db = TestDb::start().await;

        assert!(db
            .customers
            .find_customer_by_id(Uuid::new_v4())
            .expect("find should not error")
            .is_none());
    }
}
