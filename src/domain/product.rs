use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const MAX_STOCK: i32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    Clothing,
    Accessories,
    Footwear,
    Beverages,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Clothing => "Clothing",
            ProductCategory::Accessories => "Accessories",
            ProductCategory::Footwear => "Footwear",
            ProductCategory::Beverages => "Beverages",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Clothing" => Ok(ProductCategory::Clothing),
            "Accessories" => Ok(ProductCategory::Accessories),
            "Footwear" => Ok(ProductCategory::Footwear),
            "Beverages" => Ok(ProductCategory::Beverages),
            other => Err(format!("unknown product category '{other}'")),
        }
    }
}

/// A catalog entry as observed by a checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: ProductCategory,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_available: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Available, not deleted, and holding at least `quantity` units.
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.is_available && !self.is_deleted() && quantity <= i64::from(self.stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i32, is_available: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Linen shirt".to_string(),
            sku: "LS-001".to_string(),
            category: ProductCategory::Clothing,
            price: BigDecimal::from(10),
            stock,
            is_available,
            deleted_at: None,
        }
    }

    #[test]
    fn category_parses_its_own_display() {
        for c in [
            ProductCategory::Clothing,
            ProductCategory::Accessories,
            ProductCategory::Footwear,
            ProductCategory::Beverages,
        ] {
            assert_eq!(c.to_string().parse::<ProductCategory>(), Ok(c));
        }
        assert!("Food".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn unavailable_product_cannot_supply_even_with_stock() {
        assert!(!product(5, false).can_supply(1));
    }

    #[test]
    fn can_supply_up_to_exact_stock() {
        let p = product(3, true);
        assert!(p.can_supply(3));
        assert!(!p.can_supply(4));
    }

    #[test]
    fn deleted_product_cannot_supply() {
        let mut p = product(3, true);
        p.deleted_at = Some(Utc::now());
        assert!(!p.can_supply(1));
    }
}
