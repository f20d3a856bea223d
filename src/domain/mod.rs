pub mod customer;
pub mod errors;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod product;
pub mod stock;
