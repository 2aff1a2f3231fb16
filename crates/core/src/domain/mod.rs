pub mod customer;
pub mod location;
pub mod product;
pub mod service_center;
