pub mod customer;
pub mod profile;
pub mod segment;
