pub mod docs;
pub mod stock;
