pub mod client;
pub mod dto;
pub mod error;
pub mod nutrition;

pub use client::{CatalogLookup, OpenFoodFactsClient};
pub use dto::CatalogProduct;
pub use error::CatalogError;
