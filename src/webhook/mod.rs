mod dto;
mod extractors;
pub mod handlers;

pub use handlers::router;
