pub mod decoder;
pub mod resolver;

pub use decoder::{BarcodeDecoder, HttpBarcodeDecoder, UnavailableDecoder};
pub use resolver::resolve;
