pub mod services;
pub mod storage;

pub use storage::{ImageStore, LocalImageStore};
