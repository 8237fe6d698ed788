pub mod command;
pub mod dispatch;
pub mod message;
pub mod session;

pub use dispatch::handle_message;
