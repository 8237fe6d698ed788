pub mod flow;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
