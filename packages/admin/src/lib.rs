pub mod config;
pub mod entity;
pub mod error;
pub mod listing;
pub mod repository;
pub mod session;
pub mod workflow;

pub use config::AdminConfig;
pub use error::AdminError;
