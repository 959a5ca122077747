//! Library catalog services
//!
//! Four cooperating gRPC services (users, authors, categories, books) that
//! let authenticated users maintain a catalog and borrow or return books
//! one copy at a time. Each service runs as its own binary; this crate
//! holds the shared layers they are built from.

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod proto;
pub mod repository;
pub mod server;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
