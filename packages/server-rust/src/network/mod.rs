//! Networking configuration, middleware, request handlers, and shutdown control.

pub mod auth;
pub mod config;
pub mod docs;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use config::*;
pub use handlers::{ApiError, AppState};
pub use module::NetworkModule;
pub use shutdown::*;
