//! HTTP surface: configuration, handlers, middleware, lifecycle and shutdown.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use config::*;
pub use handlers::AppState;
pub use module::{routes, NetworkModule};
pub use shutdown::*;
