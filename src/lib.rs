//! HTTP CRUD API over a MySQL `cars` table.
//!
//! Every car route runs behind [`middleware::scoped_connection`], which
//! leases one pooled connection per request, puts it in strict SQL mode with a
//! fixed session time zone, and releases it exactly once when the handler is
//! done.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
