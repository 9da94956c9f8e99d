#[macro_use]
mod macros;

pub mod lease;
pub mod named;
pub mod pool;
pub mod provider;
pub mod session;
pub mod value;

pub use lease::Lease;
pub use named::NamedQuery;
pub use pool::{create_pool, PoolSettings};
pub use provider::{ConnectionProvider, MySqlProvider};
pub use session::SessionSettings;
pub use value::{Params, SqlValue};
