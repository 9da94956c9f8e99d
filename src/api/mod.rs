pub mod handlers;
pub mod routes;
pub mod state;
pub mod statements;

pub use routes::create_router;
pub use state::AppState;
