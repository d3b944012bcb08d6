//! HTTP API for creating, inspecting, and refreshing sweepstakes.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
