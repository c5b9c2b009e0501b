// src/api/mod.rs
pub mod dispatch;
pub mod handlers;
pub mod params;
pub mod routes;
pub mod state;

pub use routes::{configure_app, configure_routes};
pub use state::AppState;
