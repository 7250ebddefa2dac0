mod error;
mod handlers;
mod params;
mod router;
mod types;

pub use handlers::core::build_backend;
pub use router::handle_request;
pub use types::{AppState, Request};
