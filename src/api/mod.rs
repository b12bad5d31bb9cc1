//! API Module
//!
//! HTTP handlers and routing for the protection sidecar. The dashboard asks it
//! for admission decisions, reports navigation and request activity, and
//! invalidates cached data after mutations.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
