//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the service is up.
//!
//! # Tasks
//! - Cache sweep: purges expired cache entries at the configured interval
//! - Session sweep: drops idle session trackers at the same interval

mod cleanup;

pub use cleanup::{spawn_cleanup_task, spawn_session_sweep_task};
