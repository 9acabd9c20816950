//! # Route Handlers
//!
//! The Axum handlers behind each route, re-exported for the router.

pub mod general;
pub mod query;

pub use crate::{errors::AppError, state::AppState};
pub use general::{health_check, root};
pub use query::query_handler;
