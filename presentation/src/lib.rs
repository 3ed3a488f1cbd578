//! Presentation layer for ensemble
//!
//! The JSON/SSE HTTP surface over the application use cases.

pub mod http;

pub use http::{ApiError, AppContext, build_router, run};
