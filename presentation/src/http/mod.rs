//! HTTP surface: routing, handlers, SSE relay and error mapping

pub mod coach;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppContext, build_router, run};
