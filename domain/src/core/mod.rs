//! Core domain types: models, queries, chat primitives and errors

pub mod chat;
pub mod error;
pub mod model;
pub mod query;
