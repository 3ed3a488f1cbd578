//! Orchestration domain
//!
//! Core concepts for fanning one query out to several models and
//! optionally merging their answers:
//!
//! - **Fan-out**: every selected model answers the same query
//!   independently. One model failing never fails the batch.
//! - **Synthesis**: a designated model merges the successful answers
//!   into a single best-of-all-models reply and describes how.

pub mod parsing;
pub mod value_objects;

pub use parsing::parse_synthesis_reply;
pub use value_objects::{ModelAnswer, OrchestrationOutcome, SynthesizedAnswer};
