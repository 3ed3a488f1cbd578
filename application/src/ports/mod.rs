//! Ports: interfaces the application layer depends on
//!
//! Adapters implementing these traits live in the infrastructure layer
//! and are injected by the binary.

pub mod completion_gateway;
pub mod transcript_store;
pub mod xp_store;

pub use completion_gateway::{
    Completion, CompletionGateway, CompletionRequest, GatewayError, StreamHandle,
};
pub use transcript_store::{StoreError, TranscriptStore};
pub use xp_store::XpStore;
