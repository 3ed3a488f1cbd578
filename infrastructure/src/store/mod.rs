//! SQLite persistence adapters

pub mod schema;
pub mod transcript;
pub mod xp;

pub use schema::init_schema;
pub use transcript::SqliteTranscriptStore;
pub use xp::SqliteXpStore;
