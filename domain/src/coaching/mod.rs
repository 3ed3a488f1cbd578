//! Interview coaching domain
//!
//! A coaching session is a persisted transcript of candidate and
//! interviewer turns. Each turn the coach's reply is streamed to the
//! client token by token and persisted as one transcript message only
//! after the upstream stream completes.

pub mod entities;
pub mod stream;

pub use entities::{CoachSession, InterviewTemplate, TranscriptMessage, TranscriptRole};
pub use stream::{CoachEvent, StreamEvent};
