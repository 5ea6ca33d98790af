//! Session layer for MindMate.
//!
//! A [`ChatSession`] owns one transcript and drives the submit cycle:
//! user turn in, advice lookup, prompt assembly, completion call (with a
//! deadline), assistant turn out — or the fallback turn when the backend
//! fails. An explicit state machine guards against overlapping requests.

pub mod controller;
pub mod export;

pub use controller::{ChatSession, Reply, SessionSettings, SessionState};
pub use export::write_transcript;
