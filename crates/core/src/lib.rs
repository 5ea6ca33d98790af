//! # MindMate Core
//!
//! Domain types, traits, and error definitions for the MindMate companion
//! chat runtime. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The completion backend is defined as a trait here; implementations live
//! in `mindmate-providers`. The static tables (personas, advice) are plain
//! immutable values built once at startup and injected by reference — no
//! global mutable singletons.

pub mod advice;
pub mod client;
pub mod error;
pub mod message;
pub mod persona;
pub mod prompt;
pub mod situation;

// Re-export key types at crate root for ergonomics
pub use advice::{AdviceBook, AdviceEntry};
pub use client::{ChatReply, ChatRequest, CompletionClient, TokenChunk, Usage, WireMessage, WireRole};
pub use error::{CompletionError, Error, KnowledgeError, PersonaError, Result, SessionError};
pub use message::{Role, Transcript, Turn};
pub use persona::{Persona, PersonaRegistry};
pub use prompt::{PromptComposer, PromptStyle};
pub use situation::{Mood, Situation};
