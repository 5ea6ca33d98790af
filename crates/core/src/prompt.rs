//! Prompt assembly — persona instruction, situation, retrieved advice, and
//! the user's text concatenated into the instruction sent to the model.
//!
//! The user's raw text is embedded verbatim, with no escaping or
//! injection defense. Both the personas and the advice table are trusted
//! static data, so this reproduces the source behavior deliberately; the
//! property is pinned by tests rather than silently hardened.

use crate::persona::Persona;

/// How the composed prompt is shipped to the completion API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptStyle {
    /// System blob as a `system` message, user text as a `user` message.
    #[default]
    Split,

    /// Everything — instruction sections and user text — in one `user`
    /// message.
    Inline,
}

/// Assembles the instruction string in a fixed section order.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    /// Phrase composed into the knowledge-base section when no advice
    /// matched. May be empty, which leaves a bare section.
    miss_phrase: String,
}

impl PromptComposer {
    pub fn new(miss_phrase: impl Into<String>) -> Self {
        Self {
            miss_phrase: miss_phrase.into(),
        }
    }

    /// Compose the system instruction blob: role, tone, situation,
    /// knowledge-base section, closing instruction.
    pub fn compose(&self, persona: &Persona, advice: Option<&str>, situation: &str) -> String {
        let knowledge = advice.unwrap_or(&self.miss_phrase);
        format!(
            "ROLE: {}\n\
             TONE: {}\n\
             \n\
             USER SITUATION: {}\n\
             \n\
             KNOWLEDGE BASE (Use if relevant): {}\n\
             \n\
             INSTRUCTION: Keep responses concise, helpful, and human-like.",
            persona.role, persona.tone, situation, knowledge
        )
    }

    /// Compose a single blob carrying the instruction sections and the raw
    /// user text, for the single-message prompt style.
    pub fn compose_inline(
        &self,
        persona: &Persona,
        advice: Option<&str>,
        situation: &str,
        user_text: &str,
    ) -> String {
        format!(
            "{}\n\nUSER MESSAGE: {}",
            self.compose(persona, advice, situation),
            user_text
        )
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new("No specific database entry.")
    }
}
