//! Persona definitions and the registry.
//!
//! A persona is a named role/instruction profile that shapes the system
//! prompt sent to the completion model. The set is fixed at process start:
//! the built-in companions plus any extras from configuration, frozen
//! afterwards. Exactly one persona is active per session.

use serde::{Deserialize, Serialize};

use crate::error::PersonaError;

/// A named instruction profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier used for selection (e.g. "exam-motivator")
    pub id: String,

    /// Human-readable name shown in listings and banners
    pub display_name: String,

    /// Display icon
    pub icon: String,

    /// The role text — becomes the `ROLE:` line of the system instruction
    pub role: String,

    /// Tone guidance — becomes the `TONE:` line of the system instruction
    pub tone: String,
}

/// An immutable, ordered collection of personas.
///
/// Definition order is display order. Built once at startup and injected
/// by reference into the session.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// The built-in companion set.
    pub fn builtin() -> Self {
        Self {
            personas: vec![
                Persona {
                    id: "emotional-buddy".into(),
                    display_name: "Emotional Buddy".into(),
                    icon: "💙".into(),
                    role: "You are a warm, empathetic therapist friend.".into(),
                    tone: "Use soothing language. Validate feelings. Never judge.".into(),
                },
                Persona {
                    id: "exam-motivator".into(),
                    display_name: "Exam Motivator".into(),
                    icon: "🔥".into(),
                    role: "You are a high-energy, strict performance coach.".into(),
                    tone: "Be direct. Use 'tough love'. Focus on discipline and deadlines.".into(),
                },
                Persona {
                    id: "adolescent-helper".into(),
                    display_name: "Adolescent Helper".into(),
                    icon: "🌱".into(),
                    role: "You are a cool, wise older sibling.".into(),
                    tone: "Be casual but responsible. Use emojis. Avoid being 'cringe'.".into(),
                },
            ],
        }
    }

    /// Extend the built-in set with extra personas (from configuration).
    /// Duplicate ids are rejected; the result is frozen after this call.
    pub fn with_extra(mut self, extra: Vec<Persona>) -> Result<Self, PersonaError> {
        for persona in extra {
            if self.personas.iter().any(|p| p.id == persona.id) {
                return Err(PersonaError::Duplicate(persona.id));
            }
            self.personas.push(persona);
        }
        Ok(self)
    }

    /// Look up a persona by id.
    pub fn get(&self, id: &str) -> Result<&Persona, PersonaError> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PersonaError::NotFound(id.to_string()))
    }

    /// All personas, in definition order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    /// The first persona in definition order.
    pub fn default_persona(&self) -> &Persona {
        &self.personas[0]
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
