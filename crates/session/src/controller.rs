//! The session controller — an explicit Idle/AwaitingResponse state
//! machine around the completion call.
//!
//! The source family relied on a blocking single-threaded render cycle to
//! prevent overlapping requests; here the guard is explicit so the session
//! stays safe under an async runtime. Every request runs under a deadline,
//! and a deadline miss takes the same fallback path as any other
//! completion failure: the session always returns to `Idle` in bounded
//! time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mindmate_config::AppConfig;
use mindmate_core::advice::AdviceBook;
use mindmate_core::client::{ChatRequest, CompletionClient, WireMessage};
use mindmate_core::error::{CompletionError, SessionError};
use mindmate_core::message::{Transcript, Turn};
use mindmate_core::persona::{Persona, PersonaRegistry};
use mindmate_core::prompt::{PromptComposer, PromptStyle};
use mindmate_core::situation::Situation;
use tracing::{debug, info, warn};

/// Whether a request is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// Tunable session behavior, resolved from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub prompt_style: PromptStyle,
    pub fallback_message: String,
    pub clear_on_persona_switch: bool,
    pub welcome: bool,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let prompt_style = match config.chat.prompt_style.as_str() {
            "inline" => PromptStyle::Inline,
            _ => PromptStyle::Split,
        };

        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            prompt_style,
            fallback_message: config.chat.fallback_message.clone(),
            clear_on_persona_switch: config.chat.clear_on_persona_switch,
            welcome: config.chat.welcome,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// The outcome of one submission.
///
/// `content` is what was appended as the assistant turn. When the backend
/// failed, `content` is the configured fallback message and `failure`
/// carries the underlying error text for display.
#[derive(Debug, Clone)]
pub struct Reply {
    pub content: String,
    pub failure: Option<String>,
}

/// One chat session: active persona, transcript, and the submit cycle.
pub struct ChatSession {
    registry: PersonaRegistry,
    persona_id: String,
    advice: AdviceBook,
    composer: PromptComposer,
    situation: Situation,
    transcript: Transcript,
    client: Arc<dyn CompletionClient>,
    settings: SessionSettings,
    state: SessionState,
}

impl ChatSession {
    /// Create a session with the given persona active.
    pub fn new(
        registry: PersonaRegistry,
        advice: AdviceBook,
        composer: PromptComposer,
        client: Arc<dyn CompletionClient>,
        settings: SessionSettings,
        persona_id: &str,
    ) -> Result<Self, SessionError> {
        registry
            .get(persona_id)
            .map_err(|_| SessionError::UnknownPersona(persona_id.to_string()))?;

        let mut session = Self {
            registry,
            persona_id: persona_id.to_string(),
            advice,
            composer,
            situation: Situation::None,
            transcript: Transcript::new(),
            client,
            settings,
            state: SessionState::Idle,
        };
        session.seed_welcome();
        Ok(session)
    }

    /// The active persona.
    pub fn persona(&self) -> &Persona {
        self.registry
            .get(&self.persona_id)
            .unwrap_or_else(|_| self.registry.default_persona())
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn advice(&self) -> &AdviceBook {
        &self.advice
    }

    /// Replace the auxiliary situation context. Recomputed into the prompt
    /// on every submission; never stored in the transcript.
    pub fn set_situation(&mut self, situation: Situation) {
        self.situation = situation;
    }

    /// Switch the active persona.
    ///
    /// When `clear_on_persona_switch` is set, the transcript is wiped and
    /// re-seeded with the new persona's welcome turn.
    pub fn set_persona(&mut self, id: &str) -> Result<(), SessionError> {
        self.registry
            .get(id)
            .map_err(|_| SessionError::UnknownPersona(id.to_string()))?;
        self.persona_id = id.to_string();

        if self.settings.clear_on_persona_switch {
            self.transcript.clear();
            self.seed_welcome();
        }
        info!(persona = %id, "Persona switched");
        Ok(())
    }

    /// Wipe the transcript, re-seeding the welcome turn when configured.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.seed_welcome();
    }

    /// Submit a user message and wait for the whole reply.
    ///
    /// Appends exactly one user turn and one assistant turn. A completion
    /// failure (including a deadline miss) substitutes the fallback
    /// message as the assistant turn; the underlying error rides back in
    /// [`Reply::failure`]. Returns `SessionError::Busy` — without touching
    /// the transcript — if a request is already in flight.
    pub async fn submit(&mut self, text: &str) -> Result<Reply, SessionError> {
        self.begin()?;
        self.transcript.push(Turn::user(text));

        let request = self.build_request(text, false);
        debug!(model = %request.model, turns = self.transcript.len(), "Submitting message");

        let outcome =
            tokio::time::timeout(self.settings.request_timeout, self.client.complete(request))
                .await;

        let reply = match outcome {
            Ok(Ok(chat_reply)) => Reply {
                content: chat_reply.content,
                failure: None,
            },
            Ok(Err(e)) => self.fallback_reply(e),
            Err(_) => self.fallback_reply(self.deadline_error()),
        };

        self.transcript.push(Turn::assistant(&reply.content));
        self.state = SessionState::Idle;
        Ok(reply)
    }

    /// Submit a user message, invoking `on_fragment` for each token
    /// fragment as it arrives.
    ///
    /// Same transitions and fallback behavior as [`submit`](Self::submit).
    /// The deadline bounds the wait for the stream to open and then each
    /// gap between fragments. On a mid-stream failure the partial output
    /// is discarded: the recorded assistant turn is the fallback message.
    pub async fn submit_streaming(
        &mut self,
        text: &str,
        mut on_fragment: impl FnMut(&str),
    ) -> Result<Reply, SessionError> {
        self.begin()?;
        self.transcript.push(Turn::user(text));

        let request = self.build_request(text, true);
        let deadline = self.settings.request_timeout;
        let client = Arc::clone(&self.client);

        let streamed: Result<String, CompletionError> = async {
            let mut rx = tokio::time::timeout(deadline, client.stream(request))
                .await
                .map_err(|_| CompletionError::Timeout(format!(
                    "No response within {}s",
                    deadline.as_secs()
                )))??;

            let mut assembled = String::new();
            loop {
                match tokio::time::timeout(deadline, rx.recv()).await {
                    Err(_) => {
                        return Err(CompletionError::Timeout(format!(
                            "Stream stalled for {}s",
                            deadline.as_secs()
                        )));
                    }
                    Ok(None) => break,
                    Ok(Some(Err(e))) => return Err(e),
                    Ok(Some(Ok(chunk))) => {
                        if let Some(content) = chunk.content {
                            on_fragment(&content);
                            assembled.push_str(&content);
                        }
                        if chunk.done {
                            break;
                        }
                    }
                }
            }
            Ok(assembled)
        }
        .await;

        let reply = match streamed {
            Ok(content) => Reply {
                content,
                failure: None,
            },
            Err(e) => self.fallback_reply(e),
        };

        self.transcript.push(Turn::assistant(&reply.content));
        self.state = SessionState::Idle;
        Ok(reply)
    }

    // --- internals ---

    fn begin(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => {
                self.state = SessionState::AwaitingResponse;
                Ok(())
            }
            SessionState::AwaitingResponse => Err(SessionError::Busy),
        }
    }

    /// Build the wire request for one submission.
    ///
    /// Each request carries the instruction blob and the current message
    /// only — the transcript is display and export state, not model
    /// context.
    fn build_request(&self, user_text: &str, stream: bool) -> ChatRequest {
        let advice = self.advice.find(user_text).map(str::to_string);
        let situation = self.situation.render(Utc::now().date_naive());
        let persona = self.persona();

        let messages = match self.settings.prompt_style {
            PromptStyle::Split => vec![
                WireMessage::system(self.composer.compose(
                    persona,
                    advice.as_deref(),
                    &situation,
                )),
                WireMessage::user(user_text),
            ],
            PromptStyle::Inline => vec![WireMessage::user(self.composer.compose_inline(
                persona,
                advice.as_deref(),
                &situation,
                user_text,
            ))],
        };

        ChatRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: Some(self.settings.max_tokens),
            stream,
        }
    }

    fn fallback_reply(&self, error: CompletionError) -> Reply {
        warn!(error = %error, "Completion failed, substituting fallback turn");
        Reply {
            content: self.settings.fallback_message.clone(),
            failure: Some(error.to_string()),
        }
    }

    fn deadline_error(&self) -> CompletionError {
        CompletionError::Timeout(format!(
            "No response within {}s",
            self.settings.request_timeout.as_secs()
        ))
    }

    fn seed_welcome(&mut self) {
        if self.settings.welcome {
            let persona = self.persona();
            let welcome = format!(
                "Hello! I'm your {}. How can I help you today?",
                persona.display_name
            );
            self.transcript.push(Turn::assistant(welcome));
        }
    }
}
