//! Scripted completion client — deterministic replies for tests and
//! offline demos.
//!
//! Replays a queue of canned outcomes in order. `Hang` pends forever,
//! which exercises the session-level request deadline.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use mindmate_core::client::*;
use mindmate_core::error::CompletionError;

/// What the scripted client does for one call.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return this text.
    Reply(String),

    /// Fail with this error.
    Fail(CompletionError),

    /// Stream the text's fragments, then fail with a stream interruption
    /// instead of finishing. Non-streaming calls fail outright.
    ReplyThenInterrupt(String),

    /// Never resolve — the caller's deadline has to fire.
    Hang,
}

/// A client that replays canned outcomes in sequence.
///
/// When the queue runs dry it keeps returning the last scripted reply, or
/// a generic network error if the script never contained one.
pub struct ScriptedClient {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    call_count: Mutex<usize>,
}

impl ScriptedClient {
    pub fn new(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            call_count: Mutex::new(0),
        }
    }

    /// A client that always replies with the same text.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(vec![ScriptedOutcome::Reply(text.into())])
    }

    /// A client that always fails with the given error.
    pub fn failing(error: CompletionError) -> Self {
        Self::new(vec![ScriptedOutcome::Fail(error)])
    }

    /// A client whose requests never resolve.
    pub fn hanging() -> Self {
        Self::new(vec![ScriptedOutcome::Hang])
    }

    /// How many calls (complete or stream) have been made.
    pub fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn next_outcome(&self) -> ScriptedOutcome {
        *self.call_count.lock().unwrap() += 1;
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            // Keep replaying the final outcome
            outcomes
                .front()
                .cloned()
                .unwrap_or(ScriptedOutcome::Fail(CompletionError::Network(
                    "scripted client exhausted".into(),
                )))
        }
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ChatReply, CompletionError> {
        match self.next_outcome() {
            ScriptedOutcome::Reply(text) => Ok(ChatReply {
                content: text,
                model: request.model,
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
            }),
            ScriptedOutcome::Fail(error) => Err(error),
            ScriptedOutcome::ReplyThenInterrupt(_) => Err(CompletionError::StreamInterrupted(
                "scripted interruption".into(),
            )),
            ScriptedOutcome::Hang => std::future::pending().await,
        }
    }

    async fn stream(
        &self,
        _request: ChatRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<TokenChunk, CompletionError>>,
        CompletionError,
    > {
        match self.next_outcome() {
            ScriptedOutcome::Reply(text) => {
                let (tx, rx) = tokio::sync::mpsc::channel(16);
                tokio::spawn(async move {
                    send_fragments(&tx, &text).await;
                    let _ = tx
                        .send(Ok(TokenChunk {
                            content: None,
                            done: true,
                            usage: None,
                        }))
                        .await;
                });
                Ok(rx)
            }
            ScriptedOutcome::ReplyThenInterrupt(text) => {
                let (tx, rx) = tokio::sync::mpsc::channel(16);
                tokio::spawn(async move {
                    send_fragments(&tx, &text).await;
                    let _ = tx
                        .send(Err(CompletionError::StreamInterrupted(
                            "scripted interruption".into(),
                        )))
                        .await;
                });
                Ok(rx)
            }
            ScriptedOutcome::Fail(error) => Err(error),
            ScriptedOutcome::Hang => std::future::pending().await,
        }
    }
}

/// Emit `text` as word-sized fragments, whitespace reattached.
async fn send_fragments(
    tx: &tokio::sync::mpsc::Sender<std::result::Result<TokenChunk, CompletionError>>,
    text: &str,
) {
    for word in text.split_inclusive(' ') {
        if tx
            .send(Ok(TokenChunk {
                content: Some(word.to_string()),
                done: false,
                usage: None,
            }))
            .await
            .is_err()
        {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "scripted-model".into(),
            messages: vec![WireMessage::user("hi")],
            temperature: 0.7,
            max_tokens: None,
            stream: false,
        }
    }

    #[tokio::test]
    async fn replays_outcomes_in_order() {
        let client = ScriptedClient::new(vec![
            ScriptedOutcome::Reply("first".into()),
            ScriptedOutcome::Fail(CompletionError::Network("down".into())),
            ScriptedOutcome::Reply("third".into()),
        ]);

        assert_eq!(client.complete(request()).await.unwrap().content, "first");
        assert!(client.complete(request()).await.is_err());
        assert_eq!(client.complete(request()).await.unwrap().content, "third");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn final_outcome_repeats() {
        let client = ScriptedClient::replying("always this");
        for _ in 0..3 {
            assert_eq!(
                client.complete(request()).await.unwrap().content,
                "always this"
            );
        }
    }

    #[tokio::test]
    async fn stream_reassembles_to_original_text() {
        let client = ScriptedClient::replying("take a deep breath");
        let mut rx = client.stream(request()).await.unwrap();

        let mut assembled = String::new();
        let mut saw_done = false;
        while let Some(chunk) = rx.recv().await {
            let chunk = chunk.unwrap();
            if let Some(content) = chunk.content {
                assembled.push_str(&content);
            }
            if chunk.done {
                saw_done = true;
            }
        }
        assert_eq!(assembled, "take a deep breath");
        assert!(saw_done);
    }

    #[tokio::test]
    async fn interrupted_stream_yields_fragments_then_error() {
        let client = ScriptedClient::new(vec![ScriptedOutcome::ReplyThenInterrupt(
            "so far so".into(),
        )]);
        let mut rx = client.stream(request()).await.unwrap();

        let mut fragments = String::new();
        let mut saw_error = false;
        while let Some(chunk) = rx.recv().await {
            match chunk {
                Ok(chunk) => fragments.push_str(chunk.content.as_deref().unwrap_or_default()),
                Err(e) => {
                    assert!(matches!(e, CompletionError::StreamInterrupted(_)));
                    saw_error = true;
                }
            }
        }
        assert_eq!(fragments, "so far so");
        assert!(saw_error);
    }

    #[tokio::test]
    async fn hanging_client_never_resolves() {
        let client = ScriptedClient::hanging();
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(20), client.complete(request()))
                .await;
        assert!(result.is_err()); // elapsed
    }
}
