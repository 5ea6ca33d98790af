//! End-to-end integration tests for the MindMate chat pipeline.
//!
//! These exercise the full path from user input to recorded transcript —
//! persona selection, advice lookup, prompt assembly, completion (scripted),
//! fallback substitution, and export — without touching the network.

use std::sync::Arc;

use mindmate_config::AppConfig;
use mindmate_core::advice::AdviceBook;
use mindmate_core::error::CompletionError;
use mindmate_core::message::Role;
use mindmate_core::persona::PersonaRegistry;
use mindmate_core::prompt::PromptComposer;
use mindmate_providers::{ScriptedClient, ScriptedOutcome};
use mindmate_session::{ChatSession, SessionSettings, write_transcript};

fn make_session(client: ScriptedClient) -> ChatSession {
    ChatSession::new(
        PersonaRegistry::builtin(),
        AdviceBook::builtin(),
        PromptComposer::default(),
        Arc::new(client),
        SessionSettings::from_config(&AppConfig::default()),
        "emotional-buddy",
    )
    .unwrap()
}

#[tokio::test]
async fn e2e_conversation_builds_a_chronological_transcript() {
    let mut session = make_session(ScriptedClient::new(vec![
        ScriptedOutcome::Reply("That sounds hard. Try the 5-4-3-2-1 exercise.".into()),
        ScriptedOutcome::Reply("You're doing better than you think.".into()),
    ]));

    // Welcome turn seeded on creation
    assert_eq!(session.transcript().len(), 1);
    assert!(session.transcript().turns[0].content.contains("Emotional Buddy"));

    session.submit("I have anxiety before presentations").await.unwrap();
    session.submit("thanks, that helps").await.unwrap();

    // welcome + 2 exchanges
    assert_eq!(session.transcript().len(), 5);
    let roles: Vec<Role> = session.transcript().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant
        ]
    );
}

#[tokio::test]
async fn e2e_failure_then_recovery() {
    let mut session = make_session(ScriptedClient::new(vec![
        ScriptedOutcome::Fail(CompletionError::Network("connection refused".into())),
        ScriptedOutcome::Reply("Back online. How are you feeling?".into()),
    ]));

    let failed = session.submit("hello?").await.unwrap();
    assert!(failed.failure.unwrap().contains("connection refused"));
    assert!(failed.content.contains("trouble connecting"));

    let recovered = session.submit("are you there now?").await.unwrap();
    assert!(recovered.failure.is_none());
    assert_eq!(recovered.content, "Back online. How are you feeling?");

    // welcome + (user, fallback) + (user, reply)
    assert_eq!(session.transcript().len(), 5);
}

#[tokio::test]
async fn e2e_persona_switch_starts_a_fresh_conversation() {
    let mut session = make_session(ScriptedClient::replying("ok"));

    session.submit("hey").await.unwrap();
    assert!(session.transcript().len() > 1);

    session.set_persona("exam-motivator").unwrap();
    assert_eq!(session.persona().display_name, "Exam Motivator");
    assert_eq!(session.transcript().len(), 1);
    assert!(session.transcript().turns[0].content.contains("Exam Motivator"));

    session.submit("my exam is soon").await.unwrap();
    assert_eq!(session.transcript().len(), 3);
}

#[tokio::test]
async fn e2e_streamed_reply_matches_exported_transcript() {
    let mut session = make_session(ScriptedClient::replying(
        "Small steps count. Start with five minutes.",
    ));

    let mut seen = String::new();
    session
        .submit_streaming("I keep procrastinating on everything", |fragment| {
            seen.push_str(fragment);
        })
        .await
        .unwrap();
    assert_eq!(seen, "Small steps count. Start with five minutes.");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.txt");
    write_transcript(session.transcript(), &path).unwrap();

    let exported = std::fs::read_to_string(&path).unwrap();
    assert!(exported.contains("USER: I keep procrastinating on everything"));
    assert!(exported.contains("AI: Small steps count. Start with five minutes."));
}
