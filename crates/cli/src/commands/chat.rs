//! `mindmate chat` — Interactive or single-message chat mode.

use std::io::Write;

use chrono::NaiveDate;
use mindmate_config::AppConfig;
use mindmate_core::advice::AdviceBook;
use mindmate_core::message::Role;
use mindmate_core::persona::{Persona, PersonaRegistry};
use mindmate_core::prompt::PromptComposer;
use mindmate_core::situation::{Mood, Situation};
use mindmate_session::{ChatSession, Reply, SessionSettings};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    persona: Option<String>,
    exam_date: Option<String>,
    mood: Option<String>,
    no_stream: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    tracing::debug!(?config, "Loaded configuration");

    // Check for an API key early — halt before accepting any input
    if config.resolved_api_key().is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY     = 'gsk_...'   (recommended)");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'    (for OpenAI-compatible endpoints)");
        eprintln!("    MINDMATE_API_KEY = '...'       (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  A key left as the PASTE_… placeholder counts as missing.");
        eprintln!("  Get a Groq key at: https://console.groq.com/keys");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let registry = PersonaRegistry::builtin()
        .with_extra(config.personas.iter().cloned().map(Persona::from).collect())
        .map_err(|e| format!("Invalid persona config: {e}"))?;

    let advice = match &config.knowledge.file {
        Some(path) => AdviceBook::from_qa_file(path),
        None => AdviceBook::builtin(),
    };

    let composer = PromptComposer::new(&config.chat.miss_phrase);
    let situation = parse_situation(exam_date.as_deref(), mood.as_deref())?;
    let client = mindmate_providers::build_client(&config);
    let settings = SessionSettings::from_config(&config);
    let streaming = config.stream && !no_stream;

    let persona_id = persona.unwrap_or_else(|| config.chat.default_persona.clone());
    let mut session = ChatSession::new(registry, advice, composer, client, settings, &persona_id)
        .map_err(|e| format!("{e} (see `mindmate personas`)"))?;
    session.set_situation(situation);

    if let Some(text) = message {
        // Single message mode
        let reply = send(&mut session, &text, streaming, false).await?;
        if !streaming {
            println!("{}", reply.content);
        }
        return Ok(());
    }

    // Interactive mode
    let persona = session.persona().clone();
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         MindMate — Companion Chat            ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Companion: {} {}", persona.icon, persona.display_name);
    println!("  Model:     {}", config.model);
    println!("  Topics:    {} advice entries loaded", session.advice().len());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type /help for commands, 'exit' or Ctrl+C to quit.");
    println!();

    for turn in session.transcript().iter() {
        if turn.role == Role::Assistant {
            println!("  {} > {}", session.persona().icon, turn.content);
            println!();
        }
    }

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            prompt()?;
            continue;
        }

        if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        if line.starts_with('/') {
            handle_command(&mut session, &line);
            prompt()?;
            continue;
        }

        send(&mut session, &line, streaming, true).await?;
        prompt()?;
    }

    println!();
    println!("  Take care! 👋");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

/// Submit one message, printing the reply. In streaming mode fragments are
/// printed as they arrive.
async fn send(
    session: &mut ChatSession,
    text: &str,
    streaming: bool,
    interactive: bool,
) -> Result<Reply, Box<dyn std::error::Error>> {
    let icon = session.persona().icon.clone();

    let reply = if streaming {
        if interactive {
            println!();
            print!("  {icon} > ");
        }
        std::io::stdout().flush()?;
        let reply = session
            .submit_streaming(text, |fragment| {
                print!("{fragment}");
                let _ = std::io::stdout().flush();
            })
            .await?;
        println!();
        if interactive {
            println!();
        }
        reply
    } else {
        let reply = session.submit(text).await?;
        if interactive {
            println!();
            for line in reply.content.lines() {
                println!("  {icon} > {line}");
            }
            println!();
        }
        reply
    };

    if let Some(failure) = &reply.failure {
        eprintln!("  [Error] {failure}");
    }

    Ok(reply)
}

/// Handle a slash command. Exit words are handled by the caller.
fn handle_command(session: &mut ChatSession, line: &str) {
    let (command, arg) = match line.split_once(' ') {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };

    match command {
        "/help" => {
            println!();
            println!("  /persona <id>   Switch companion (see `mindmate personas`)");
            println!("  /clear          Wipe the conversation");
            println!("  /topics         List advice topics");
            println!("  /export <path>  Save the transcript as labeled text");
            println!("  /help           This message");
            println!("  exit            Leave the chat");
            println!();
        }
        "/persona" => {
            if arg.is_empty() {
                println!("  Usage: /persona <id>");
            } else {
                match session.set_persona(arg) {
                    Ok(()) => {
                        let persona = session.persona();
                        println!(
                            "  Now chatting with {} {}.",
                            persona.icon, persona.display_name
                        );
                        if let Some(turn) = session.transcript().turns.last() {
                            if turn.role == Role::Assistant {
                                println!("  {} > {}", persona.icon, turn.content);
                            }
                        }
                    }
                    Err(e) => println!("  {e}"),
                }
            }
        }
        "/clear" => {
            session.clear();
            println!("  History cleared.");
            if let Some(turn) = session.transcript().turns.last() {
                println!("  {} > {}", session.persona().icon, turn.content);
            }
        }
        "/topics" => {
            let topics = session.advice().topics();
            if topics.is_empty() {
                println!("  No advice topics loaded.");
            } else {
                println!("  Topics: {}", topics.join(", "));
            }
        }
        "/export" => {
            if arg.is_empty() {
                println!("  Usage: /export <path>");
            } else {
                match mindmate_session::write_transcript(
                    session.transcript(),
                    std::path::Path::new(arg),
                ) {
                    Ok(()) => println!("  Transcript written to {arg}"),
                    Err(e) => println!("  Export failed: {e}"),
                }
            }
        }
        _ => {
            println!("  Unknown command: {command} (try /help)");
        }
    }
}

fn parse_situation(
    exam_date: Option<&str>,
    mood: Option<&str>,
) -> Result<Situation, Box<dyn std::error::Error>> {
    if let Some(date) = exam_date {
        let exam_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| format!("Invalid --exam-date '{date}' (expected YYYY-MM-DD): {e}"))?;
        return Ok(Situation::ExamCountdown { exam_date });
    }

    if let Some(mood) = mood {
        let mood = match mood.to_lowercase().as_str() {
            "down" => Mood::Down,
            "flat" => Mood::Flat,
            "okay" => Mood::Okay,
            "great" => Mood::Great,
            other => {
                return Err(
                    format!("Invalid --mood '{other}' (expected down, flat, okay, or great)")
                        .into(),
                );
            }
        };
        return Ok(Situation::MoodCheckIn { mood });
    }

    Ok(Situation::None)
}
