//! `mindmate personas` — List available companions.

use mindmate_config::AppConfig;
use mindmate_core::persona::{Persona, PersonaRegistry};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = PersonaRegistry::builtin()
        .with_extra(config.personas.iter().cloned().map(Persona::from).collect())
        .map_err(|e| format!("Invalid persona config: {e}"))?;

    println!("🧠 Available Companions");
    println!("=======================");
    println!();
    for persona in registry.list() {
        println!("  {} {}  ({})", persona.icon, persona.display_name, persona.id);
        println!("      {}", persona.role);
    }
    println!();
    println!("  Start with one: mindmate chat --persona <id>");
    println!("  Switch mid-chat: /persona <id>");

    Ok(())
}
