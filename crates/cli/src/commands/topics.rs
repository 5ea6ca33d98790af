//! `mindmate topics` — List advice topics.

use mindmate_config::AppConfig;
use mindmate_core::advice::AdviceBook;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let book = match &config.knowledge.file {
        Some(path) => AdviceBook::from_qa_file(path),
        None => AdviceBook::builtin(),
    };

    println!("📚 Advice Topics");
    println!("================");
    println!();
    if book.is_empty() {
        println!("  No advice entries loaded.");
        if let Some(path) = &config.knowledge.file {
            println!("  (knowledge file: {})", path.display());
        }
    } else {
        for topic in book.topics() {
            println!("  • {topic}");
        }
    }
    println!();

    Ok(())
}
