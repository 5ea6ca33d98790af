//! Transcript export — a flat text document with `USER:` / `AI:` lines.

use std::path::Path;

use mindmate_core::message::Transcript;
use tracing::info;

/// Write the transcript to `path` as labeled plain text, creating parent
/// directories as needed.
pub fn write_transcript(transcript: &Transcript, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, transcript.render_text())?;
    info!(path = %path.display(), turns = transcript.len(), "Transcript exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmate_core::message::Turn;

    #[test]
    fn exports_labeled_lines() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("I keep procrastinating"));
        transcript.push(Turn::assistant("Start with just two minutes."));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("chat.txt");
        write_transcript(&transcript, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("USER: I keep procrastinating"));
        assert!(content.contains("AI: Start with just two minutes."));
        assert!(content.find("USER:").unwrap() < content.find("AI:").unwrap());
    }

    #[test]
    fn empty_transcript_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.txt");
        write_transcript(&Transcript::new(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
