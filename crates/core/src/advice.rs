//! The advice table — a small static keyword→text lookup.
//!
//! Not a search index: given a free-text query, the book returns the advice
//! text of the first entry whose keyword is a substring of the lowercased
//! query, else nothing. First match wins; definition order matters.
//!
//! An optional two-column `question,answer` file can replace the built-in
//! table at startup. A missing file degrades to an empty book, never an
//! error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One row of the advice table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceEntry {
    /// Topic keyword matched as a substring of the lowercased query.
    /// Always stored lowercased and non-empty.
    pub keyword: String,

    /// The advice text returned on a match
    pub text: String,
}

/// An ordered, immutable advice table.
#[derive(Debug, Clone, Default)]
pub struct AdviceBook {
    entries: Vec<AdviceEntry>,
}

impl AdviceBook {
    /// The built-in advice table.
    pub fn builtin() -> Self {
        let rows: [(&str, &str); 7] = [
            (
                "anxiety",
                "**5-4-3-2-1 Grounding:** Name 5 things you see, 4 you feel, 3 you hear, 2 you smell, 1 you taste.",
            ),
            (
                "study tips",
                "**Pomodoro Technique:** 25 mins focus, 5 mins break. After 4 cycles, take a long break.",
            ),
            (
                "acne",
                "**Skincare:** Wash face twice daily. Change pillowcases often. Don't touch your face!",
            ),
            (
                "sleep",
                "**Sleep Hygiene:** No blue light 1 hour before bed. Keep room cool (18°C/65°F).",
            ),
            (
                "procrastination",
                "**2-Minute Rule:** If a task takes <2 mins, do it NOW. Momentum builds motivation.",
            ),
            (
                "motivation",
                "Action leads to motivation, not the other way around. Just start for 5 minutes.",
            ),
            (
                "friendship",
                "True friends respect boundaries. If you feel drained, it's okay to take space.",
            ),
        ];

        Self {
            entries: rows
                .into_iter()
                .map(|(keyword, text)| AdviceEntry {
                    keyword: keyword.into(),
                    text: text.into(),
                })
                .collect(),
        }
    }

    /// Build a book from explicit entries. Entries with an empty keyword
    /// are dropped; keywords are lowercased so lookup stays
    /// case-insensitive.
    pub fn from_entries(entries: Vec<AdviceEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|e| !e.keyword.trim().is_empty())
            .map(|e| AdviceEntry {
                keyword: e.keyword.trim().to_lowercase(),
                text: e.text,
            })
            .collect();
        Self { entries }
    }

    /// Load a book from a two-column `question,answer` text file.
    ///
    /// An absent file yields an empty book. Lines without a comma, and
    /// lines with an empty question or answer, are skipped with a warning.
    /// A leading `question,answer` (or `topic,advice`) header line is
    /// skipped. Answers may contain commas; only the first comma splits.
    pub fn from_qa_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Knowledge file not readable, using empty advice table");
                return Self::default();
            }
        };

        let mut entries = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((question, answer)) = line.split_once(',') else {
                warn!(path = %path.display(), line = lineno + 1, "Skipping malformed knowledge line (no comma)");
                continue;
            };

            let question = question.trim();
            let answer = answer.trim();

            if lineno == 0 && is_header(question, answer) {
                continue;
            }

            if question.is_empty() || answer.is_empty() {
                warn!(path = %path.display(), line = lineno + 1, "Skipping knowledge line with empty column");
                continue;
            }

            entries.push(AdviceEntry {
                keyword: question.to_lowercase(),
                text: answer.to_string(),
            });
        }

        debug!(path = %path.display(), count = entries.len(), "Loaded knowledge file");
        Self { entries }
    }

    /// Return the advice text of the first entry whose keyword is a
    /// substring of the lowercased query.
    ///
    /// First match wins — not longest, not most specific. An empty query
    /// never matches because keywords are non-empty.
    pub fn find(&self, query: &str) -> Option<&str> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .find(|entry| query.contains(&entry.keyword))
            .map(|entry| entry.text.as_str())
    }

    /// The topic keywords, in definition order.
    pub fn topics(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.keyword.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_header(left: &str, right: &str) -> bool {
    let left = left.to_lowercase();
    let right = right.to_lowercase();
    (left == "question" && right == "answer") || (left == "topic" && right == "advice")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_keyword_case_insensitively() {
        let book = AdviceBook::builtin();
        let advice = book.find("I have so much ANXIETY lately").unwrap();
        assert!(advice.contains("5-4-3-2-1 Grounding"));
    }

    #[test]
    fn first_listed_match_wins() {
        // "anxiety" is defined before "sleep", so it wins even though
        // both keywords appear in the query.
        let book = AdviceBook::builtin();
        let advice = book.find("I have anxiety about sleep").unwrap();
        assert!(advice.contains("Grounding"));
        assert!(!advice.contains("Sleep Hygiene"));
    }

    #[test]
    fn no_keyword_returns_none() {
        let book = AdviceBook::builtin();
        assert!(book.find("tell me about quantum physics").is_none());
    }

    #[test]
    fn empty_query_never_matches() {
        let book = AdviceBook::builtin();
        assert!(book.find("").is_none());
    }

    #[test]
    fn multi_word_keyword_matches_as_substring() {
        let book = AdviceBook::builtin();
        let advice = book.find("got any study tips for me?").unwrap();
        assert!(advice.contains("Pomodoro"));
    }

    #[test]
    fn topics_in_definition_order() {
        let book = AdviceBook::builtin();
        let topics = book.topics();
        assert_eq!(topics.first(), Some(&"anxiety"));
        assert_eq!(topics.last(), Some(&"friendship"));
        assert_eq!(topics.len(), 7);
    }

    #[test]
    fn from_entries_drops_empty_keywords_and_lowercases() {
        let book = AdviceBook::from_entries(vec![
            AdviceEntry {
                keyword: "  Burnout ".into(),
                text: "Take breaks.".into(),
            },
            AdviceEntry {
                keyword: "   ".into(),
                text: "unreachable".into(),
            },
        ]);
        assert_eq!(book.len(), 1);
        assert_eq!(book.find("I feel burnout creeping in"), Some("Take breaks."));
    }

    #[test]
    fn missing_file_degrades_to_empty_book() {
        let book = AdviceBook::from_qa_file(Path::new("/nonexistent/advice.csv"));
        assert!(book.is_empty());
        assert!(book.find("anxiety").is_none());
    }

    #[test]
    fn qa_file_parsing_skips_header_and_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.csv");
        std::fs::write(
            &path,
            "question,answer\n\
             exams,Plan backwards from the date, one topic per day.\n\
             no-comma-line\n\
             ,empty question\n\
             breathing,Box breathing: in 4, hold 4, out 4, hold 4.\n",
        )
        .unwrap();

        let book = AdviceBook::from_qa_file(&path);
        assert_eq!(book.len(), 2);
        // Answers keep their commas — only the first comma splits.
        assert_eq!(
            book.find("worried about exams"),
            Some("Plan backwards from the date, one topic per day.")
        );
        assert!(book.find("breathing exercise?").unwrap().contains("Box breathing"));
    }
}
