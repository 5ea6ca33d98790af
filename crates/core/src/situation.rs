//! Situation context — the ephemeral string derived from auxiliary inputs.
//!
//! Recomputed from current inputs on every submission; never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The user's current mood, from the check-in scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Down,
    Flat,
    Okay,
    Great,
}

impl Mood {
    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Down => "😞",
            Mood::Flat => "😐",
            Mood::Okay => "🙂",
            Mood::Great => "🤩",
        }
    }
}

/// Auxiliary context attached to a session, rendered into the prompt's
/// `USER SITUATION:` section on each submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Situation {
    #[default]
    None,

    /// Countdown to an upcoming exam date.
    ExamCountdown { exam_date: NaiveDate },

    /// Mood check-in.
    MoodCheckIn { mood: Mood },
}

impl Situation {
    /// Render the situation string relative to `today`.
    ///
    /// An exam fewer than three days away switches to the urgent marker;
    /// a past exam date renders nothing.
    pub fn render(&self, today: NaiveDate) -> String {
        match self {
            Situation::None => String::new(),
            Situation::ExamCountdown { exam_date } => {
                let days_left = (*exam_date - today).num_days();
                if days_left < 0 {
                    String::new()
                } else if days_left < 3 {
                    format!("[CRITICAL: User has an exam in {days_left} days. BE URGENT.]")
                } else {
                    format!("[CONTEXT: Exam is in {days_left} days. Help them plan.]")
                }
            }
            Situation::MoodCheckIn { mood } => {
                format!(
                    "[CONTEXT: User mood is {}. Adjust empathy accordingly.]",
                    mood.emoji()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn exam_in_two_days_is_critical() {
        let situation = Situation::ExamCountdown {
            exam_date: date(2026, 3, 12),
        };
        let rendered = situation.render(date(2026, 3, 10));
        assert!(rendered.contains('2'));
        assert!(rendered.contains("CRITICAL"));
        assert!(rendered.contains("BE URGENT"));
    }

    #[test]
    fn exam_far_away_is_planning_context() {
        let situation = Situation::ExamCountdown {
            exam_date: date(2026, 3, 30),
        };
        let rendered = situation.render(date(2026, 3, 10));
        assert!(rendered.contains("20 days"));
        assert!(rendered.contains("Help them plan"));
        assert!(!rendered.contains("CRITICAL"));
    }

    #[test]
    fn exam_today_is_critical() {
        let today = date(2026, 3, 10);
        let situation = Situation::ExamCountdown { exam_date: today };
        assert!(situation.render(today).contains("CRITICAL"));
    }

    #[test]
    fn past_exam_renders_nothing() {
        let situation = Situation::ExamCountdown {
            exam_date: date(2026, 3, 1),
        };
        assert_eq!(situation.render(date(2026, 3, 10)), "");
    }

    #[test]
    fn mood_check_in_carries_emoji() {
        let situation = Situation::MoodCheckIn { mood: Mood::Down };
        let rendered = situation.render(date(2026, 3, 10));
        assert!(rendered.contains("😞"));
        assert!(rendered.contains("Adjust empathy"));
    }

    #[test]
    fn none_renders_empty() {
        assert_eq!(Situation::None.render(date(2026, 3, 10)), "");
    }
}
