//! Trailing-window selection and summary for AI feedback.
//!
//! Summaries are always chronological (oldest first). Too little data is a
//! normal outcome, not an error: callers render a canned message and skip
//! the gateway entirely.

use chrono::{DateTime, NaiveDate, Utc};

use super::ai::AiGateway;
use super::date_window::{trailing_window, DateWindow};
use crate::dto::FeedbackResponse;
use crate::models::activity::{ActivityData, ActivityLog};
use crate::models::score::DailyScore;

/// Anything that can be placed in a feedback window.
pub trait WindowEntry {
    fn day(&self) -> NaiveDate;
    fn recorded_at(&self) -> DateTime<Utc>;
    fn score(&self) -> Option<i32>;
    fn summary_line(&self) -> String;
}

impl WindowEntry for DailyScore {
    fn day(&self) -> NaiveDate {
        self.log_date
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn score(&self) -> Option<i32> {
        Some(self.score)
    }

    fn summary_line(&self) -> String {
        match self.note.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(note) => format!("- Date: {}, Score: {}, Note: {}", self.log_date, self.score, note),
            None => format!("- Date: {}, Score: {}", self.log_date, self.score),
        }
    }
}

impl WindowEntry for ActivityLog {
    fn day(&self) -> NaiveDate {
        ActivityLog::day(self)
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn score(&self) -> Option<i32> {
        match &self.data {
            ActivityData::Focus(focus) => focus.score,
            ActivityData::Life(_) => None,
        }
    }

    fn summary_line(&self) -> String {
        format!(
            "- Date: {}, Type: {}, Data: {}",
            ActivityLog::day(self),
            self.data.log_type().as_str(),
            self.data.payload()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSummary {
    pub window: DateWindow,
    pub lines: Vec<String>,
    pub average_score: Option<f64>,
}

impl WindowSummary {
    pub fn record_count(&self) -> usize {
        self.lines.len()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Summary(WindowSummary),
    InsufficientData { found: usize, required: usize },
}

/// Select the entries that fall in the trailing `window_days` ending `today`
/// and summarize them, or report that fewer than `min_required` exist.
pub fn assemble<T: WindowEntry>(
    records: &[T],
    min_required: usize,
    window_days: u32,
    today: NaiveDate,
) -> WindowOutcome {
    let window = trailing_window(today, window_days);

    let mut selected: Vec<&T> = records.iter().filter(|r| window.contains(r.day())).collect();
    if selected.len() < min_required {
        return WindowOutcome::InsufficientData {
            found: selected.len(),
            required: min_required,
        };
    }

    selected.sort_by_key(|r| (r.day(), r.recorded_at()));

    let scores: Vec<i32> = selected.iter().filter_map(|r| r.score()).collect();
    let average_score = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64)
    };

    WindowOutcome::Summary(WindowSummary {
        window,
        lines: selected.iter().map(|r| r.summary_line()).collect(),
        average_score,
    })
}

/// Result of a feedback request. Never an error: the caller always has
/// something to show.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    Generated(String),
    InsufficientData { required: usize, window_days: u32 },
    GatewayFailed,
}

pub async fn request_feedback<F>(
    ai: &dyn AiGateway,
    outcome: WindowOutcome,
    window_days: u32,
    build_prompt: F,
) -> FeedbackOutcome
where
    F: FnOnce(&WindowSummary) -> String,
{
    let summary = match outcome {
        WindowOutcome::Summary(summary) => summary,
        WindowOutcome::InsufficientData { found, required } => {
            tracing::debug!(found, required, "Not enough entries for feedback");
            return FeedbackOutcome::InsufficientData {
                required,
                window_days,
            };
        }
    };

    tracing::debug!(
        records = summary.record_count(),
        window_start = %summary.window.start,
        "Requesting feedback"
    );
    let prompt = build_prompt(&summary);
    match ai.generate(&prompt).await {
        Ok(text) => FeedbackOutcome::Generated(text),
        Err(e) => {
            tracing::warn!(error = %e, "AI feedback unavailable, using placeholder");
            FeedbackOutcome::GatewayFailed
        }
    }
}

impl From<FeedbackOutcome> for FeedbackResponse {
    fn from(outcome: FeedbackOutcome) -> Self {
        match outcome {
            FeedbackOutcome::Generated(text) => FeedbackResponse {
                feedback: text,
                source: "ai".into(),
            },
            FeedbackOutcome::InsufficientData {
                required,
                window_days,
            } => FeedbackResponse {
                feedback: format!(
                    "At least {} entries from the last {} days are needed to generate feedback.",
                    required, window_days
                ),
                source: "insufficient_data".into(),
            },
            FeedbackOutcome::GatewayFailed => FeedbackResponse {
                feedback: "Feedback is unavailable right now. Please try again later.".into(),
                source: "fallback".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai::testing::ScriptedGateway;
    use chrono::Duration;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn score(day: NaiveDate, value: i32, note: Option<&str>) -> DailyScore {
        let ts = day.and_hms_opt(12, 0, 0).unwrap().and_utc();
        DailyScore {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            log_date: day,
            score: value,
            note: note.map(String::from),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_one_record_is_insufficient() {
        let today = date(2024, 3, 10);
        let records = vec![score(today, 70, None)];
        assert_eq!(
            assemble(&records, 2, 7, today),
            WindowOutcome::InsufficientData {
                found: 1,
                required: 2
            }
        );
    }

    #[test]
    fn test_two_records_produce_summary() {
        let today = date(2024, 3, 10);
        let records = vec![score(today, 70, None), score(today - Duration::days(1), 90, None)];
        match assemble(&records, 2, 7, today) {
            WindowOutcome::Summary(s) => {
                assert_eq!(s.record_count(), 2);
                assert_eq!(s.average_score, Some(80.0));
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_records_outside_trailing_window_do_not_count() {
        let today = date(2024, 3, 10);
        let records = vec![
            score(today, 70, None),
            score(today - Duration::days(7), 90, None), // eighth day back
        ];
        assert!(matches!(
            assemble(&records, 2, 7, today),
            WindowOutcome::InsufficientData { found: 1, .. }
        ));
    }

    #[test]
    fn test_summary_is_chronological() {
        let today = date(2024, 3, 10);
        let records = vec![
            score(today, 3, None),
            score(today - Duration::days(6), 1, Some("start")),
            score(today - Duration::days(2), 2, None),
        ];
        let WindowOutcome::Summary(s) = assemble(&records, 2, 7, today) else {
            panic!("expected summary");
        };
        assert_eq!(s.window.start, date(2024, 3, 4));
        assert_eq!(
            s.lines,
            vec![
                "- Date: 2024-03-04, Score: 1, Note: start".to_string(),
                "- Date: 2024-03-08, Score: 2".to_string(),
                "- Date: 2024-03-10, Score: 3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_insufficient_data_skips_gateway() {
        let gateway = ScriptedGateway::new(vec![Ok("should not be used".into())]);
        let outcome = WindowOutcome::InsufficientData {
            found: 0,
            required: 2,
        };
        let result = request_feedback(&gateway, outcome, 7, |_| "prompt".into()).await;
        assert_eq!(
            result,
            FeedbackOutcome::InsufficientData {
                required: 2,
                window_days: 7
            }
        );
        assert!(gateway.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_degrades() {
        let gateway = ScriptedGateway::failing();
        let today = date(2024, 3, 10);
        let records = vec![score(today, 1, None), score(today, 2, None)];
        let outcome = assemble(&records, 2, 7, today);
        let result = request_feedback(&gateway, outcome, 7, |s| s.text()).await;
        assert_eq!(result, FeedbackOutcome::GatewayFailed);

        let resp = FeedbackResponse::from(result);
        assert_eq!(resp.source, "fallback");
    }

    #[tokio::test]
    async fn test_generated_text_returned_verbatim() {
        let gateway = ScriptedGateway::new(vec![Ok("  Keep going!\n".into())]);
        let today = date(2024, 3, 10);
        let records = vec![score(today, 1, None), score(today - Duration::days(1), 2, None)];
        let outcome = assemble(&records, 2, 7, today);
        let result = request_feedback(&gateway, outcome, 7, |s| s.text()).await;
        assert_eq!(result, FeedbackOutcome::Generated("  Keep going!\n".into()));
        assert!(gateway.prompts()[0].contains("2024-03-09"));
    }
}
