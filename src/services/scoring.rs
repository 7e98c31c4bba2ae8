use serde::Deserialize;

use super::ai::AiGateway;
use super::extract::parse_json_reply;
use super::prompts::focus_scoring_prompt;
use crate::models::activity::FocusData;

pub const PLACEHOLDER_SCORE: i32 = 0;
pub const PLACEHOLDER_FEEDBACK: &str = "AI evaluation is unavailable right now.";

#[derive(Debug, Deserialize)]
struct Verdict {
    score: i32,
    ai_feedback: String,
}

/// Fill in `score` and `ai_feedback` from the gateway. Any failure leaves a
/// placeholder so the session is still saved.
pub async fn score_focus(ai: &dyn AiGateway, focus: &mut FocusData) {
    let prompt = focus_scoring_prompt(&focus.task_content, focus.duration_minutes);

    let verdict = match ai.generate(&prompt).await {
        Ok(reply) => parse_json_reply(&reply).and_then(|v| serde_json::from_value::<Verdict>(v).ok()),
        Err(e) => {
            tracing::warn!(error = %e, "AI scoring failed");
            None
        }
    };

    match verdict {
        Some(v) => {
            focus.score = Some(v.score.clamp(0, 100));
            focus.ai_feedback = Some(v.ai_feedback);
        }
        None => {
            tracing::warn!("Saving focus session with placeholder score");
            focus.score = Some(PLACEHOLDER_SCORE);
            focus.ai_feedback = Some(PLACEHOLDER_FEEDBACK.into());
        }
    }
}
