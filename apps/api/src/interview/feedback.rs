use serde_json::{Map, Value};
use tracing::info;

use crate::generation::shape::{first_object, kind_of, parse_reply, require_keys, stringify};
use crate::generation::{pipeline, GenerationError, Generator};
use crate::interview::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::interview::recent_turns;
use crate::llm_client::normalize::Shape;
use crate::llm_client::prompts::{fill, RAW_JSON_INSTRUCTION};
use crate::llm_client::ChatMessage;
use crate::models::interview::{ConversationTurn, FeedbackReport};

const MAX_LIST_ITEMS: usize = 3;
const MAX_SCORE: f64 = 100.0;

/// Scores the transcript. Always yields a well-shaped report; failures are
/// folded into the fallback table's reports.
pub async fn generate_feedback(
    generator: &Generator,
    history: &[ConversationTurn],
    job_description: &str,
) -> Result<FeedbackReport, GenerationError> {
    let policy = generator.policies().interview_feedback;
    let messages = build_messages(history, job_description);

    let outcome = generator
        .attempt(&policy, |_| messages.clone(), decode_report)
        .await;

    let report = pipeline::settle(&policy, outcome, |e| generator.fallbacks().feedback(e))?;
    info!("Interview feedback ready (score {})", report.score);
    Ok(report)
}

fn build_messages(history: &[ConversationTurn], job_description: &str) -> Vec<ChatMessage> {
    let transcript = serde_json::to_string(recent_turns(history)).unwrap_or_default();
    let prompt = fill(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("raw_json_instruction", RAW_JSON_INSTRUCTION),
            ("job_description", job_description),
            ("transcript", transcript.as_str()),
        ],
    );
    vec![ChatMessage::system(FEEDBACK_SYSTEM), ChatMessage::user(prompt)]
}

fn decode_report(raw: &str) -> Result<FeedbackReport, GenerationError> {
    let map = first_object(parse_reply(raw, Shape::ObjectOrArray)?)?;
    require_keys(&map, &["score"])?;

    Ok(FeedbackReport {
        score: coerce_score(map.get("score").unwrap_or(&Value::Null))?,
        strengths: short_list(&map, "strengths"),
        weaknesses: short_list(&map, "weaknesses"),
        summary: map
            .get("summary")
            .map(stringify)
            .unwrap_or_default()
            .trim()
            .to_string(),
    })
}

/// Numbers and numeric strings ("85", "85/100", "72.5") are clamped into 0-100.
fn coerce_score(value: &Value) -> Result<u8, GenerationError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .split('/')
            .next()
            .and_then(|head| head.trim().trim_end_matches('%').parse::<f64>().ok()),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n.round().clamp(0.0, MAX_SCORE) as u8),
        _ => Err(GenerationError::ShapeInvalid(format!(
            "score is not numeric ({})",
            kind_of(value)
        ))),
    }
}

/// Up to three non-blank entries. A bare string counts as a one-item list.
fn short_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    let items: Vec<&Value> = match map.get(key) {
        Some(Value::Array(values)) => values.iter().collect(),
        Some(other @ Value::String(_)) => vec![other],
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(stringify)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}
