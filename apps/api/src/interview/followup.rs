use tracing::debug;

use crate::generation::{pipeline, GenerationError, Generator};
use crate::interview::prompts::{FOLLOWUP_SYSTEM_TEMPLATE, TRUNCATION_MARKER};
use crate::interview::stage::{stage_for_history, Stage};
use crate::interview::recent_turns;
use crate::llm_client::prompts::fill;
use crate::llm_client::ChatMessage;
use crate::models::interview::ConversationTurn;

/// Resume characters carried into the interviewer prompt.
pub const RESUME_PROMPT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpReply {
    pub text: String,
    /// False when `text` is a fallback message rather than a model reply.
    pub generated: bool,
    pub stage: Stage,
}

/// Produces the interviewer's next message for `history`, which must already
/// end with the candidate's latest turn.
pub async fn generate_followup(
    generator: &Generator,
    history: &[ConversationTurn],
    job_description: &str,
    resume_text: &str,
) -> Result<FollowUpReply, GenerationError> {
    let policy = generator.policies().interview_followup;
    let stage = stage_for_history(history);
    debug!("Interview at stage {:?} after {} messages", stage, history.len());

    let messages = build_messages(stage, history, job_description, resume_text);
    let outcome = generator
        .attempt(&policy, |_| messages.clone(), decode_reply)
        .await;
    let generated = outcome.is_ok();

    let text = pipeline::settle(&policy, outcome, |e| generator.fallbacks().followup(e))?;
    Ok(FollowUpReply {
        text,
        generated,
        stage,
    })
}

fn build_messages(
    stage: Stage,
    history: &[ConversationTurn],
    job_description: &str,
    resume_text: &str,
) -> Vec<ChatMessage> {
    let resume = resume_excerpt(resume_text);
    let system = fill(
        FOLLOWUP_SYSTEM_TEMPLATE,
        &[
            ("stage", stage.label()),
            ("job_description", job_description),
            ("resume", resume.as_str()),
        ],
    );

    let window = recent_turns(history);
    let mut messages = Vec::with_capacity(window.len() + 1);
    messages.push(ChatMessage::system(system));
    messages.extend(window.iter().map(ChatMessage::from));
    messages
}

fn resume_excerpt(resume_text: &str) -> String {
    let resume_text = resume_text.trim();
    if resume_text.is_empty() {
        return "Not provided".to_string();
    }
    if resume_text.chars().count() <= RESUME_PROMPT_CHARS {
        return resume_text.to_string();
    }
    let mut excerpt: String = resume_text.chars().take(RESUME_PROMPT_CHARS).collect();
    excerpt.push_str(TRUNCATION_MARKER);
    excerpt
}

fn decode_reply(raw: &str) -> Result<String, GenerationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(GenerationError::ShapeInvalid("empty reply".to_string()));
    }
    Ok(text.to_string())
}
