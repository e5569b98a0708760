//! Generation pipeline: every LLM-backed task (daily questions, coding problems,
//! code evaluation, interview follow-ups and feedback) runs through `Generator`.
//!
//! Flow per task: credential gate → prompt → LLM call → normalize → parse →
//! shape validation → post-processing, retried under the task's `TaskPolicy`,
//! then settled into either a value or the task's deterministic fallback.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::llm_client::credential;
use crate::llm_client::parse::ParseError;
use crate::llm_client::{ChatMessage, ChatModel, LlmError};

pub mod coding_problem;
pub mod evaluation;
pub mod fallbacks;
pub mod pipeline;
pub mod policy;
pub mod prompts;
pub mod questions;
pub mod shape;
pub mod topics;

use fallbacks::FallbackTable;
use policy::{Policies, TaskPolicy};
use topics::TopicCatalog;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("OpenAI API Key is missing or invalid. Please configure it in .env to enable generation.")]
    CredentialMissing,

    #[error("API Rate Limit Exceeded ({detail}). Please check your API quota or try again later.")]
    RateLimited { detail: String },

    #[error("malformed response: {0}")]
    MalformedResponse(#[from] ParseError),

    #[error("response shape invalid: {0}")]
    ShapeInvalid(String),

    #[error("LLM call failed: {0}")]
    Transport(#[source] LlmError),

    #[error("generation failed after {attempts} attempt(s){}", describe_last(.last))]
    Exhausted {
        attempts: u32,
        last: Option<Box<GenerationError>>,
        /// Text of the last reply that reached the parser, if any did.
        last_raw: Option<String>,
    },
}

fn describe_last(last: &Option<Box<GenerationError>>) -> String {
    last.as_ref().map(|e| format!(": {e}")).unwrap_or_default()
}

impl GenerationError {
    /// True when the final failure was about the reply's content rather than the call.
    pub fn is_content_failure(&self) -> bool {
        match self {
            GenerationError::MalformedResponse(_) | GenerationError::ShapeInvalid(_) => true,
            GenerationError::Exhausted { last: Some(last), .. } => last.is_content_failure(),
            _ => false,
        }
    }
}

/// Shared handle for all generation tasks. Cheap to clone; carried in `AppState`.
///
/// Policies, topic pools and fallback payloads are immutable values injected
/// here rather than module-level tables.
#[derive(Clone)]
pub struct Generator {
    llm: Arc<dyn ChatModel>,
    credential_valid: bool,
    policies: Arc<Policies>,
    topics: Arc<TopicCatalog>,
    fallbacks: Arc<FallbackTable>,
}

impl Generator {
    pub fn new(llm: Arc<dyn ChatModel>, credential: Option<&str>) -> Self {
        let credential_valid = credential::is_valid(credential);
        if !credential_valid {
            warn!("LLM credential is missing or a placeholder; generation tasks will use fallbacks");
        }
        Self {
            llm,
            credential_valid,
            policies: Arc::new(Policies::default()),
            topics: Arc::new(TopicCatalog::default()),
            fallbacks: Arc::new(FallbackTable::default()),
        }
    }

    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    pub fn topics(&self) -> &TopicCatalog {
        &self.topics
    }

    pub fn fallbacks(&self) -> &FallbackTable {
        &self.fallbacks
    }

    /// Runs one task through the credential gate and the retry pipeline.
    /// No LLM call is made when the credential is invalid.
    pub async fn attempt<T, P, D>(
        &self,
        policy: &TaskPolicy,
        prompt: P,
        decode: D,
    ) -> Result<T, GenerationError>
    where
        P: FnMut(u32) -> Vec<ChatMessage>,
        D: FnMut(&str) -> Result<T, GenerationError>,
    {
        if !self.credential_valid {
            return Err(GenerationError::CredentialMissing);
        }
        pipeline::run(self.llm.as_ref(), policy, prompt, decode).await
    }
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Arc;

    use super::Generator;
    use crate::llm_client::testing::ScriptedModel;

    pub const TEST_KEY: &str = "sk-test-4f9a1c0b7e2d";

    /// A generator with a valid key backed by the given scripted replies.
    pub fn scripted(replies: &[&str]) -> (Generator, Arc<ScriptedModel>) {
        let model = Arc::new(ScriptedModel::replying(replies));
        (Generator::new(model.clone(), Some(TEST_KEY)), model)
    }

    pub fn with_model(model: Arc<ScriptedModel>) -> Generator {
        Generator::new(model, Some(TEST_KEY))
    }

    /// A generator whose credential is a template placeholder.
    pub fn without_key() -> (Generator, Arc<ScriptedModel>) {
        let model = Arc::new(ScriptedModel::replying(&["{}"]));
        (Generator::new(model.clone(), Some("INSERT_YOUR_KEY_HERE")), model)
    }
}
