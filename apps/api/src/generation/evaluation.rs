//! Code judging. Nothing is compiled or run; the verdict is the model's reading of the code.

use serde_json::{Map, Value};

use crate::generation::prompts::{EVALUATION_PROMPT_TEMPLATE, EVALUATION_SYSTEM};
use crate::generation::shape::{first_object, parse_reply, require_keys, stringify};
use crate::generation::{pipeline, GenerationError, Generator};
use crate::llm_client::normalize::Shape;
use crate::llm_client::prompts::{fill, RAW_JSON_INSTRUCTION};
use crate::llm_client::ChatMessage;
use crate::models::coding::{Analysis, EvaluationResult, EvaluationStatus};

pub async fn evaluate_code(
    generator: &Generator,
    code: &str,
    language: &str,
    problem_title: &str,
) -> Result<EvaluationResult, GenerationError> {
    let policy = generator.policies().code_evaluation;

    let outcome = generator
        .attempt(
            &policy,
            |_| build_messages(code, language, problem_title),
            decode_verdict,
        )
        .await;

    pipeline::settle(&policy, outcome, |e| generator.fallbacks().evaluation(e))
}

fn build_messages(code: &str, language: &str, problem_title: &str) -> Vec<ChatMessage> {
    let prompt = fill(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("raw_json_instruction", RAW_JSON_INSTRUCTION),
            ("language", language),
            ("problem_title", problem_title),
            ("code", code),
        ],
    );
    vec![ChatMessage::system(EVALUATION_SYSTEM), ChatMessage::user(prompt)]
}

fn decode_verdict(raw: &str) -> Result<EvaluationResult, GenerationError> {
    let map = first_object(parse_reply(raw, Shape::ObjectOrArray)?)?;
    require_keys(&map, &["status", "output"])?;

    let status = match map.get("status").map(stringify).as_deref().map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("success") => EvaluationStatus::Success,
        Some(s) if s.eq_ignore_ascii_case("error") => EvaluationStatus::Error,
        other => {
            return Err(GenerationError::ShapeInvalid(format!(
                "unknown status {:?}",
                other.unwrap_or_default()
            )))
        }
    };

    let analysis = match map.get("analysis") {
        Some(Value::Object(fields)) => Some(analysis_from(fields)),
        _ => None,
    };

    Ok(EvaluationResult {
        status,
        output: map.get("output").map(stringify).unwrap_or_default(),
        analysis,
    })
}

fn analysis_from(fields: &Map<String, Value>) -> Analysis {
    let text = |key: &str| fields.get(key).map(stringify).unwrap_or_default();
    Analysis {
        correctness: text("correctness"),
        time_complexity: text("time_complexity"),
        space_complexity: text("space_complexity"),
        feedback: text("feedback"),
    }
}
