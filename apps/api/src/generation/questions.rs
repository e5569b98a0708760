//! Daily assessment batch: 5 Java + 5 DSA + 5 OOPs MCQs and one subjective question.

use rand::Rng;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::generation::prompts::{
    MCQ_FORMAT_LINE, MCQ_REQUIREMENT, QUESTIONS_PROMPT_TEMPLATE, QUESTIONS_SYSTEM,
    SUBJECTIVE_FORMAT_LINE, SUBJECTIVE_REQUIREMENT,
};
use crate::generation::shape::{kind_of, parse_reply, require_text, stringify};
use crate::generation::topics::{backfill_categories, TopicCatalog, TopicPool};
use crate::generation::{pipeline, GenerationError, Generator};
use crate::llm_client::normalize::Shape;
use crate::llm_client::prompts::{fill, RAW_JSON_INSTRUCTION};
use crate::llm_client::ChatMessage;
use crate::models::assessment::{GeneratedQuestion, QuestionKind};

/// Generates today's batch. Failures are raised to the caller.
pub async fn generate_daily_questions(
    generator: &Generator,
) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let policy = generator.policies().daily_questions;
    let catalog = generator.topics();

    let outcome = generator
        .attempt(
            &policy,
            |_| build_messages(catalog, &mut rand::thread_rng()),
            |raw| decode_batch(raw, catalog),
        )
        .await;

    let questions = pipeline::settle(&policy, outcome, |_| Vec::new())?;
    info!("Generated {} assessment questions", questions.len());
    Ok(questions)
}

/// Builds the prompt with a fresh sub-topic focus per pool on every call.
fn build_messages<R: Rng + ?Sized>(catalog: &TopicCatalog, rng: &mut R) -> Vec<ChatMessage> {
    let mut requirements = Vec::with_capacity(catalog.mcq.len() + 1);
    let mut format_lines = Vec::with_capacity(catalog.mcq.len() + 1);

    for (i, pool) in catalog.mcq.iter().enumerate() {
        requirements.push(format!(
            "{}. {}",
            i + 1,
            requirement(MCQ_REQUIREMENT, pool, rng)
        ));
        format_lines.push(fill(MCQ_FORMAT_LINE, &[("label", pool.label.as_str())]));
    }
    requirements.push(format!(
        "{}. {}",
        catalog.mcq.len() + 1,
        requirement(SUBJECTIVE_REQUIREMENT, &catalog.subjective, rng)
    ));
    format_lines.push(fill(
        SUBJECTIVE_FORMAT_LINE,
        &[("label", catalog.subjective.label.as_str())],
    ));

    let requirements = requirements.join("\n");
    let format_lines = format_lines.join("\n");
    let prompt = fill(
        QUESTIONS_PROMPT_TEMPLATE,
        &[
            ("raw_json_instruction", RAW_JSON_INSTRUCTION),
            ("requirements", requirements.as_str()),
            ("format_lines", format_lines.as_str()),
        ],
    );

    vec![ChatMessage::system(QUESTIONS_SYSTEM), ChatMessage::user(prompt)]
}

fn requirement<R: Rng + ?Sized>(template: &str, pool: &TopicPool, rng: &mut R) -> String {
    let focus = pool.pick_subtopic(rng).unwrap_or(&pool.label);
    let count = pool.count.to_string();
    fill(
        template,
        &[("count", count.as_str()), ("label", pool.label.as_str()), ("focus", focus)],
    )
}

fn decode_batch(raw: &str, catalog: &TopicCatalog) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let mut items = match parse_reply(raw, Shape::Array)? {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) => {
            return Err(GenerationError::ShapeInvalid("empty question list".to_string()))
        }
        other => {
            return Err(GenerationError::ShapeInvalid(format!(
                "expected a list of questions, got {}",
                kind_of(&other)
            )))
        }
    };

    let expected = catalog.expected_total();
    if items.len() != expected {
        warn!(
            "Question batch has {} items, expected {expected}; keeping it",
            items.len()
        );
    }

    backfill_categories(&mut items, catalog);

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => question_from(&map).map_err(|e| {
                GenerationError::ShapeInvalid(format!("question {}: {e}", index + 1))
            }),
            other => Err(GenerationError::ShapeInvalid(format!(
                "question {} is {}",
                index + 1,
                kind_of(&other)
            ))),
        })
        .collect()
}

/// Coerces one item. A missing or unknown `type` is inferred from whether
/// options were supplied; non-string options and answers keep their JSON text.
fn question_from(map: &Map<String, Value>) -> Result<GeneratedQuestion, GenerationError> {
    let text = require_text(map, "text")?;
    let category = map
        .get("category")
        .map(stringify)
        .unwrap_or_default();

    let options: Vec<String> = match map.get("options") {
        Some(Value::Array(values)) => values
            .iter()
            .map(stringify)
            .filter(|o| !o.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    };

    let kind = map
        .get("type")
        .and_then(Value::as_str)
        .and_then(QuestionKind::from_label)
        .unwrap_or(if options.is_empty() {
            QuestionKind::Subjective
        } else {
            QuestionKind::Mcq
        });

    Ok(GeneratedQuestion {
        category,
        kind,
        text,
        options,
        correct_answer: map.get("correct_answer").map(stringify).unwrap_or_default(),
    })
}
