//! Coding practice problem generation.

use rand::Rng;
use serde_json::{Map, Value};
use tracing::info;

use crate::generation::prompts::{CODING_PROMPT_TEMPLATE, CODING_SYSTEM};
use crate::generation::shape::{first_object, kind_of, parse_reply, require_keys, require_text, stringify};
use crate::generation::topics::TopicCatalog;
use crate::generation::{pipeline, GenerationError, Generator};
use crate::llm_client::normalize::Shape;
use crate::llm_client::prompts::{fill, RAW_JSON_INSTRUCTION};
use crate::llm_client::ChatMessage;
use crate::models::coding::{CodingProblem, Difficulty, TestCase};

const REQUIRED_KEYS: &[&str] = &["title", "description", "test_cases"];
const FALLBACK_THEME: &str = "arrays";

/// Always returns a renderable problem; failures resolve to a `System` or
/// `Error` placeholder from the fallback table.
pub async fn generate_coding_problem(generator: &Generator) -> Result<CodingProblem, GenerationError> {
    let policy = generator.policies().coding_problem;
    let catalog = generator.topics();

    let outcome = generator
        .attempt(
            &policy,
            |_| build_messages(catalog, &mut rand::thread_rng()),
            |raw| decode_problem(raw, rand::thread_rng().gen_range(100..=9999)),
        )
        .await;

    let problem = pipeline::settle(&policy, outcome, |e| generator.fallbacks().coding_problem(e))?;
    info!(
        "Coding problem ready: {} ({:?})",
        problem.title, problem.difficulty
    );
    Ok(problem)
}

fn build_messages<R: Rng + ?Sized>(catalog: &TopicCatalog, rng: &mut R) -> Vec<ChatMessage> {
    let theme = catalog.pick_coding_theme(rng).unwrap_or(FALLBACK_THEME);
    let prompt = fill(
        CODING_PROMPT_TEMPLATE,
        &[("raw_json_instruction", RAW_JSON_INSTRUCTION), ("theme", theme)],
    );
    vec![ChatMessage::system(CODING_SYSTEM), ChatMessage::user(prompt)]
}

fn decode_problem(raw: &str, id: u32) -> Result<CodingProblem, GenerationError> {
    let map = first_object(parse_reply(raw, Shape::ObjectOrArray)?)?;
    require_keys(&map, REQUIRED_KEYS)?;

    let difficulty = map
        .get("difficulty")
        .and_then(Value::as_str)
        .and_then(Difficulty::from_label)
        .unwrap_or(Difficulty::Medium);

    Ok(CodingProblem {
        id,
        title: require_text(&map, "title")?,
        description: require_text(&map, "description")?,
        difficulty,
        test_cases: test_cases(&map)?,
    })
}

fn test_cases(map: &Map<String, Value>) -> Result<Vec<TestCase>, GenerationError> {
    let Some(Value::Array(cases)) = map.get("test_cases") else {
        return Err(GenerationError::ShapeInvalid(
            "'test_cases' must be a list".to_string(),
        ));
    };

    cases
        .iter()
        .map(|case| match case {
            Value::Object(fields) => Ok(TestCase {
                input: fields.get("input").map(stringify).unwrap_or_default(),
                output: fields.get("output").map(stringify).unwrap_or_default(),
            }),
            other => Err(GenerationError::ShapeInvalid(format!(
                "test case is {}",
                kind_of(other)
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::generation::test_support::{scripted, with_model, without_key};
    use crate::llm_client::testing::{rate_limited, ScriptedModel};

    const GOOD: &str = r#"{
        "title": "Pair Sum",
        "description": "Return indices of two numbers adding to target.",
        "difficulty": "easy",
        "test_cases": [
            {"input": "[2,7,11,15], 9", "output": "[0,1]"},
            {"input": [3, 3], "output": [0, 1]}
        ]
    }"#;

    #[tokio::test]
    async fn test_valid_problem_is_coerced() {
        let (generator, _) = scripted(&[GOOD]);
        let problem = generate_coding_problem(&generator).await.unwrap();

        assert_eq!(problem.title, "Pair Sum");
        assert_eq!(problem.difficulty, Difficulty::Easy);
        assert!((100..=9999).contains(&problem.id));
        assert_eq!(problem.test_cases[1].input, "[3,3]");
        assert_eq!(problem.test_cases[1].output, "[0,1]");
    }

    #[tokio::test]
    async fn test_list_wrapped_problem_uses_first_item() {
        let reply = format!("```\n[{GOOD}]\n```");
        let (generator, _) = scripted(&[&reply]);
        let problem = generate_coding_problem(&generator).await.unwrap();
        assert_eq!(problem.title, "Pair Sum");
    }

    #[tokio::test]
    async fn test_unknown_difficulty_defaults_to_medium() {
        let reply = r#"{"title": "T", "description": "D", "difficulty": "brutal", "test_cases": []}"#;
        let (generator, _) = scripted(&[reply]);
        let problem = generate_coding_problem(&generator).await.unwrap();
        assert_eq!(problem.difficulty, Difficulty::Medium);
    }

    #[tokio::test]
    async fn test_three_malformed_replies_degrade_to_error_problem() {
        let (generator, model) = scripted(&["not json", "{'title': ", "[]"]);
        let problem = generate_coding_problem(&generator).await.unwrap();

        assert_eq!(problem.difficulty, Difficulty::Error);
        assert_eq!(problem.title, "Generation Failed");
        assert!(problem.test_cases.is_empty());
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_key_returns_system_problem() {
        let (generator, model) = without_key();
        let problem = generate_coding_problem(&generator).await.unwrap();
        assert_eq!(problem.id, 1);
        assert_eq!(problem.title, "API Key Missing");
        assert_eq!(problem.difficulty, Difficulty::System);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_returns_rate_limit_problem() {
        let model = Arc::new(ScriptedModel::new(vec![Err(rate_limited())]));
        let problem = generate_coding_problem(&with_model(model.clone())).await.unwrap();
        assert_eq!(problem.title, "Rate Limit Exceeded");
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn test_missing_test_cases_is_a_shape_error() {
        let err = decode_problem(r#"{"title": "T", "description": "D"}"#, 7).unwrap_err();
        assert!(matches!(err, GenerationError::ShapeInvalid(_)));
    }
}
