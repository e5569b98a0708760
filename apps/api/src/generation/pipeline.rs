//! The bounded retry loop shared by every generation task.

use tracing::{error, info, warn};

use crate::generation::policy::{Propagation, TaskPolicy};
use crate::generation::GenerationError;
use crate::llm_client::{ChatMessage, ChatModel, ChatRequest, LlmError};

/// Calls the model up to `policy.max_attempts` times.
///
/// `prompt` builds the messages for a given attempt index (so tasks can vary
/// the sub-topic per attempt); `decode` turns raw reply text into the task's
/// value or a content error. A rate-limit signal ends the loop immediately.
/// Each call is abandoned after `policy.timeout` and counts as a failed attempt.
pub async fn run<T, P, D>(
    llm: &dyn ChatModel,
    policy: &TaskPolicy,
    mut prompt: P,
    mut decode: D,
) -> Result<T, GenerationError>
where
    P: FnMut(u32) -> Vec<ChatMessage>,
    D: FnMut(&str) -> Result<T, GenerationError>,
{
    let mut last_error: Option<GenerationError> = None;
    let mut last_raw: Option<String> = None;

    for attempt in 0..policy.max_attempts {
        let request = ChatRequest {
            messages: prompt(attempt),
            temperature: policy.temperature,
            timeout: policy.timeout,
        };

        let outcome = match tokio::time::timeout(policy.timeout, llm.complete(&request)).await {
            Ok(Ok(raw)) => {
                let decoded = decode(&raw);
                last_raw = Some(raw);
                decoded
            }
            Ok(Err(e)) => Err(GenerationError::Transport(e)),
            Err(_) => Err(GenerationError::Transport(LlmError::Timeout(policy.timeout))),
        };

        match outcome {
            Ok(value) => {
                if attempt > 0 {
                    info!(
                        "{} succeeded on attempt {}/{}",
                        policy.task,
                        attempt + 1,
                        policy.max_attempts
                    );
                }
                return Ok(value);
            }
            Err(GenerationError::Transport(e)) if e.is_rate_limited() => {
                warn!("{} rate limited, skipping remaining attempts: {e}", policy.task);
                return Err(GenerationError::RateLimited {
                    detail: e.to_string(),
                });
            }
            Err(e) => {
                warn!(
                    "{} attempt {}/{} failed: {e}",
                    policy.task,
                    attempt + 1,
                    policy.max_attempts
                );
                last_error = Some(e);
            }
        }
    }

    Err(GenerationError::Exhausted {
        attempts: policy.max_attempts,
        last: last_error.map(Box::new),
        last_raw,
    })
}

/// Applies the policy's propagation flag: `Raise` passes the error through,
/// `Degrade` swaps it for the fallback built by `degrade`.
pub fn settle<T>(
    policy: &TaskPolicy,
    outcome: Result<T, GenerationError>,
    degrade: impl FnOnce(&GenerationError) -> T,
) -> Result<T, GenerationError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(e) => match policy.propagation {
            Propagation::Degrade => {
                warn!("{} degraded to fallback: {e}", policy.task);
                Ok(degrade(&e))
            }
            Propagation::Raise => {
                error!("{} failed: {e}", policy.task);
                Err(e)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::llm_client::testing::{rate_limited, ScriptedModel, StalledModel};

    const POLICY: TaskPolicy = TaskPolicy {
        task: "test_task",
        max_attempts: 3,
        timeout: Duration::from_secs(5),
        temperature: 0.3,
        propagation: Propagation::Degrade,
    };

    fn prompt(attempt: u32) -> Vec<ChatMessage> {
        vec![ChatMessage::user(format!("attempt {attempt}"))]
    }

    fn decode_number(raw: &str) -> Result<u32, GenerationError> {
        raw.trim()
            .parse()
            .map_err(|_| GenerationError::ShapeInvalid(format!("not a number: {raw}")))
    }

    #[tokio::test]
    async fn test_first_good_reply_wins() {
        let model = ScriptedModel::replying(&["42", "7"]);
        let value = run(&model, &POLICY, prompt, decode_number).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_bad_replies_are_retried_with_fresh_prompts() {
        let model = ScriptedModel::replying(&["nope", "still no", "9"]);
        let value = run(&model, &POLICY, prompt, decode_number).await.unwrap();
        assert_eq!(value, 9);

        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].messages[0].content, "attempt 2");
        assert_eq!(requests[2].timeout, POLICY.timeout);
        assert!((requests[2].temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_rate_limit_short_circuits_after_one_attempt() {
        let model = ScriptedModel::new(vec![Err(rate_limited()), Ok("1".to_string())]);
        let err = run(&model, &POLICY, prompt, decode_number).await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited { .. }));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts_and_last_raw_text() {
        let model = ScriptedModel::replying(&["a", "b", "c", "4"]);
        let err = run(&model, &POLICY, prompt, decode_number).await.unwrap_err();
        match err {
            GenerationError::Exhausted {
                attempts,
                last,
                last_raw,
            } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last.as_deref(), Some(GenerationError::ShapeInvalid(_))));
                assert_eq!(last_raw.as_deref(), Some("c"));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_calls_time_out_and_exhaust() {
        let err = run(&StalledModel, &POLICY, prompt, decode_number)
            .await
            .unwrap_err();
        match err {
            GenerationError::Exhausted { last, last_raw, .. } => {
                assert!(matches!(
                    last.as_deref(),
                    Some(GenerationError::Transport(LlmError::Timeout(_)))
                ));
                assert!(last_raw.is_none());
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_settle_degrades_or_raises_by_policy() {
        let degraded = settle(&POLICY, Err(GenerationError::CredentialMissing), |_| 0u32);
        assert_eq!(degraded.unwrap(), 0);

        let raising = TaskPolicy {
            propagation: Propagation::Raise,
            ..POLICY
        };
        let raised = settle(&raising, Err(GenerationError::CredentialMissing), |_| 0u32);
        assert!(matches!(raised, Err(GenerationError::CredentialMissing)));
    }
}
