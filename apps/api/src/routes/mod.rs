pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{assessment, coding, interview, profile};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/health", get(health::health_handler))
        // Assessment
        .route(
            "/api/v1/assessment/daily",
            get(assessment::handlers::handle_daily),
        )
        .route(
            "/api/v1/assessment/submit",
            post(assessment::handlers::handle_submit),
        )
        // Coding
        .route("/api/v1/coding/daily", get(coding::handlers::handle_daily))
        .route("/api/v1/coding/run", post(coding::handlers::handle_run))
        .route("/api/v1/coding/submit", post(coding::handlers::handle_submit))
        // Interview
        .route(
            "/api/v1/interview/start",
            post(interview::handlers::handle_start),
        )
        .route(
            "/api/v1/interview/:id/chat",
            post(interview::handlers::handle_chat),
        )
        .route(
            "/api/v1/interview/:id/end",
            post(interview::handlers::handle_end),
        )
        // Profile
        .route("/api/v1/profile/stats", get(profile::handlers::handle_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::generation::test_support::{scripted, without_key};
    use crate::generation::Generator;
    use crate::llm_client::testing::ScriptedModel;
    use crate::models::interview::TurnRole;
    use crate::store::{MemoryStore, Store};

    const BOUNDARY: &str = "prepdeck-test-boundary";

    struct Harness {
        state: AppState,
        store: Arc<MemoryStore>,
        model: Arc<ScriptedModel>,
    }

    impl Harness {
        fn new((generator, model): (Generator, Arc<ScriptedModel>)) -> Self {
            let store = Arc::new(MemoryStore::new());
            let state = AppState {
                store: store.clone(),
                generator,
            };
            Self {
                state,
                store,
                model,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = build_router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn start_interview(&self, user_id: Uuid) -> i64 {
            let body = format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"user_id\"\r\n\r\n\
                 {user_id}\r\n\
                 --{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"job_description\"\r\n\r\n\
                 Backend engineer, Rust and Postgres\r\n\
                 --{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"resume\"; filename=\"cv.txt\"\r\n\
                 Content-Type: text/plain\r\n\r\n\
                 Five years building payment APIs.\r\n\
                 --{BOUNDARY}--\r\n"
            );
            let request = Request::post("/api/v1/interview/start")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap();

            let (status, body) = self.send(request).await;
            assert_eq!(status, StatusCode::OK, "{body}");
            assert_eq!(body["message"], "Interview started. Please introduce yourself.");
            body["session_id"].as_i64().unwrap()
        }
    }

    fn question_batch() -> String {
        let mut items: Vec<Value> = (0..15)
            .map(|i| {
                json!({
                    "category": "General",
                    "type": "mcq",
                    "text": format!("Question {i}?"),
                    "options": ["right", "wrong"],
                    "correct_answer": "right"
                })
            })
            .collect();
        items.push(json!({
            "type": "subjective",
            "text": "Describe a hard bug.",
            "options": [],
            "correct_answer": "Anything thoughtful"
        }));
        Value::Array(items).to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new(without_key());
        let (status, body) = harness.get("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_daily_assessment_without_key_is_actionable_503() {
        let harness = Harness::new(without_key());
        let (status, body) = harness.get("/api/v1/assessment/daily").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("API Key is missing or invalid"));
        assert_eq!(harness.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_daily_assessment_is_stored_and_hides_answers() {
        let batch = question_batch();
        let harness = Harness::new(scripted(&[&batch]));

        let (status, first) = harness.get("/api/v1/assessment/daily").await;
        assert_eq!(status, StatusCode::OK);
        let questions = first["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 16);
        assert_eq!(questions[0]["category"], "Java");
        assert_eq!(questions[15]["category"], "Subjective");
        assert!(questions.iter().all(|q| q.get("correct_answer").is_none()));

        let (_, second) = harness.get("/api/v1/assessment/daily").await;
        assert_eq!(second["assessment_id"], first["assessment_id"]);
        assert_eq!(harness.model.calls(), 1);
    }

    #[tokio::test]
    async fn test_assessment_submit_scores_mcqs_and_records_attempt() {
        let batch = question_batch();
        let harness = Harness::new(scripted(&[&batch]));
        harness.get("/api/v1/assessment/daily").await;

        let user_id = Uuid::new_v4();
        let (status, body) = harness
            .post_json(
                "/api/v1/assessment/submit",
                json!({
                    "user_id": user_id,
                    "responses": {
                        "Question 0?": "right",
                        "Question 1?": "right",
                        "Question 2?": "right",
                        "Question 3?": "wrong",
                        "Describe a hard bug.": "A race in a cache"
                    }
                }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "submitted");
        assert_eq!(body["score"], 20);
        assert_eq!(body["results"].as_array().unwrap().len(), 15);

        let activity = harness.store.activity(user_id).await.unwrap();
        assert_eq!(activity.assessment_scores, vec![20]);
    }

    #[tokio::test]
    async fn test_submit_without_todays_assessment_is_404() {
        let harness = Harness::new(without_key());
        let (status, _) = harness
            .post_json(
                "/api/v1/assessment/submit",
                json!({"user_id": Uuid::new_v4(), "responses": {}}),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_coding_daily_without_key_is_placeholder_problem() {
        let harness = Harness::new(without_key());
        let (status, body) = harness.get("/api/v1/coding/daily").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "API Key Missing");
        assert_eq!(body["difficulty"], "System");
        assert_eq!(body["test_cases"], json!([]));
    }

    #[tokio::test]
    async fn test_coding_submit_stores_verdict() {
        let harness = Harness::new(scripted(&[
            r#"{"status": "success", "output": "All cases pass", "analysis": {"correctness": "Passed"}}"#,
        ]));
        let user_id = Uuid::new_v4();

        let (status, body) = harness
            .post_json(
                "/api/v1/coding/submit",
                json!({
                    "user_id": user_id,
                    "code": "def two_sum(a, t): ...",
                    "language": "python",
                    "problem_id": 4321
                }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"], "Passed");
        assert_eq!(body["result"], "All cases pass");
        assert!(harness.model.requests()[0].messages[1]
            .content
            .contains("Problem: Two Sum"));

        let activity = harness.store.activity(user_id).await.unwrap();
        assert_eq!(activity.coding_passed, 1);
    }

    #[tokio::test]
    async fn test_coding_run_rejects_empty_code() {
        let harness = Harness::new(without_key());
        let (status, body) = harness
            .post_json(
                "/api/v1/coding/run",
                json!({"code": "   ", "language": "python"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_interview_round_trip() {
        let feedback = r#"{"score": 78, "strengths": ["Clarity"], "weaknesses": ["Depth"], "summary": "Good."}"#;
        let harness = Harness::new(scripted(&["What drew you to this role?", feedback]));
        let user_id = Uuid::new_v4();
        let session_id = harness.start_interview(user_id).await;

        let session = harness.store.session(session_id).await.unwrap().unwrap();
        assert_eq!(session.resume_text, "Five years building payment APIs.");

        let (status, body) = harness
            .post_json(
                &format!("/api/v1/interview/{session_id}/chat"),
                json!({"message": "Hi, I'm a backend engineer."}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "What drew you to this role?");
        assert_eq!(body["stage"], "Introduction & Ice-breaking");

        let transcript = harness.store.transcript(session_id).await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, TurnRole::Assistant);

        let (status, body) = harness
            .post_json(&format!("/api/v1/interview/{session_id}/end"), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Interview ended successfully.");
        assert_eq!(body["feedback"]["score"], 78);

        let activity = harness.store.activity(user_id).await.unwrap();
        assert_eq!(activity.latest_interview_score, Some(78));
    }

    #[tokio::test]
    async fn test_offline_reply_is_not_stored() {
        let harness = Harness::new(without_key());
        let session_id = harness.start_interview(Uuid::new_v4()).await;

        let (status, body) = harness
            .post_json(
                &format!("/api/v1/interview/{session_id}/chat"),
                json!({"message": "Hello?"}),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["response"],
            "Error: AI Interviewer is offline (API Key missing)."
        );
        let transcript = harness.store.transcript(session_id).await.unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, TurnRole::User);
    }

    #[tokio::test]
    async fn test_chat_on_unknown_session_is_404() {
        let harness = Harness::new(without_key());
        let (status, _) = harness
            .post_json("/api/v1/interview/404/chat", json!({"message": "hi"}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_stats_for_new_user() {
        let harness = Harness::new(without_key());
        let (status, body) = harness
            .get(&format!("/api/v1/profile/stats?user_id={}", Uuid::new_v4()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assessments"]["total"], 0);
        assert_eq!(body["skills_analysis"]["Communication"], "Beginner");
    }
}
