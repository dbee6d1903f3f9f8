//! HTTP surface - axum router and handlers
//!
//! Thin JSON layer over `PlanOrchestrator`. Failed plan generation is part
//! of the endpoint contract (an `error` field on a 200 response, matching
//! the behavior callers already depend on), while invalid requests and
//! persistence trouble map to conventional HTTP status codes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use phaseforge_core::Error;
use phaseforge_core::orchestrator::{PlanOrchestrator, SubmitOutcome};
use phaseforge_core::plan::{Plan, SessionState};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct IdeaRequest {
    pub idea: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub repo_url: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanResponse {
    Planned { refined_idea: String, plan: Plan },
    Failed { error: String, refined_idea: String },
}

impl From<SubmitOutcome> for PlanResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Planned { refined_idea, plan } => {
                Self::Planned { refined_idea, plan }
            }
            SubmitOutcome::PlanUnavailable { refined_idea } => Self::Failed {
                error: "LLM failed to generate valid plan".to_string(),
                refined_idea,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub phase: u32,
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(orchestrator: Arc<PlanOrchestrator>) -> Router {
    Router::new()
        .route("/api/plan", post(submit_idea))
        .route("/api/plan/feedback", post(apply_feedback))
        .route("/api/clarify", post(clarify))
        .route("/api/verify", post(verify))
        .route("/api/state", get(read_state))
        .layer(CorsLayer::permissive())
        .with_state(orchestrator)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn submit_idea(
    State(orchestrator): State<Arc<PlanOrchestrator>>,
    Json(req): Json<IdeaRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let outcome = orchestrator.submit_idea(&req.idea).await?;
    Ok(Json(outcome.into()))
}

async fn read_state(
    State(orchestrator): State<Arc<PlanOrchestrator>>,
) -> Result<Json<SessionState>, AppError> {
    let state = orchestrator.state().await?;
    Ok(Json(state))
}

async fn clarify(
    State(orchestrator): State<Arc<PlanOrchestrator>>,
    Json(req): Json<IdeaRequest>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let questions = orchestrator.clarify(&req.idea).await?;
    Ok(Json(QuestionsResponse { questions }))
}

async fn apply_feedback(
    State(orchestrator): State<Arc<PlanOrchestrator>>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let outcome = orchestrator.apply_feedback(&req.feedback).await?;
    Ok(Json(outcome.into()))
}

async fn verify(
    State(orchestrator): State<Arc<PlanOrchestrator>>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    let (phase, verified) = orchestrator.verify_current_phase(&req.repo_url).await?;
    Ok(Json(VerifyResponse { phase, verified }))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(
    orchestrator: Arc<PlanOrchestrator>,
    bind: &str,
    port: u16,
) -> anyhow::Result<()> {
    let app = build_router(orchestrator);
    let addr: std::net::SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("phaseforge-server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("phaseforge-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use phaseforge_core::agents::traits::{Planning, Research};
    use phaseforge_core::agents::verifier::VerifierAgent;
    use phaseforge_core::config::GithubConfig;
    use phaseforge_core::plan::Phase;
    use phaseforge_core::state::MemoryStateStore;

    struct StubResearch;

    #[async_trait]
    impl Research for StubResearch {
        async fn research_topic(&self, _topic: &str) -> String {
            "background".to_string()
        }
    }

    struct StubPlanner {
        plan: Option<Plan>,
    }

    #[async_trait]
    impl Planning for StubPlanner {
        async fn paraphrase_idea(&self, idea: &str, _research: &str) -> String {
            format!("refined {}", idea)
        }

        async fn generate_plan(&self, _refined: &str) -> Option<Plan> {
            self.plan.clone()
        }

        async fn clarifying_questions(&self, _idea: &str) -> String {
            "1. ?\n2. ?\n3. ?".to_string()
        }

        async fn update_plan(&self, _: &Plan, _: &str, _: u32) -> Option<Plan> {
            self.plan.clone()
        }
    }

    fn sample_plan() -> Plan {
        Plan {
            total_phases: 3,
            phases: (1..=3)
                .map(|n| Phase {
                    phase: n,
                    tasks: vec![format!("task {}", n)],
                    commit_message: format!("feat: complete phase {}", n),
                })
                .collect(),
        }
    }

    fn test_router(plan: Option<Plan>) -> Router {
        let orchestrator = Arc::new(PlanOrchestrator::new(
            Arc::new(StubResearch),
            Arc::new(StubPlanner { plan }),
            VerifierAgent::new(GithubConfig {
                api_base: "http://127.0.0.1:1".to_string(),
            })
            .unwrap(),
            Arc::new(MemoryStateStore::new()),
        ));
        build_router(orchestrator)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_then_read_state() {
        let router = test_router(Some(sample_plan()));

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/plan",
                serde_json::json!({"idea": "Build a recipe sharing app"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["plan"]["total_phases"], 3);
        assert!(body["refined_idea"].as_str().unwrap().contains("recipe"));
        assert!(body.get("error").is_none());

        let response = router
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["idea"], "Build a recipe sharing app");
        assert_eq!(body["current_phase"], 1);
        assert_eq!(body["plan"]["phases"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_plan_failure_is_error_envelope_not_server_error() {
        let router = test_router(None);

        let response = router
            .oneshot(post_json(
                "/api/plan",
                serde_json::json!({"idea": "An idea"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["error"], "LLM failed to generate valid plan");
    }

    #[tokio::test]
    async fn test_empty_idea_is_bad_request() {
        let router = test_router(Some(sample_plan()));

        let response = router
            .oneshot(post_json("/api/plan", serde_json::json!({"idea": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_state_is_empty_object_before_any_submit() {
        let router = test_router(Some(sample_plan()));

        let response = router
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_clarify_endpoint() {
        let router = test_router(Some(sample_plan()));

        let response = router
            .oneshot(post_json(
                "/api/clarify",
                serde_json::json!({"idea": "Build a recipe sharing app"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["questions"].as_str().unwrap().contains("1."));
    }

    #[tokio::test]
    async fn test_feedback_without_plan_is_bad_request() {
        let router = test_router(Some(sample_plan()));

        let response = router
            .oneshot(post_json(
                "/api/plan/feedback",
                serde_json::json!({"feedback": "add auth"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("no plan on file"));
    }

    #[tokio::test]
    async fn test_verify_with_malformed_url() {
        let router = test_router(Some(sample_plan()));

        // Seed a plan first
        let response = router
            .clone()
            .oneshot(post_json(
                "/api/plan",
                serde_json::json!({"idea": "An idea"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(post_json(
                "/api/verify",
                serde_json::json!({"repo_url": "github.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["verified"], false);
        assert_eq!(body["phase"], 1);
    }
}
