//! HTTP API over the job manager and result store.

use crate::analyzers::StaticAnalyzer;
use crate::config::Config;
use crate::demo::EXAMPLE_CONTRACT;
use crate::error::AnalysisError;
use crate::jobs::{JobManager, JobStatus, JobStatusView};
use crate::rules::Rule;
use crate::store::ResultStore;
use crate::types::{AnalysisRequest, AnalysisResult, ContractInput};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ==================== ERRORS ====================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(_) => ApiError::BadRequest(err.to_string()),
            AnalysisError::JobNotFound(_) | AnalysisError::ResultNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            AnalysisError::InvalidPattern { .. } | AnalysisError::SourceTooLarge { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        AnalysisError::Validation(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ==================== RESPONSES ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    success: bool,
    job_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponse {
    success: bool,
    status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<u8>,
    job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Box<AnalysisResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<JobStatusView> for JobStatusResponse {
    fn from(view: JobStatusView) -> Self {
        let status = view.status();
        let progress = view.progress();
        match view {
            JobStatusView::Pending { job_id } | JobStatusView::Analyzing { job_id, .. } => Self {
                success: true,
                status,
                progress,
                job_id,
                result: None,
                error: None,
            },
            JobStatusView::Completed { job_id, result } => Self {
                success: true,
                status,
                progress,
                job_id,
                result: Some(result),
                error: None,
            },
            JobStatusView::Failed { job_id, error } => Self {
                success: false,
                status,
                progress: None,
                job_id,
                result: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultResponse {
    success: bool,
    result: AnalysisResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExampleResponse {
    success: bool,
    contract_code: &'static str,
}

#[derive(Debug, Serialize)]
struct RulesResponse {
    success: bool,
    rules: Vec<Rule>,
}

// ==================== STATE & ROUTER ====================

/// Shared state handed to every handler.
pub struct AppState {
    pub jobs: JobManager,
}

impl AppState {
    pub fn new(jobs: JobManager) -> Self {
        Self { jobs }
    }

    /// State over a fresh store and the given analyzer.
    pub fn with_analyzer(analyzer: StaticAnalyzer) -> Self {
        Self::new(JobManager::new(Arc::new(analyzer), ResultStore::new()))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/analyze", post(submit_analysis))
        .route("/api/analyze/status/:job_id", get(job_status))
        .route("/api/analysis/:id", get(get_analysis))
        .route("/api/examples/contract", get(example_contract))
        .route("/api/rules", get(list_rules))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the API until interrupted.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let analyzer = StaticAnalyzer::with_config(config.analyzer_config())?;
    let rule_count = analyzer.rules().rule_count();
    let state = Arc::new(AppState::with_analyzer(analyzer));

    let reaper = state
        .jobs
        .spawn_reaper(config.reap_interval(), config.job_ttl());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(
        "Listening on http://{} ({} rules loaded)",
        listener.local_addr()?,
        rule_count
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

// ==================== HANDLERS ====================

async fn submit_analysis(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContractInput>, JsonRejection>,
) -> ApiResult<SubmitResponse> {
    let Json(input) = body?;
    let request = AnalysisRequest::try_from(input)?;
    let job_id = state.jobs.submit(request);

    Ok(Json(SubmitResponse {
        success: true,
        job_id,
    }))
}

async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<JobStatusResponse> {
    let view = state.jobs.status(&job_id)?;
    Ok(Json(view.into()))
}

async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ResultResponse> {
    let id: u64 = id.parse().map_err(|_| AnalysisError::ResultNotFound(0))?;
    let result = state
        .jobs
        .store()
        .get(id)
        .ok_or(AnalysisError::ResultNotFound(id))?;

    Ok(Json(ResultResponse {
        success: true,
        result,
    }))
}

async fn example_contract() -> Json<ExampleResponse> {
    Json(ExampleResponse {
        success: true,
        contract_code: EXAMPLE_CONTRACT,
    })
}

async fn list_rules(State(state): State<Arc<AppState>>) -> Json<RulesResponse> {
    let rules = state
        .jobs
        .analyzer()
        .rules()
        .rules()
        .iter()
        .map(|compiled| compiled.rule.clone())
        .collect();

    Json(RulesResponse {
        success: true,
        rules,
    })
}
