//! JSON HTTP service for ranking résumés.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/rank` | Rank résumés, return the table as JSON |
//! | `POST` | `/rank/export?format=xlsx` | Rank résumés, return a downloadable file |
//!
//! # Request body
//!
//! ```json
//! {
//!   "job_description": "Looking for 3 years experience in python and sql",
//!   "resumes": [
//!     { "file_name": "alice.pdf", "content_base64": "JVBERi0x..." },
//!     { "file_name": "bob.txt", "text": "4 years of python" }
//!   ],
//!   "weights": { "similarity": 20, "skill": 50, "experience": 30 },
//!   "fail_fast": false
//! }
//! ```
//!
//! `weights` and `fail_fast` default to the server configuration.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Please upload at least one resume." } }
//! ```
//!
//! Error codes: `bad_request` (400), `extraction_failed` (422), `internal` (500).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::export::{self, ExportFormat};
use crate::progress::NoProgress;
use crate::rank::{self, RankError, RankOptions, RankRequest, ResumeInput};
use crate::scoring::WeightConfig;
use crate::table::RankingTable;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Builds the router. Exposed so tests and embedding binaries can serve it
/// on their own listener.
pub fn router(config: &Config) -> Router {
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/rank", post(handle_rank))
        .route("/rank/export", post(handle_export))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP service on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "ranking server listening");
    println!("Ranking server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

impl From<RankError> for AppError {
    fn from(err: RankError) -> Self {
        match err {
            RankError::Validation(e) => bad_request(e.to_string()),
            e @ RankError::Extraction { .. } => AppError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "extraction_failed",
                message: e.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(format!("invalid query: {}", rejection.body_text()))
    }
}

// ============ Request types ============

#[derive(Debug, Deserialize)]
struct ResumePayload {
    file_name: String,
    #[serde(default)]
    content_base64: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ResumePayload {
    fn into_input(self) -> Result<ResumeInput, AppError> {
        let bytes = match (self.content_base64, self.text) {
            (Some(encoded), _) => base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| bad_request(format!("{}: invalid base64: {}", self.file_name, e)))?,
            (None, Some(text)) => text.into_bytes(),
            (None, None) => {
                return Err(bad_request(format!(
                    "{}: one of content_base64 or text is required",
                    self.file_name
                )))
            }
        };
        Ok(ResumeInput {
            file_name: self.file_name,
            bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RankPayload {
    job_description: String,
    #[serde(default)]
    resumes: Vec<ResumePayload>,
    #[serde(default)]
    weights: Option<WeightConfig>,
    #[serde(default)]
    fail_fast: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    #[serde(default = "default_export_format")]
    format: ExportFormat,
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Xlsx
}

/// Decodes the payload and runs the batch on a blocking worker.
async fn rank_payload(config: Arc<Config>, payload: RankPayload) -> Result<RankingTable, AppError> {
    let resumes = payload
        .resumes
        .into_iter()
        .map(ResumePayload::into_input)
        .collect::<Result<Vec<_>, _>>()?;

    let request = RankRequest {
        job_description: payload.job_description,
        resumes,
        weights: payload.weights.unwrap_or(config.weights),
        vocabulary: config.skills.vocabulary.clone(),
    };
    let options = RankOptions {
        isolate_failures: !payload
            .fail_fast
            .unwrap_or(!config.ranking.isolate_failures),
        max_resume_bytes: config.ranking.max_resume_bytes,
    };

    let table = tokio::task::spawn_blocking(move || rank::run(&request, &options, &NoProgress))
        .await
        .map_err(|e| internal(format!("ranking task failed: {}", e)))??;
    Ok(table)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /rank ============

async fn handle_rank(
    State(state): State<AppState>,
    payload: Result<Json<RankPayload>, JsonRejection>,
) -> Result<Json<RankingTable>, AppError> {
    let Json(payload) = payload?;
    let table = rank_payload(state.config.clone(), payload).await?;
    Ok(Json(table))
}

// ============ POST /rank/export ============

async fn handle_export(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
    payload: Result<Json<RankPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let Json(payload) = payload?;
    let table = rank_payload(state.config.clone(), payload).await?;
    let bytes = export::to_bytes(&table, query.format).map_err(|e| internal(e.to_string()))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        query.format.default_file_name()
    );
    Ok((
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_prefers_base64_over_text() {
        let payload = ResumePayload {
            file_name: "a.txt".to_string(),
            content_base64: Some(base64::engine::general_purpose::STANDARD.encode("python")),
            text: Some("ignored".to_string()),
        };
        assert_eq!(payload.into_input().ok().map(|r| r.bytes), Some(b"python".to_vec()));
    }

    #[test]
    fn payload_without_content_rejected() {
        let payload = ResumePayload {
            file_name: "a.txt".to_string(),
            content_base64: None,
            text: None,
        };
        let err = payload.into_input().err().map(|e| e.status);
        assert_eq!(err, Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn invalid_base64_rejected() {
        let payload = ResumePayload {
            file_name: "a.pdf".to_string(),
            content_base64: Some("***".to_string()),
            text: None,
        };
        assert!(payload.into_input().is_err());
    }

    #[test]
    fn validation_maps_to_400_and_extraction_to_422() {
        let v: AppError = RankError::Validation(rank::ValidationError::NoResumes).into();
        assert_eq!(v.status, StatusCode::BAD_REQUEST);
        let e: AppError = RankError::Extraction {
            file: "bad.pdf".to_string(),
            source: crate::extract::ExtractError::Pdf("eof".to_string()),
        }
        .into();
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code, "extraction_failed");
    }

    #[tokio::test]
    async fn rank_payload_scores_text_resumes() {
        let payload = RankPayload {
            job_description: "Looking for 3 years experience in python and sql".to_string(),
            resumes: vec![ResumePayload {
                file_name: "bob.txt".to_string(),
                content_base64: None,
                text: Some("I have 4 years experience in python, sql and react".to_string()),
            }],
            weights: None,
            fail_fast: None,
        };
        let table = rank_payload(Arc::new(Config::minimal()), payload)
            .await
            .ok()
            .unwrap();
        assert_eq!(table.len(), 1);
        let score = table.rows[0].outcome.final_score().unwrap();
        assert!((score - 93.39).abs() < 0.011);
    }
}
