//! JSON request/response types and the unary handlers.
//!
//! Malformed bodies and query strings are reported exactly like semantic
//! validation failures: status 400 with an `invalid_argument` body.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use life_engine::viewport::{DEFAULT_SIZE, Viewport};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::metrics::MetricsSnapshot;
use crate::session::{CreateSession, SessionInfo, SessionStore};

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub alive_ratio: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl From<CreateSessionRequest> for CreateSession {
    fn from(req: CreateSessionRequest) -> Self {
        CreateSession {
            width: req.width as usize,
            height: req.height as usize,
            alive_ratio: req.alive_ratio,
            seed: req.seed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionView {
    pub session_id: String,
    pub width: usize,
    pub height: usize,
}

impl From<SessionInfo> for SessionView {
    fn from(info: SessionInfo) -> Self {
        SessionView {
            session_id: info.id.to_string(),
            width: info.width,
            height: info.height,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionView>,
}

/// Viewport parameters of a subscribe request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscribeQuery {
    #[serde(default)]
    pub offset_x: u32,
    #[serde(default)]
    pub offset_y: u32,
    #[serde(default = "default_size")]
    pub cols: u32,
    #[serde(default = "default_size")]
    pub rows: u32,
}

fn default_size() -> u32 {
    DEFAULT_SIZE as u32
}

impl SubscribeQuery {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.offset_x as usize,
            self.offset_y as usize,
            self.cols as usize,
            self.rows as usize,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

// ── Errors ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ApiError(pub SessionError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            SessionError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SessionError::invalid(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(SessionError::invalid(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub async fn health() -> &'static str {
    "ok"
}

pub async fn stats(State(store): State<Arc<SessionStore>>) -> Json<MetricsSnapshot> {
    Json(store.metrics().snapshot(store.len() as u64))
}

pub async fn create_session(
    State(store): State<Arc<SessionStore>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(request) = payload?;
    let info = store.create_session(request.into()).inspect_err(|e| {
        tracing::warn!("Rejected session request: {}", e);
    })?;
    Ok(Json(info.into()))
}

pub async fn list_sessions(State(store): State<Arc<SessionStore>>) -> Json<ListSessionsResponse> {
    let sessions = store.list_sessions().into_iter().map(SessionView::from).collect();
    Json(ListSessionsResponse { sessions })
}

pub async fn close_session(
    State(store): State<Arc<SessionStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    store.close_session(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
