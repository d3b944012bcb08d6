//! HTTP API handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocation::AllocationPolicy;
use crate::error::{EngineError, MarketError, ReconcileError};
use crate::market::MarketDataProvider;
use crate::sweepstake::{
    generate, refresh_sweepstake, Sweepstake, SweepstakeId, SweepstakeRequest, SweepstakeStore,
};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sweepstake registry.
    pub store: Arc<SweepstakeStore>,
    /// Market data source.
    pub provider: Arc<dyn MarketDataProvider>,
    /// Whether the service is ready to accept traffic.
    pub ready: Arc<AtomicBool>,
}

impl AppState {
    /// Create new app state around a provider.
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            store: Arc::new(SweepstakeStore::new()),
            provider,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
    /// Number of sweepstakes currently stored.
    pub sweepstakes: usize,
}

/// Error payload for all non-2xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure description.
    pub error: String,
}

/// Create-sweepstake request body.
#[derive(Debug, Deserialize)]
pub struct CreateSweepstakeBody {
    /// Display name.
    pub name: String,
    /// Exchange market identifier.
    pub market_id: String,
    /// Allocation policy identifier.
    pub method: String,
    /// Participant names.
    pub participants: Vec<String>,
    /// Drop selections with no lay depth.
    #[serde(default)]
    pub ignore_longshots: bool,
}

/// One assignment in a response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentView {
    /// Exchange selection identifier.
    pub selection_id: i64,
    /// Runner name.
    pub name: String,
    /// Current probability.
    pub probability: String,
    /// Number of probability observations recorded.
    pub observations: usize,
}

/// One participant in a response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantView {
    /// Participant name.
    pub name: String,
    /// Current equity.
    pub equity: String,
    /// Assignments, favorite-first.
    pub assignments: Vec<AssignmentView>,
}

/// Full sweepstake response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SweepstakeView {
    /// Sweepstake identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Exchange market identifier.
    pub market_id: String,
    /// Allocation policy used.
    pub method: String,
    /// Whether refresh cycles still apply.
    pub active: bool,
    /// Total assigned selections.
    pub num_selections: usize,
    /// Participants with assignments.
    pub participants: Vec<ParticipantView>,
}

/// Summary row for the list endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct SweepstakeSummary {
    /// Sweepstake identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Exchange market identifier.
    pub market_id: String,
    /// Allocation policy used.
    pub method: String,
    /// Whether refresh cycles still apply.
    pub active: bool,
    /// Number of participants.
    pub num_participants: usize,
}

impl SweepstakeView {
    fn from_sweepstake(s: &Sweepstake) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            market_id: s.market_id.clone(),
            method: s.policy.to_string(),
            active: s.active,
            num_selections: s.num_selections(),
            participants: s
                .participants
                .iter()
                .map(|p| ParticipantView {
                    name: p.name.clone(),
                    equity: p.equity.to_string(),
                    assignments: p
                        .assignments
                        .iter()
                        .map(|a| AssignmentView {
                            selection_id: a.selection_id.0,
                            name: a.name.clone(),
                            probability: a.current_probability().to_string(),
                            observations: a.history().len(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map engine failures onto HTTP statuses: caller mistakes are 4xx,
/// upstream market problems are 502.
fn engine_error_response(error: &EngineError) -> Response {
    let status = match error {
        EngineError::Market(MarketError::MarketNotFound { .. }) => StatusCode::NOT_FOUND,
        EngineError::Market(_) => StatusCode::BAD_GATEWAY,
        EngineError::Probability(_) => StatusCode::BAD_GATEWAY,
        EngineError::Allocation(_) => StatusCode::BAD_REQUEST,
        EngineError::Reconcile(ReconcileError::Inactive { .. }) => StatusCode::CONFLICT,
        EngineError::Reconcile(ReconcileError::SweepstakeNotFound { .. }) => StatusCode::NOT_FOUND,
        EngineError::Reconcile(ReconcileError::MarketNotFound { .. }) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error.to_string())
}

fn parse_id(raw: &str) -> Result<SweepstakeId, Response> {
    raw.parse()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, format!("invalid sweepstake id: {raw:?}")))
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let response = ReadyResponse {
        ready: state.is_ready(),
        sweepstakes: state.store.len(),
    };

    if response.ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Create a sweepstake from a live market.
pub async fn create_sweepstake(
    State(state): State<AppState>,
    Json(body): Json<CreateSweepstakeBody>,
) -> Response {
    let policy = match AllocationPolicy::parse(&body.method) {
        Ok(policy) => policy,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let request = SweepstakeRequest {
        name: body.name,
        market_id: body.market_id,
        policy,
        participants: body.participants,
        ignore_longshots: body.ignore_longshots,
    };

    let mut rng = StdRng::from_entropy();
    let sweepstake = match generate(state.provider.as_ref(), &request, &mut rng).await {
        Ok(sweepstake) => sweepstake,
        Err(e) => return engine_error_response(&e),
    };

    let id = state.store.insert(sweepstake);
    info!(sweepstake_id = %id, "sweepstake created");

    // Re-read so the response carries the assigned id.
    match state.store.get(id) {
        Some(stored) => (
            StatusCode::CREATED,
            Json(SweepstakeView::from_sweepstake(&stored)),
        )
            .into_response(),
        None => error_response(StatusCode::INTERNAL_SERVER_ERROR, "sweepstake lost on insert"),
    }
}

/// List all sweepstakes.
pub async fn list_sweepstakes(State(state): State<AppState>) -> impl IntoResponse {
    let summaries: Vec<SweepstakeSummary> = state
        .store
        .list()
        .into_iter()
        .map(|s| SweepstakeSummary {
            id: s.id.to_string(),
            name: s.name.clone(),
            market_id: s.market_id.clone(),
            method: s.policy.to_string(),
            active: s.active,
            num_participants: s.participants.len(),
        })
        .collect();

    Json(summaries)
}

/// Fetch one sweepstake.
pub async fn get_sweepstake(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.store.get(id) {
        Some(s) => Json(SweepstakeView::from_sweepstake(&s)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("sweepstake {id} not found")),
    }
}

/// Refresh one sweepstake from fresh market data.
pub async fn refresh_sweepstake_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match refresh_sweepstake(state.provider.as_ref(), state.store.as_ref(), id).await {
        Ok(outcome) => {
            info!(
                sweepstake_id = %id,
                updated = outcome.updated,
                vanished = outcome.vanished,
                "sweepstake refreshed via api"
            );
            match state.store.get(id) {
                Some(s) => Json(SweepstakeView::from_sweepstake(&s)).into_response(),
                None => error_response(StatusCode::NOT_FOUND, format!("sweepstake {id} not found")),
            }
        }
        Err(e) => engine_error_response(&e),
    }
}

/// Close a sweepstake; refresh cycles stop applying to it.
pub async fn close_sweepstake(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let closed = state.store.with_mut(id, |s| {
        if !s.active {
            return false;
        }
        s.active = false;
        s.updated_at = time::OffsetDateTime::now_utc();
        true
    });

    match closed {
        Some(true) => {
            info!(sweepstake_id = %id, "sweepstake closed");
            match state.store.get(id) {
                Some(s) => Json(SweepstakeView::from_sweepstake(&s)).into_response(),
                None => error_response(StatusCode::NOT_FOUND, format!("sweepstake {id} not found")),
            }
        }
        Some(false) => error_response(
            StatusCode::CONFLICT,
            format!("sweepstake {id} is already closed"),
        ),
        None => error_response(StatusCode::NOT_FOUND, format!("sweepstake {id} not found")),
    }
}
