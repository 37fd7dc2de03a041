//! HTTP routes and request/response mapping.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use custodia_common::{Address, EventRecord, LedgerError, Units};
use custodia_ledger::Ledger;

use crate::auth::{ApiKeyDirectory, API_KEY_HEADER};
use crate::metrics::{Metrics, MetricsSnapshot};

/// Shared state handed to every handler.
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub keys: Arc<ApiKeyDirectory>,
    pub metrics: Arc<Metrics>,
}

/// Build the gateway router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/balance/:address", get(balance))
        .route("/api/agent/:address", get(agent_status))
        .route("/api/owner", get(owner))
        .route("/api/events", get(events))
        .route("/api/deposit", post(deposit))
        .route("/api/withdraw", post(withdraw))
        .route("/api/agent/authorize", post(authorize_agent))
        .route("/api/agent/deauthorize", post(deauthorize_agent))
        .route("/api/owner/transfer", post(transfer_ownership))
        .with_state(state)
}

/// A request the gateway refuses before or after calling the core.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The core rejected the operation.
    #[error(transparent)]
    Core(#[from] LedgerError),

    /// No `x-api-key` header on a privileged route.
    #[error("missing x-api-key header")]
    MissingApiKey,

    /// The presented key is not in the directory.
    #[error("unrecognized API key")]
    UnknownApiKey,

    /// An inbound address string failed the shape check.
    #[error("malformed address: {0}")]
    MalformedAddress(String),
}

impl ApiError {
    /// Transport status for this failure.
    ///
    /// Core taxonomy mapping: authorization failures are rejections,
    /// argument and balance problems are client errors, and a sink failure
    /// is a server-side error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(LedgerError::Unauthorized { .. }) => StatusCode::FORBIDDEN,
            ApiError::Core(LedgerError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(LedgerError::InsufficientBalance { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Core(LedgerError::TransferFailed(_)) => StatusCode::BAD_GATEWAY,
            ApiError::MissingApiKey | ApiError::UnknownApiKey => StatusCode::UNAUTHORIZED,
            ApiError::MalformedAddress(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Core(e) => e.error_code(),
            ApiError::MissingApiKey => "MISSING_API_KEY",
            ApiError::UnknownApiKey => "UNKNOWN_API_KEY",
            ApiError::MalformedAddress(_) => "MALFORMED_ADDRESS",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Resolve the transport caller from the `x-api-key` header.
fn caller_from_headers(headers: &HeaderMap, keys: &ApiKeyDirectory) -> Result<Address, ApiError> {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingApiKey)?;

    keys.resolve(key).cloned().ok_or_else(|| {
        warn!("Rejected request with unrecognized API key");
        ApiError::UnknownApiKey
    })
}

/// Shape-check an inbound address string before it reaches the core.
fn parse_address(raw: &str) -> Result<Address, ApiError> {
    let address = Address::new(raw);
    if !address.is_well_formed() {
        return Err(ApiError::MalformedAddress(raw.to_string()));
    }
    Ok(address)
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub address: String,
    pub amount: Units,
}

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: Units,
}

#[derive(Debug, Serialize)]
pub struct AgentStatusResponse {
    pub address: String,
    pub authorized: bool,
}

#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    pub owner: String,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Return records at or after this sequence number.
    #[serde(default)]
    pub from: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn balance(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let address = parse_address(&address)?;
    let balance = state.ledger.balance_of(&address).await;
    Ok(Json(BalanceResponse {
        address: address.to_string(),
        balance,
    }))
}

async fn agent_status(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<AgentStatusResponse>, ApiError> {
    let address = parse_address(&address)?;
    let authorized = state.ledger.is_agent(&address).await;
    Ok(Json(AgentStatusResponse {
        address: address.to_string(),
        authorized,
    }))
}

async fn owner(State(state): State<Arc<AppState>>) -> Json<OwnerResponse> {
    Json(OwnerResponse {
        owner: state.ledger.current_owner().await.to_string(),
    })
}

async fn events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    Json(state.ledger.journal().snapshot_from(query.from))
}

async fn deposit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let address = parse_address(&request.address).map_err(|e| {
        state.metrics.request_rejected();
        e
    })?;

    match state.ledger.deposit(&address, request.amount).await {
        Ok(balance) => {
            state.metrics.deposit_accepted();
            Ok(Json(BalanceResponse {
                address: address.to_string(),
                balance,
            }))
        }
        Err(e) => {
            state.metrics.call_rejected();
            Err(e.into())
        }
    }
}

async fn withdraw(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let caller = caller_from_headers(&headers, &state.keys).map_err(|e| {
        state.metrics.request_rejected();
        e
    })?;
    let address = parse_address(&request.address).map_err(|e| {
        state.metrics.request_rejected();
        e
    })?;

    match state.ledger.withdraw(&caller, &address, request.amount).await {
        Ok(balance) => {
            state.metrics.withdrawal_settled();
            Ok(Json(BalanceResponse {
                address: address.to_string(),
                balance,
            }))
        }
        Err(e) => {
            if matches!(e, LedgerError::TransferFailed(_)) {
                state.metrics.withdrawal_failed();
            } else {
                state.metrics.call_rejected();
            }
            Err(e.into())
        }
    }
}

async fn authorize_agent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AddressRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let caller = caller_from_headers(&headers, &state.keys).map_err(|e| {
        state.metrics.request_rejected();
        e
    })?;
    let agent = parse_address(&request.address)?;

    state
        .ledger
        .authorize_agent(&caller, &agent)
        .await
        .map_err(|e| {
            state.metrics.call_rejected();
            e
        })?;
    Ok(Json(AckResponse { ok: true }))
}

async fn deauthorize_agent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AddressRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let caller = caller_from_headers(&headers, &state.keys).map_err(|e| {
        state.metrics.request_rejected();
        e
    })?;
    // No shape check here: deauthorizing an unknown or malformed agent is
    // harmless and must succeed for the caller holding the owner role.
    let agent = Address::new(request.address);

    state
        .ledger
        .deauthorize_agent(&caller, &agent)
        .await
        .map_err(|e| {
            state.metrics.call_rejected();
            e
        })?;
    Ok(Json(AckResponse { ok: true }))
}

async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AddressRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let caller = caller_from_headers(&headers, &state.keys).map_err(|e| {
        state.metrics.request_rejected();
        e
    })?;
    let new_owner = parse_address(&request.address)?;

    state
        .ledger
        .transfer_ownership(&caller, &new_owner)
        .await
        .map_err(|e| {
            state.metrics.call_rejected();
            e
        })?;
    Ok(Json(AckResponse { ok: true }))
}
