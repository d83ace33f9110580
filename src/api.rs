// 🌐 HTTP API - IBAN validation + BIC lookup over JSON
//
// Routes:
//   ANY  /health       → {}
//   POST /iban         → {"iban": "..."} in, IbanResponse out
//   GET  /iban/:iban   → same response, IBAN in the path

use crate::engine::{inspect, IbanReport};
use crate::reference::ReferenceTable;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, options, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, read-only afterwards
    pub table: Arc<ReferenceTable>,
}

impl AppState {
    pub fn new(table: ReferenceTable) -> Self {
        AppState {
            table: Arc::new(table),
        }
    }
}

/// POST /iban body
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbanRequest {
    #[serde(default)]
    pub iban: String,
}

impl IbanRequest {
    /// Decode a request body, matching the `iban` key case-insensitively
    ///
    /// An exact `iban` key wins over other casings (`IBAN`, `Iban`, ...).
    /// `null` bodies and `null` values read as an empty IBAN; anything other
    /// than an object or a string value is an error.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let fields: Option<serde_json::Map<String, Value>> = serde_json::from_slice(body)?;
        let Some(fields) = fields else {
            return Ok(IbanRequest::default());
        };

        let value = fields.get("iban").or_else(|| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("iban"))
                .map(|(_, value)| value)
        });

        match value {
            None | Some(Value::Null) => Ok(IbanRequest::default()),
            Some(value) => Ok(IbanRequest {
                iban: String::deserialize(value)?,
            }),
        }
    }
}

/// IBAN check result as seen by API clients
///
/// Bank fields are empty strings when nothing was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbanResponse {
    pub iban: String,
    pub is_valid: bool,
    pub bic: String,
    pub bezeichnung: String,
    pub ort: String,
    pub blz: String,
}

impl From<IbanReport> for IbanResponse {
    fn from(report: IbanReport) -> Self {
        let bank = report.bank.unwrap_or_default();
        Self {
            iban: report.iban,
            is_valid: report.is_valid,
            bic: bank.bic,
            bezeichnung: bank.name,
            ort: bank.city,
            blz: bank.bank_code,
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// /health - Health check, any method
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({}))
}

/// POST /iban - Validate an IBAN and look up its bank
///
/// The body is decoded by hand so that any malformed payload gets the same
/// plain 400, whatever its content type.
async fn check_iban(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match IbanRequest::from_json(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("Rejecting IBAN request: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    respond(&state, &request.iban, "POST /iban")
}

/// GET /iban/:iban - Same as POST, IBAN taken from the path
///
/// `Path` has already percent-decoded the segment ("DE89%203704..." → "DE89 3704...").
async fn check_iban_path(State(state): State<AppState>, Path(iban): Path<String>) -> Response {
    respond(&state, &iban, "GET /iban/:iban")
}

fn respond(state: &AppState, iban: &str, route: &str) -> Response {
    let report = inspect(iban, &state.table);

    // Outcome only, never the account number
    tracing::info!(
        is_valid = report.is_valid,
        bank_found = report.bank_found(),
        "{}",
        route
    );

    (StatusCode::OK, Json(IbanResponse::from(report))).into_response()
}

/// OPTIONS on any route answers 200, preflight or not
async fn preflight() -> StatusCode {
    StatusCode::OK
}

// ============================================================================
// Router
// ============================================================================

/// Allow every origin, the usual verbs, and JSON + auth headers
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", options(preflight).fallback(health_check))
        .route("/iban", post(check_iban).options(preflight))
        .route("/iban/:iban", get(check_iban_path).options(preflight))
        .with_state(state)
        .layer(cors_layer())
        // CorsLayer only sends these on preflight; clients get them on every response
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
}

// ============================================================================
// Tests
// ============================================================================
