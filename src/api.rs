//! HTTP surface of the directory.
//!
//! Every route is served under `/v1/swift-codes` and under the shorter
//! `/codes` prefix:
//! - `GET    {prefix}/:code`           one code, plus branches for a head office
//! - `GET    {prefix}/country/:iso2`   every code listed under a country
//! - `POST   {prefix}`                 create a code
//! - `DELETE {prefix}/:code`           delete a code (idempotent)

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::codes::normalize_code;
use crate::error::{CreateError, StoreError};
use crate::models::{BankCodeRecord, NewBankCode};
use crate::service;
use crate::store::SwiftStore;

const ROUTE_PREFIXES: &[&str] = &["/v1/swift-codes", "/codes"];

pub type AppState = Arc<SwiftStore>;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CodePayload {
    pub address: String,
    #[serde(rename = "bankName")]
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,
    #[serde(rename = "swiftCode")]
    pub swift_code: String,
    /// Present only when the code is a head office.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub branches: Option<Vec<CodePayload>>,
}

impl From<&BankCodeRecord> for CodePayload {
    fn from(record: &BankCodeRecord) -> Self {
        Self {
            address: record.address.clone(),
            bank_name: record.name.clone(),
            country_iso2: record.country_iso2.clone(),
            country_name: record.country_name.clone(),
            is_headquarter: record.is_headquarters,
            swift_code: record.swift_code.clone(),
            branches: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountryPayload {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    #[serde(rename = "swiftCodes")]
    pub swift_codes: Vec<CodePayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Router
// ============================================================================

pub fn router(store: AppState) -> Router {
    let mut router = Router::new().route("/health", get(health));
    for prefix in ROUTE_PREFIXES {
        router = router
            .route(prefix, post(create_swift_code))
            .route(
                &format!("{prefix}/:code"),
                get(get_swift_code).delete(delete_swift_code),
            )
            .route(
                &format!("{prefix}/country/:iso2"),
                get(get_country_swift_codes),
            );
    }
    router.with_state(store)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health(State(store): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let records = with_store(store, |store| store.count())
        .await?
        .map_err(storage_failure)?;
    Ok(Json(serde_json::json!({ "status": "ok", "records": records })))
}

async fn get_swift_code(
    State(store): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CodePayload>, ApiError> {
    let resolution = with_store(store, move |store| service::resolve(store, &code))
        .await?
        .map_err(|err| match err {
            StoreError::NotFound(_) => error(StatusCode::NOT_FOUND, "not found"),
            other => storage_failure(other),
        })?;

    let mut payload = CodePayload::from(&resolution.record);
    if resolution.record.is_headquarters {
        payload.branches = Some(resolution.branches.iter().map(CodePayload::from).collect());
    }
    Ok(Json(payload))
}

async fn get_country_swift_codes(
    State(store): State<AppState>,
    Path(iso2): Path<String>,
) -> Result<Json<CountryPayload>, ApiError> {
    let country_iso2 = normalize_code(&iso2);
    let records = with_store(store, move |store| service::list_country(store, &iso2))
        .await?
        .map_err(storage_failure)?;
    let Some(first) = records.first() else {
        return Err(error(StatusCode::NOT_FOUND, "not found"));
    };

    Ok(Json(CountryPayload {
        country_iso2,
        country_name: first.country_name.clone(),
        swift_codes: records.iter().map(CodePayload::from).collect(),
    }))
}

// The body is decoded by hand so every malformed payload is a 400.
async fn create_swift_code(
    State(store): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let raw: NewBankCode = serde_json::from_slice(&body)
        .map_err(|err| error(StatusCode::BAD_REQUEST, &format!("bad json: {err}")))?;

    let record = with_store(store, move |store| service::create(store, raw))
        .await?
        .map_err(|err| match err {
            CreateError::Invalid(reason) => error(StatusCode::BAD_REQUEST, &reason.to_string()),
            CreateError::Store(StoreError::DuplicateKey(code)) => error(
                StatusCode::CONFLICT,
                &format!("swift code {code} already exists"),
            ),
            CreateError::Store(other) => storage_failure(other),
        })?;

    log::info!("created swift code {}", record.swift_code);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "swift code created".to_string(),
        }),
    ))
}

async fn delete_swift_code(
    State(store): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let normalized = normalize_code(&code);
    with_store(store, move |store| service::remove(store, &code))
        .await?
        .map_err(storage_failure)?;
    log::info!("deleted swift code {}", normalized);
    Ok(Json(MessageResponse {
        message: "swift code deleted".to_string(),
    }))
}

/// Runs a store call on the blocking pool; SQLite calls hold the connection
/// lock and must stay off the async workers.
async fn with_store<T, F>(store: AppState, job: F) -> Result<T, ApiError>
where
    F: FnOnce(&SwiftStore) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || job(&store))
        .await
        .map_err(|err| {
            log::error!("store task failed: {}", err);
            error(StatusCode::INTERNAL_SERVER_ERROR, "db failure")
        })
}

fn error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn storage_failure(err: StoreError) -> ApiError {
    log::error!("storage failure: {}", err);
    error(StatusCode::INTERNAL_SERVER_ERROR, "db failure")
}
