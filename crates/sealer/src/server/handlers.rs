//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ErrorResponse,
    HealthResponse, PassphraseSource,
};
use common::ServiceError;
use tracing::{debug, warn};

use super::state::AppState;

/// `POST /encrypt` — seal the request's plaintext into a base64 envelope.
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<EncryptRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return rejection_response(rejection),
    };

    let codec = match state.key_store.current().await {
        Ok(c) => c,
        Err(e) => return error_response(&ServiceError::Unavailable(e.to_string())),
    };

    match codec.encrypt(&req.plaintext) {
        Ok(envelope) => {
            debug!(plaintext_len = req.plaintext.len(), "sealed message");
            (StatusCode::OK, Json(EncryptResponse { envelope })).into_response()
        }
        Err(e) => {
            warn!(error = %e, "encryption failed");
            error_response(&ServiceError::from(e))
        }
    }
}

/// `POST /decrypt` — open a base64 envelope.
///
/// Fails closed: a malformed envelope is `400`, a tag mismatch is `422`, and
/// no plaintext is returned in either case.
pub async fn decrypt(
    State(state): State<AppState>,
    body: Result<Json<DecryptRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return rejection_response(rejection),
    };

    let codec = match state.key_store.current().await {
        Ok(c) => c,
        Err(e) => return error_response(&ServiceError::Unavailable(e.to_string())),
    };

    match codec.decrypt(&req.envelope) {
        Ok(plaintext) => (StatusCode::OK, Json(DecryptResponse { plaintext })).into_response(),
        Err(e) => {
            let err = ServiceError::from(e);
            warn!(code = err.code(), "decryption rejected");
            error_response(&err)
        }
    }
}

/// `GET /health` — liveness and readiness check.
///
/// `200 ok` with a configured passphrase, `200 degraded` on the development
/// default, `503 degraded` until the key is derived.
pub async fn health(State(state): State<AppState>) -> Response {
    let key_ready = state.key_store.is_ready().await;

    let (status_code, status_str) = match (key_ready, state.passphrase_source) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        (true, PassphraseSource::DevelopmentDefault) => (StatusCode::OK, "degraded"),
        (true, PassphraseSource::Configured) => (StatusCode::OK, "ok"),
    };

    let body = HealthResponse {
        status: status_str.into(),
        key_ready,
        passphrase_source: state.passphrase_source,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    // Crypto-layer detail stays in the logs.
    let message = match err {
        ServiceError::Internal(_) => "internal codec error".to_owned(),
        other => other.to_string(),
    };
    (status, Json(ErrorResponse::new(err.code(), message))).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let err = ErrorResponse::new("bad_request", rejection.body_text());
    (rejection.status(), Json(err)).into_response()
}
