//! Bearer-token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it to a doctor via
//! the server-side session map, and injects `DoctorContext` into request
//! extensions for downstream handlers. A client can only name itself
//! through a token issued at login — never through a raw doctor id.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};

/// Require a session token issued at login.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer). On success injects `DoctorContext`.
pub async fn require_doctor(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_doctor_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_doctor_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // Missing credentials are a 400 with the legacy body; a present but
    // unknown token is a 401.
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingDoctorId)?
        .to_string();

    let doctor_id = {
        let sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.resolve(&token).ok_or(ApiError::InvalidCredentials)?
    };

    req.extensions_mut().insert(DoctorContext { doctor_id });

    Ok(next.run(req).await)
}
