//! Registration and login.
//!
//! Login issues an opaque bearer token mapped to the doctor server-side;
//! every protected route replays it as `Authorization: Bearer <token>`.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth;
use crate::db::repository::doctor::{find_doctor_by_email, insert_doctor, NewDoctor};
use crate::models::{DoctorProfile, SPECIALTIES};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub specialties: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub doctor: DoctorProfile,
}

/// `POST /api/auth/register` — create a doctor account.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        non_empty(body.name),
        non_empty(body.email),
        non_empty(body.password),
    ) else {
        return Err(ApiError::BadRequest("Faltan campos obligatorios".into()));
    };

    let specialties = body.specialties.unwrap_or_default();
    if let Some(unknown) = specialties
        .iter()
        .find(|s| !SPECIALTIES.iter().any(|(value, _)| *value == s.as_str()))
    {
        return Err(ApiError::BadRequest(format!(
            "Especialidad inválida: {unknown}"
        )));
    }

    let conn = ctx.core.open_db()?;

    if find_doctor_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::BadRequest("El email ya está registrado".into()));
    }

    let password_hash = auth::hash_password(&password);
    let created = insert_doctor(
        &conn,
        &NewDoctor {
            name: &name,
            email: &email,
            password_hash: &password_hash,
            specialties: &specialties,
        },
    )?;

    tracing::info!(doctor = %created.id, "Doctor registered");

    Ok(Json(RegisterResponse {
        message: "Doctor registrado exitosamente".into(),
        doctor: created.into(),
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub doctor: DoctorProfile,
    pub token: String,
}

/// `POST /api/auth/login` — verify credentials and issue a session token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(ApiError::BadRequest("Email y contraseña requeridos".into()));
    };

    let conn = ctx.core.open_db()?;

    // Unknown email and wrong password are indistinguishable to the caller
    let doctor = find_doctor_by_email(&conn, &email)?.ok_or(ApiError::InvalidCredentials)?;
    if !auth::verify_password(&password, &doctor.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.issue(&doctor.id)
    };

    tracing::debug!(doctor = %doctor.id, "Doctor logged in");

    Ok(Json(LoginResponse {
        doctor: doctor.into(),
        token,
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
