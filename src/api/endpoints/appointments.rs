//! Appointment lifecycle endpoints.
//!
//! Status moves: scheduled → postponed/cancelled via PATCH, scheduled →
//! completed only through `POST /:id/complete`, which writes the status
//! flip and the treatment record in one transaction. Completed, postponed
//! and cancelled are terminal.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::db::repository::appointment::{
    complete_with_record, delete_appointment, get_appointment, insert_appointment,
    latest_for_patient, list_appointments, update_status, NewAppointment,
};
use crate::db::repository::medical_record::NewMedicalRecord;
use crate::db::repository::patient::patient_owned;
use crate::db::DatabaseError;
use crate::dental;
use crate::models::{Appointment, AppointmentStatus, AppointmentWithPatient, MedicalRecord};

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "patientId")]
    pub patient_id: Option<String>,
}

/// `GET /api/appointments?patientId=` — the doctor's appointments with
/// patient names. A patientId outside the doctor's scope yields an empty
/// list rather than a 404.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AppointmentWithPatient>>, ApiError> {
    let conn = ctx.core.open_db()?;

    if let Some(pid) = &query.patient_id {
        if !patient_owned(&conn, &doctor.doctor_id, pid)? {
            return Ok(Json(Vec::new()));
        }
    }

    let appointments = list_appointments(&conn, &doctor.doctor_id, query.patient_id.as_deref())?;
    Ok(Json(appointments))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub patient_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub duration: Option<u32>,
    pub notes: Option<String>,
}

/// `POST /api/appointments` — book a visit for one of the doctor's
/// patients.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(body): Json<CreateRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let (Some(patient_id), Some(date), Some(time), Some(reason)) = (
        non_empty(body.patient_id),
        non_empty(body.date),
        non_empty(body.time),
        non_empty(body.reason),
    ) else {
        return Err(ApiError::BadRequest("Faltan campos obligatorios".into()));
    };

    validate_date(&date)?;
    validate_time(&time)?;
    let duration = body.duration.filter(|d| *d > 0).ok_or_else(|| {
        ApiError::BadRequest("La duración debe ser un número de minutos".into())
    })?;

    let conn = ctx.core.open_db()?;
    if !patient_owned(&conn, &doctor.doctor_id, &patient_id)? {
        return Err(ApiError::NotFound("Paciente no encontrado".into()));
    }

    let created = insert_appointment(
        &conn,
        &NewAppointment {
            patient_id,
            date,
            time,
            reason,
            duration,
            notes: body.notes,
        },
    )?;

    tracing::debug!(appointment = %created.id, "Appointment booked");
    Ok(Json(created))
}

/// `GET /api/appointments/:id` — `:id` is a PATIENT id; returns that
/// patient's latest appointment by (date, time) descending.
pub async fn latest(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.core.open_db()?;
    latest_for_patient(&conn, &doctor.doctor_id, &patient_id)
        .map(Json)
        .map_err(|e| not_found_as(e, "Appointment not found"))
}

#[derive(Deserialize)]
pub struct PatchRequest {
    pub status: Option<String>,
}

/// `PATCH /api/appointments/:id {status}` — postpone or cancel a scheduled
/// appointment. Completion goes through the transactional complete flow.
pub async fn patch_status(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
    Json(body): Json<PatchRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let raw = body
        .status
        .ok_or_else(|| ApiError::BadRequest("Estado requerido".into()))?;
    let target: AppointmentStatus = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Estado inválido: {raw}")))?;

    if target == AppointmentStatus::Completed {
        return Err(ApiError::BadRequest(
            "La cita se completa registrando su historial médico".into(),
        ));
    }

    let conn = ctx.core.open_db()?;
    let current = get_appointment(&conn, &doctor.doctor_id, &id)
        .map_err(|e| not_found_as(e, "Appointment not found"))?;

    if !current.status.can_transition_to(target) {
        return Err(ApiError::BadRequest(format!(
            "No se puede pasar de {} a {}",
            current.status.as_str(),
            target.as_str()
        )));
    }

    update_status(&conn, &id, target)?;
    let updated = get_appointment(&conn, &doctor.doctor_id, &id)?;
    Ok(Json(updated))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `DELETE /api/appointments/:id` — hard delete, any status.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    delete_appointment(&conn, &doctor.doctor_id, &id)
        .map_err(|e| not_found_as(e, "Appointment not found"))?;
    Ok(Json(MessageResponse {
        message: "Appointment deleted successfully".into(),
    }))
}

/// Treatment record payload for the complete flow. The appointment
/// determines the patient; date and time default to the appointment's.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub teeth_treated: Option<Vec<u8>>,
    pub description: Option<String>,
    pub materials: Option<String>,
    pub observations: Option<String>,
    pub next_appointment: Option<String>,
    pub cost: Option<f64>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub appointment: Appointment,
    pub record: MedicalRecord,
}

/// `POST /api/appointments/:id/complete` — atomically mark the appointment
/// completed and create its treatment record.
pub async fn complete(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, ApiError> {
    let description = non_empty(body.description)
        .ok_or_else(|| ApiError::BadRequest("Descripción requerida".into()))?;

    let teeth = body.teeth_treated.unwrap_or_default();
    dental::validate_teeth(&teeth)
        .map_err(|bad| ApiError::BadRequest(format!("Pieza dental inválida: {bad}")))?;

    let cost = body.cost.unwrap_or(0.0);
    if cost.is_nan() || cost < 0.0 {
        return Err(ApiError::BadRequest("El costo no puede ser negativo".into()));
    }

    let mut conn = ctx.core.open_db()?;

    let appointment = get_appointment(&conn, &doctor.doctor_id, &id)
        .map_err(|e| not_found_as(e, "Appointment not found"))?;

    let record = NewMedicalRecord {
        appointment_id: appointment.id.clone(),
        patient_id: appointment.patient_id.clone(),
        teeth_treated: teeth,
        description,
        materials: body.materials.unwrap_or_default(),
        observations: body.observations.unwrap_or_default(),
        next_appointment: body.next_appointment.unwrap_or_default(),
        cost,
        date: body.date.unwrap_or_else(|| appointment.date.clone()),
        time: body.time.unwrap_or_else(|| appointment.time.clone()),
    };

    let (completed, stored) = complete_with_record(&mut conn, &doctor.doctor_id, &id, &record)
        .map_err(|e| match e {
            DatabaseError::ConstraintViolation(msg) => ApiError::BadRequest(msg),
            other => other.into(),
        })?;

    tracing::info!(appointment = %id, record = %stored.id, "Appointment completed");

    Ok(Json(CompleteResponse {
        appointment: completed,
        record: stored,
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found_as(err: DatabaseError, message: &str) -> ApiError {
    match err {
        DatabaseError::NotFound { .. } => ApiError::NotFound(message.into()),
        other => other.into(),
    }
}

fn validate_date(date: &str) -> Result<(), ApiError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ApiError::BadRequest("Fecha inválida, use YYYY-MM-DD".into()))
}

/// HH:mm, zero-padded so string ordering matches chronological ordering.
fn validate_time(time: &str) -> Result<(), ApiError> {
    let well_formed = time.len() == 5 && NaiveTime::parse_from_str(time, "%H:%M").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Hora inválida, use HH:mm".into()))
    }
}
