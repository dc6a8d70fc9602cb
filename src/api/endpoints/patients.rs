//! Patient CRUD endpoints. Every path is scoped to the authenticated
//! doctor; a patient owned by another doctor reads as 404.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::db::repository::patient::{
    delete_patient, get_patient, insert_patient, list_patients, update_patient, PatientFields,
};
use crate::models::{Patient, PatientWithStats};

/// Create/update payload. A client-supplied `doctorId` is ignored —
/// ownership always comes from the session.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<Vec<String>>,
}

impl PatientPayload {
    fn into_fields(self) -> Result<PatientFields, ApiError> {
        let (Some(name), Some(phone), Some(birth_date), Some(address)) = (
            non_empty(self.name),
            non_empty(self.phone),
            non_empty(self.birth_date),
            non_empty(self.address),
        ) else {
            return Err(ApiError::BadRequest("Faltan campos obligatorios".into()));
        };

        if NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d").is_err() {
            return Err(ApiError::BadRequest("Fecha de nacimiento inválida".into()));
        }

        Ok(PatientFields {
            name,
            email: self.email.unwrap_or_default().trim().to_string(),
            phone,
            birth_date,
            address,
            emergency_contact: self.emergency_contact.unwrap_or_default(),
            medical_history: self.medical_history.unwrap_or_default(),
        })
    }
}

/// `GET /api/patients` — the doctor's patients with appointment counts.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<Vec<PatientWithStats>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patients = list_patients(&conn, &doctor.doctor_id)?;
    Ok(Json(patients))
}

/// `POST /api/patients` — create a patient owned by the caller.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(payload): Json<PatientPayload>,
) -> Result<Json<Patient>, ApiError> {
    let fields = payload.into_fields()?;
    let conn = ctx.core.open_db()?;
    let created = insert_patient(&conn, &doctor.doctor_id, &fields)?;
    tracing::debug!(patient = %created.id, "Patient created");
    Ok(Json(created))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.core.open_db()?;
    get_patient(&conn, &doctor.doctor_id, &id)
        .map(Json)
        .map_err(|e| not_found_as(e, "Paciente no encontrado"))
}

#[derive(Serialize)]
pub struct UpdatePatientResponse {
    pub message: String,
    pub patient: Patient,
}

/// `PUT /api/patients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
    Json(payload): Json<PatientPayload>,
) -> Result<Json<UpdatePatientResponse>, ApiError> {
    let fields = payload.into_fields()?;
    let conn = ctx.core.open_db()?;
    let updated = update_patient(&conn, &doctor.doctor_id, &id, &fields)
        .map_err(|e| not_found_as(e, "Paciente no encontrado"))?;
    Ok(Json(UpdatePatientResponse {
        message: "Paciente actualizado correctamente".into(),
        patient: updated,
    }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `DELETE /api/patients/:id` — removes the patient and, by cascade, their
/// appointments and treatment records.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    delete_patient(&conn, &doctor.doctor_id, &id)
        .map_err(|e| not_found_as(e, "Paciente no encontrado"))?;
    tracing::debug!(patient = %id, "Patient deleted");
    Ok(Json(MessageResponse {
        message: "Paciente eliminado correctamente".into(),
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found_as(err: crate::db::DatabaseError, message: &str) -> ApiError {
    match err {
        crate::db::DatabaseError::NotFound { .. } => ApiError::NotFound(message.into()),
        other => other.into(),
    }
}
