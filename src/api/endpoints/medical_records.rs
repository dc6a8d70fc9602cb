//! Treatment record endpoints.
//!
//! The standalone POST exists for records created outside the complete
//! flow (e.g. importing history); it verifies both the patient and the
//! referenced appointment belong to the caller.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::db::repository::appointment::get_appointment;
use crate::db::repository::medical_record::{
    insert_medical_record, list_records_for_doctor, list_records_for_patient, NewMedicalRecord,
};
use crate::db::repository::patient::patient_owned;
use crate::dental;
use crate::models::MedicalRecord;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "patientId")]
    pub patient_id: Option<String>,
}

/// `GET /api/medical-records?patientId=` — one patient's records (newest
/// created first), or every record across the doctor's patients.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MedicalRecord>>, ApiError> {
    let conn = ctx.core.open_db()?;

    match query.patient_id {
        Some(pid) => {
            if !patient_owned(&conn, &doctor.doctor_id, &pid)? {
                return Err(ApiError::NotFound(
                    "Paciente no encontrado o no autorizado".into(),
                ));
            }
            Ok(Json(list_records_for_patient(&conn, &pid)?))
        }
        None => Ok(Json(list_records_for_doctor(&conn, &doctor.doctor_id)?)),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub appointment_id: Option<String>,
    pub patient_id: Option<String>,
    pub teeth_treated: Option<Vec<u8>>,
    pub description: Option<String>,
    pub materials: Option<String>,
    pub observations: Option<String>,
    pub next_appointment: Option<String>,
    pub cost: Option<f64>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// `POST /api/medical-records` — create a record for one of the doctor's
/// appointments.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(body): Json<CreateRequest>,
) -> Result<Json<MedicalRecord>, ApiError> {
    let (Some(appointment_id), Some(patient_id), Some(description), Some(date), Some(time)) = (
        non_empty(body.appointment_id),
        non_empty(body.patient_id),
        non_empty(body.description),
        non_empty(body.date),
        non_empty(body.time),
    ) else {
        return Err(ApiError::BadRequest("Faltan campos obligatorios".into()));
    };

    let teeth = body.teeth_treated.unwrap_or_default();
    dental::validate_teeth(&teeth)
        .map_err(|bad| ApiError::BadRequest(format!("Pieza dental inválida: {bad}")))?;

    let cost = body.cost.unwrap_or(0.0);
    if cost.is_nan() || cost < 0.0 {
        return Err(ApiError::BadRequest("El costo no puede ser negativo".into()));
    }

    let conn = ctx.core.open_db()?;

    if !patient_owned(&conn, &doctor.doctor_id, &patient_id)? {
        return Err(ApiError::NotFound(
            "Paciente no encontrado o no autorizado".into(),
        ));
    }
    let appointment = get_appointment(&conn, &doctor.doctor_id, &appointment_id)
        .map_err(|e| match e {
            crate::db::DatabaseError::NotFound { .. } => {
                ApiError::NotFound("Appointment not found".into())
            }
            other => other.into(),
        })?;
    if appointment.patient_id != patient_id {
        return Err(ApiError::BadRequest(
            "La cita no corresponde al paciente".into(),
        ));
    }

    let created = insert_medical_record(
        &conn,
        &NewMedicalRecord {
            appointment_id,
            patient_id,
            teeth_treated: teeth,
            description,
            materials: body.materials.unwrap_or_default(),
            observations: body.observations.unwrap_or_default(),
            next_appointment: body.next_appointment.unwrap_or_default(),
            cost,
            date,
            time,
        },
    )?;

    tracing::debug!(record = %created.id, "Medical record created");
    Ok(Json(created))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
