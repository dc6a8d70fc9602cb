use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A booked visit for a patient. Ordering between appointments uses the
/// (date, time) pair; `time` is zero-padded HH:mm so string order matches
/// chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:mm, zero-padded
    pub time: String,
    /// Treatment-type label, e.g. "Limpieza", "Endodoncia".
    pub reason: String,
    /// Minutes.
    pub duration: u32,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Appointment enriched with the patient's name, as listed by
/// `GET /api/appointments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentWithPatient {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
}
