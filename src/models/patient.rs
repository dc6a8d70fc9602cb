use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A patient owned by exactly one doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// YYYY-MM-DD
    pub birth_date: String,
    pub address: String,
    pub emergency_contact: String,
    /// Allergy tags and prior-condition notes, newest last.
    pub medical_history: Vec<String>,
    pub doctor_id: String,
    pub created_at: DateTime<Utc>,
}

/// Patient row enriched with its appointment count, as returned by
/// `GET /api/patients`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientWithStats {
    #[serde(flatten)]
    pub patient: Patient,
    pub total_appointments: i64,
}
