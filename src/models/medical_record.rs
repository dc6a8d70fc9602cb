use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A treatment record, created when an appointment completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    pub appointment_id: String,
    pub patient_id: String,
    /// FDI tooth codes, validated against the dental chart model.
    pub teeth_treated: Vec<u8>,
    pub description: String,
    pub materials: String,
    pub observations: String,
    /// Suggested follow-up date (YYYY-MM-DD) or empty.
    pub next_appointment: String,
    pub cost: f64,
    /// Procedure date, YYYY-MM-DD.
    pub date: String,
    /// Procedure time, HH:mm.
    pub time: String,
    pub created_at: DateTime<Utc>,
}
