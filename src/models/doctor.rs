use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Specialty values accepted by the registration form, with the labels the
/// UI shows for them.
pub const SPECIALTIES: &[(&str, &str)] = &[
    ("general", "Odontología General"),
    ("orthodontics", "Ortodoncia"),
    ("periodontics", "Periodoncia"),
    ("endodontics", "Endodoncia"),
    ("oral_surgery", "Cirugía Oral y Maxilofacial"),
    ("pediatric", "Odontopediatría"),
    ("prosthodontics", "Prostodoncia"),
    ("oral_pathology", "Patología Oral"),
    ("cosmetic", "Odontología Estética"),
    ("implantology", "Implantología"),
    ("oral_medicine", "Medicina Oral"),
    ("public_health", "Salud Pública Dental"),
];

/// A doctor account as stored. `password_hash` never leaves the server;
/// API responses use [`DoctorProfile`].
#[derive(Debug, Clone)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub specialties: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Doctor as exposed over the API — no credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialties: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Doctor> for DoctorProfile {
    fn from(d: Doctor) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            specialties: d.specialties,
            created_at: d.created_at,
        }
    }
}
