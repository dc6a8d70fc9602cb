use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Patient, PatientWithStats};

use super::{parse_string_list, parse_timestamp, to_json_string_list};

/// Fields accepted on patient create and update. Ownership is never part of
/// the payload — the caller's doctor id is stamped server-side.
pub struct PatientFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub address: String,
    pub emergency_contact: String,
    pub medical_history: Vec<String>,
}

pub fn insert_patient(
    conn: &Connection,
    doctor_id: &str,
    fields: &PatientFields,
) -> Result<Patient, DatabaseError> {
    let patient = Patient {
        id: Uuid::new_v4().to_string(),
        name: fields.name.clone(),
        email: fields.email.clone(),
        phone: fields.phone.clone(),
        birth_date: fields.birth_date.clone(),
        address: fields.address.clone(),
        emergency_contact: fields.emergency_contact.clone(),
        medical_history: fields.medical_history.clone(),
        doctor_id: doctor_id.to_string(),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO patients (id, name, email, phone, birth_date, address,
                               emergency_contact, medical_history, doctor_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            patient.id,
            patient.name,
            patient.email,
            patient.phone,
            patient.birth_date,
            patient.address,
            patient.emergency_contact,
            to_json_string_list(&patient.medical_history),
            patient.doctor_id,
            patient.created_at.to_rfc3339(),
        ],
    )?;

    Ok(patient)
}

/// Lists the doctor's patients with their appointment counts, newest first.
pub fn list_patients(
    conn: &Connection,
    doctor_id: &str,
) -> Result<Vec<PatientWithStats>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.email, p.phone, p.birth_date, p.address,
                p.emergency_contact, p.medical_history, p.doctor_id, p.created_at,
                (SELECT COUNT(*) FROM appointments a WHERE a.patient_id = p.id)
         FROM patients p
         WHERE p.doctor_id = ?1
         ORDER BY p.created_at DESC",
    )?;

    let rows = stmt.query_map(params![doctor_id], |row| {
        Ok(PatientWithStats {
            patient: patient_from_row(row)?,
            total_appointments: row.get(10)?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Fetches one of the doctor's patients. A patient owned by another doctor
/// reads as not found.
pub fn get_patient(
    conn: &Connection,
    doctor_id: &str,
    id: &str,
) -> Result<Patient, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, birth_date, address,
                emergency_contact, medical_history, doctor_id, created_at
         FROM patients WHERE id = ?1 AND doctor_id = ?2",
    )?;

    stmt.query_row(params![id, doctor_id], patient_from_row)
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.into(),
        })
}

/// Whether the patient exists and belongs to the doctor.
pub fn patient_owned(
    conn: &Connection,
    doctor_id: &str,
    patient_id: &str,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE id = ?1 AND doctor_id = ?2",
        params![patient_id, doctor_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_patient(
    conn: &Connection,
    doctor_id: &str,
    id: &str,
    fields: &PatientFields,
) -> Result<Patient, DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients
         SET name = ?1, email = ?2, phone = ?3, birth_date = ?4, address = ?5,
             emergency_contact = ?6, medical_history = ?7
         WHERE id = ?8 AND doctor_id = ?9",
        params![
            fields.name,
            fields.email,
            fields.phone,
            fields.birth_date,
            fields.address,
            fields.emergency_contact,
            to_json_string_list(&fields.medical_history),
            id,
            doctor_id,
        ],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.into(),
        });
    }

    get_patient(conn, doctor_id, id)
}

/// Deletes one of the doctor's patients. Appointments and medical records
/// referencing the patient are removed by the schema's cascade rules, so
/// the delete never fails because of referencing rows.
pub fn delete_patient(
    conn: &Connection,
    doctor_id: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM patients WHERE id = ?1 AND doctor_id = ?2",
        params![id, doctor_id],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.into(),
        });
    }
    Ok(())
}

fn patient_from_row(row: &rusqlite::Row) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        birth_date: row.get(4)?,
        address: row.get(5)?,
        emergency_contact: row.get(6)?,
        medical_history: parse_string_list(&row.get::<_, String>(7)?),
        doctor_id: row.get(8)?,
        created_at: parse_timestamp(&row.get::<_, String>(9)?),
    })
}
