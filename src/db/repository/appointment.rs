use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus, AppointmentWithPatient};

use super::medical_record::{insert_medical_record, NewMedicalRecord};
use super::{parse_timestamp, parse_timestamp_opt};

/// Fields for a new booking. The caller verifies the patient belongs to the
/// requesting doctor before insert.
pub struct NewAppointment {
    pub patient_id: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub duration: u32,
    pub notes: Option<String>,
}

pub fn insert_appointment(
    conn: &Connection,
    new: &NewAppointment,
) -> Result<Appointment, DatabaseError> {
    let appointment = Appointment {
        id: Uuid::new_v4().to_string(),
        patient_id: new.patient_id.clone(),
        date: new.date.clone(),
        time: new.time.clone(),
        reason: new.reason.clone(),
        duration: new.duration,
        notes: new.notes.clone(),
        status: AppointmentStatus::Scheduled,
        created_at: Utc::now(),
        updated_at: None,
    };

    conn.execute(
        "INSERT INTO appointments (id, patient_id, date, time, reason,
                                   duration_minutes, notes, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appointment.id,
            appointment.patient_id,
            appointment.date,
            appointment.time,
            appointment.reason,
            appointment.duration,
            appointment.notes,
            appointment.status,
            appointment.created_at.to_rfc3339(),
        ],
    )?;

    Ok(appointment)
}

/// Lists the doctor's appointments with patient names, optionally narrowed
/// to one patient, most recent (date, time) first.
pub fn list_appointments(
    conn: &Connection,
    doctor_id: &str,
    patient_id: Option<&str>,
) -> Result<Vec<AppointmentWithPatient>, DatabaseError> {
    let base = "SELECT a.id, a.patient_id, a.date, a.time, a.reason, a.duration_minutes,
                       a.notes, a.status, a.created_at, a.updated_at, p.name
                FROM appointments a
                JOIN patients p ON a.patient_id = p.id
                WHERE p.doctor_id = ?1";

    let map_row = |row: &rusqlite::Row| -> rusqlite::Result<AppointmentWithPatient> {
        Ok(AppointmentWithPatient {
            appointment: appointment_from_row(row)?,
            patient_name: row.get(10)?,
        })
    };

    let rows = match patient_id {
        Some(pid) => {
            let mut stmt = conn.prepare(&format!(
                "{base} AND a.patient_id = ?2 ORDER BY a.date DESC, a.time DESC"
            ))?;
            let rows = stmt.query_map(params![doctor_id, pid], map_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        }
        None => {
            let mut stmt =
                conn.prepare(&format!("{base} ORDER BY a.date DESC, a.time DESC"))?;
            let rows = stmt.query_map(params![doctor_id], map_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        }
    };

    rows.map_err(DatabaseError::from)
}

/// Fetches one appointment, scoped through patient ownership. Another
/// doctor's appointment reads as not found.
pub fn get_appointment(
    conn: &Connection,
    doctor_id: &str,
    id: &str,
) -> Result<Appointment, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.patient_id, a.date, a.time, a.reason, a.duration_minutes,
                a.notes, a.status, a.created_at, a.updated_at
         FROM appointments a
         JOIN patients p ON a.patient_id = p.id
         WHERE a.id = ?1 AND p.doctor_id = ?2",
    )?;

    stmt.query_row(params![id, doctor_id], appointment_from_row)
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.into(),
        })
}

/// The patient's most recent appointment by (date, time) descending.
pub fn latest_for_patient(
    conn: &Connection,
    doctor_id: &str,
    patient_id: &str,
) -> Result<Appointment, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.patient_id, a.date, a.time, a.reason, a.duration_minutes,
                a.notes, a.status, a.created_at, a.updated_at
         FROM appointments a
         JOIN patients p ON a.patient_id = p.id
         WHERE a.patient_id = ?1 AND p.doctor_id = ?2
         ORDER BY a.date DESC, a.time DESC
         LIMIT 1",
    )?;

    stmt.query_row(params![patient_id, doctor_id], appointment_from_row)
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: patient_id.into(),
        })
}

/// Applies a status change and stamps `updated_at`. Transition validity is
/// checked by the caller against the current row.
pub fn update_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status, Utc::now().to_rfc3339(), id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.into(),
        });
    }
    Ok(())
}

/// Hard-deletes one of the doctor's appointments, from any status.
pub fn delete_appointment(
    conn: &Connection,
    doctor_id: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM appointments
         WHERE id = ?1
           AND patient_id IN (SELECT id FROM patients WHERE doctor_id = ?2)",
        params![id, doctor_id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.into(),
        });
    }
    Ok(())
}

/// Completes an appointment and creates its treatment record in one
/// transaction: either the status flips AND the record exists, or neither.
///
/// Returns `ConstraintViolation` when the appointment is not in the
/// scheduled state.
pub fn complete_with_record(
    conn: &mut Connection,
    doctor_id: &str,
    appointment_id: &str,
    record: &NewMedicalRecord,
) -> Result<(Appointment, crate::models::MedicalRecord), DatabaseError> {
    let tx = conn.transaction()?;

    let appointment = get_appointment(&tx, doctor_id, appointment_id)?;
    if appointment.status != AppointmentStatus::Scheduled {
        return Err(DatabaseError::ConstraintViolation(format!(
            "appointment is {}, only scheduled appointments can be completed",
            appointment.status.as_str()
        )));
    }

    let now = Utc::now();
    tx.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![AppointmentStatus::Completed, now.to_rfc3339(), appointment_id],
    )?;
    let stored = insert_medical_record(&tx, record)?;

    tx.commit()?;

    Ok((
        Appointment {
            status: AppointmentStatus::Completed,
            updated_at: Some(now),
            ..appointment
        },
        stored,
    ))
}

fn appointment_from_row(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        reason: row.get(4)?,
        duration: row.get(5)?,
        notes: row.get(6)?,
        status: row.get(7)?,
        created_at: parse_timestamp(&row.get::<_, String>(8)?),
        updated_at: parse_timestamp_opt(row.get(9)?),
    })
}
