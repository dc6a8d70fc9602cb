use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Doctor;

use super::{parse_string_list, parse_timestamp, to_json_string_list};

/// Fields for a new doctor account. The password is already hashed by the
/// caller; this layer never sees plaintext credentials.
pub struct NewDoctor<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub specialties: &'a [String],
}

pub fn insert_doctor(conn: &Connection, new: &NewDoctor) -> Result<Doctor, DatabaseError> {
    let specialties = if new.specialties.is_empty() {
        vec!["general".to_string()]
    } else {
        new.specialties.to_vec()
    };

    let doctor = Doctor {
        id: Uuid::new_v4().to_string(),
        name: new.name.trim().to_string(),
        email: new.email.trim().to_lowercase(),
        password_hash: new.password_hash.to_string(),
        specialties,
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO doctors (id, name, email, password_hash, specialties, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doctor.id,
            doctor.name,
            doctor.email,
            doctor.password_hash,
            to_json_string_list(&doctor.specialties),
            doctor.created_at.to_rfc3339(),
        ],
    )?;

    Ok(doctor)
}

pub fn find_doctor_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, password_hash, specialties, created_at
         FROM doctors WHERE email = ?1",
    )?;

    let doctor = stmt
        .query_row(params![email.trim().to_lowercase()], doctor_from_row)
        .optional()?;

    Ok(doctor)
}

pub fn get_doctor(conn: &Connection, id: &str) -> Result<Doctor, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, password_hash, specialties, created_at
         FROM doctors WHERE id = ?1",
    )?;

    stmt.query_row(params![id], doctor_from_row)
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.into(),
        })
}

fn doctor_from_row(row: &rusqlite::Row) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        specialties: parse_string_list(&row.get::<_, String>(4)?),
        created_at: parse_timestamp(&row.get::<_, String>(5)?),
    })
}
