use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::MedicalRecord;

use super::{parse_teeth_list, parse_timestamp, to_json_teeth_list};

/// Fields for a new treatment record. Tooth codes are validated at the API
/// boundary against the dental chart model before reaching this layer.
pub struct NewMedicalRecord {
    pub appointment_id: String,
    pub patient_id: String,
    pub teeth_treated: Vec<u8>,
    pub description: String,
    pub materials: String,
    pub observations: String,
    pub next_appointment: String,
    pub cost: f64,
    pub date: String,
    pub time: String,
}

pub fn insert_medical_record(
    conn: &Connection,
    new: &NewMedicalRecord,
) -> Result<MedicalRecord, DatabaseError> {
    let record = MedicalRecord {
        id: Uuid::new_v4().to_string(),
        appointment_id: new.appointment_id.clone(),
        patient_id: new.patient_id.clone(),
        teeth_treated: new.teeth_treated.clone(),
        description: new.description.clone(),
        materials: new.materials.clone(),
        observations: new.observations.clone(),
        next_appointment: new.next_appointment.clone(),
        cost: new.cost,
        date: new.date.clone(),
        time: new.time.clone(),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO medical_records (id, appointment_id, patient_id, teeth_treated,
                                      description, materials, observations,
                                      next_appointment, cost, date, time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            record.id,
            record.appointment_id,
            record.patient_id,
            to_json_teeth_list(&record.teeth_treated),
            record.description,
            record.materials,
            record.observations,
            record.next_appointment,
            record.cost,
            record.date,
            record.time,
            record.created_at.to_rfc3339(),
        ],
    )?;

    Ok(record)
}

/// Lists one patient's records, newest created first. The caller must have
/// verified ownership of the patient.
pub fn list_records_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, patient_id, teeth_treated, description,
                materials, observations, next_appointment, cost, date, time, created_at
         FROM medical_records
         WHERE patient_id = ?1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![patient_id], record_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Lists every record across the doctor's patients, most recent procedure
/// date first.
pub fn list_records_for_doctor(
    conn: &Connection,
    doctor_id: &str,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.appointment_id, r.patient_id, r.teeth_treated, r.description,
                r.materials, r.observations, r.next_appointment, r.cost, r.date, r.time,
                r.created_at
         FROM medical_records r
         JOIN patients p ON r.patient_id = p.id
         WHERE p.doctor_id = ?1
         ORDER BY r.date DESC, r.time DESC",
    )?;

    let rows = stmt.query_map(params![doctor_id], record_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        patient_id: row.get(2)?,
        teeth_treated: parse_teeth_list(&row.get::<_, String>(3)?),
        description: row.get(4)?,
        materials: row.get(5)?,
        observations: row.get(6)?,
        next_appointment: row.get(7)?,
        cost: row.get(8)?,
        date: row.get(9)?,
        time: row.get(10)?,
        created_at: parse_timestamp(&row.get::<_, String>(11)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::appointment::{insert_appointment, NewAppointment};
    use crate::db::repository::patient::test_support::{seed_doctor, seed_patient};
    use crate::db::sqlite::open_memory_database;

    fn seed_appointment(conn: &Connection, patient_id: &str) -> String {
        insert_appointment(
            conn,
            &NewAppointment {
                patient_id: patient_id.to_string(),
                date: "2026-02-01".into(),
                time: "09:00".into(),
                reason: "Endodoncia".into(),
                duration: 60,
                notes: None,
            },
        )
        .unwrap()
        .id
    }

    fn sample_record(appointment_id: &str, patient_id: &str) -> NewMedicalRecord {
        NewMedicalRecord {
            appointment_id: appointment_id.to_string(),
            patient_id: patient_id.to_string(),
            teeth_treated: vec![16, 17],
            description: "Endodoncia pieza 16".into(),
            materials: "Gutapercha".into(),
            observations: String::new(),
            next_appointment: "2026-03-01".into(),
            cost: 180.0,
            date: "2026-02-01".into(),
            time: "09:00".into(),
        }
    }

    #[test]
    fn insert_and_list_for_patient() {
        let conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&conn, "d1@clinic.ec");
        let patient = seed_patient(&conn, &doctor_id, "Ana");
        let apt = seed_appointment(&conn, &patient.id);

        let created = insert_medical_record(&conn, &sample_record(&apt, &patient.id)).unwrap();

        let listed = list_records_for_patient(&conn, &patient.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].teeth_treated, vec![16, 17]);
        assert_eq!(listed[0].cost, 180.0);
    }

    #[test]
    fn doctor_listing_is_scoped() {
        let conn = open_memory_database().unwrap();
        let d1 = seed_doctor(&conn, "d1@clinic.ec");
        let d2 = seed_doctor(&conn, "d2@clinic.ec");
        let p1 = seed_patient(&conn, &d1, "Ana");
        let p2 = seed_patient(&conn, &d2, "Marta");
        let a1 = seed_appointment(&conn, &p1.id);
        let a2 = seed_appointment(&conn, &p2.id);

        insert_medical_record(&conn, &sample_record(&a1, &p1.id)).unwrap();
        insert_medical_record(&conn, &sample_record(&a2, &p2.id)).unwrap();

        let mine = list_records_for_doctor(&conn, &d1).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].patient_id, p1.id);
    }

    #[test]
    fn doctor_listing_orders_by_procedure_date() {
        let conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&conn, "d1@clinic.ec");
        let patient = seed_patient(&conn, &doctor_id, "Ana");
        let apt = seed_appointment(&conn, &patient.id);

        let mut older = sample_record(&apt, &patient.id);
        older.date = "2026-01-10".into();
        let mut newer = sample_record(&apt, &patient.id);
        newer.date = "2026-02-20".into();

        insert_medical_record(&conn, &older).unwrap();
        insert_medical_record(&conn, &newer).unwrap();

        let listed = list_records_for_doctor(&conn, &doctor_id).unwrap();
        assert_eq!(listed[0].date, "2026-02-20");
        assert_eq!(listed[1].date, "2026-01-10");
    }

    #[test]
    fn record_requires_existing_appointment() {
        let conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&conn, "d1@clinic.ec");
        let patient = seed_patient(&conn, &doctor_id, "Ana");

        let result = insert_medical_record(&conn, &sample_record("no-such-apt", &patient.id));
        assert!(result.is_err(), "FK should reject dangling appointment reference");
    }
}
