use chrono::NaiveDate;
use rusqlite::{params, Connection, Params};
use serde::Serialize;

use crate::db::DatabaseError;

/// Dashboard counters for one doctor. Recomputed on every request — a pure
/// read projection with no caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicStats {
    pub total_patients: i64,
    pub total_appointments: i64,
    pub today_appointments: i64,
    pub pending_appointments: i64,
    pub total_medical_records: i64,
}

/// Computes the doctor's counters. `today` is the calendar date at the
/// clinic, not on the server (see `config::clinic_today`).
pub fn fetch_clinic_stats(
    conn: &Connection,
    doctor_id: &str,
    today: NaiveDate,
) -> Result<ClinicStats, DatabaseError> {
    let today = today.to_string();

    let total_patients = count(
        conn,
        "SELECT COUNT(*) FROM patients WHERE doctor_id = ?1",
        params![doctor_id],
    )?;
    let total_appointments = count(
        conn,
        "SELECT COUNT(*) FROM appointments a
         JOIN patients p ON a.patient_id = p.id
         WHERE p.doctor_id = ?1",
        params![doctor_id],
    )?;
    let today_appointments = count(
        conn,
        "SELECT COUNT(*) FROM appointments a
         JOIN patients p ON a.patient_id = p.id
         WHERE p.doctor_id = ?1 AND a.date = ?2",
        params![doctor_id, today],
    )?;
    let pending_appointments = count(
        conn,
        "SELECT COUNT(*) FROM appointments a
         JOIN patients p ON a.patient_id = p.id
         WHERE p.doctor_id = ?1 AND a.status = 'scheduled'",
        params![doctor_id],
    )?;
    let total_medical_records = count(
        conn,
        "SELECT COUNT(*) FROM medical_records r
         JOIN patients p ON r.patient_id = p.id
         WHERE p.doctor_id = ?1",
        params![doctor_id],
    )?;

    Ok(ClinicStats {
        total_patients,
        total_appointments,
        today_appointments,
        pending_appointments,
        total_medical_records,
    })
}

fn count<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(sql, params, |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::appointment::{insert_appointment, update_status, NewAppointment};
    use crate::db::repository::medical_record::{insert_medical_record, NewMedicalRecord};
    use crate::db::repository::patient::test_support::{seed_doctor, seed_patient};
    use crate::db::sqlite::open_memory_database;
    use crate::models::AppointmentStatus;

    fn booking(patient_id: &str, date: &str) -> NewAppointment {
        NewAppointment {
            patient_id: patient_id.to_string(),
            date: date.to_string(),
            time: "09:00".into(),
            reason: "Limpieza".into(),
            duration: 30,
            notes: None,
        }
    }

    #[test]
    fn counts_are_scoped_and_consistent() {
        let conn = open_memory_database().unwrap();
        let d1 = seed_doctor(&conn, "d1@clinic.ec");
        let d2 = seed_doctor(&conn, "d2@clinic.ec");
        let ana = seed_patient(&conn, &d1, "Ana");
        let luis = seed_patient(&conn, &d1, "Luis");
        let marta = seed_patient(&conn, &d2, "Marta");

        let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();

        // d1: one appointment today (scheduled), one past (cancelled)
        insert_appointment(&conn, &booking(&ana.id, "2026-02-10")).unwrap();
        let past = insert_appointment(&conn, &booking(&luis.id, "2026-01-05")).unwrap();
        update_status(&conn, &past.id, AppointmentStatus::Cancelled).unwrap();

        // d2: one appointment today — must not leak into d1's stats
        insert_appointment(&conn, &booking(&marta.id, "2026-02-10")).unwrap();

        // One record for d1, via a completed appointment
        let done = insert_appointment(&conn, &booking(&ana.id, "2026-02-01")).unwrap();
        update_status(&conn, &done.id, AppointmentStatus::Completed).unwrap();
        insert_medical_record(
            &conn,
            &NewMedicalRecord {
                appointment_id: done.id.clone(),
                patient_id: ana.id.clone(),
                teeth_treated: vec![16],
                description: "Profilaxis".into(),
                materials: String::new(),
                observations: String::new(),
                next_appointment: String::new(),
                cost: 25.0,
                date: "2026-02-01".into(),
                time: "09:00".into(),
            },
        )
        .unwrap();

        let stats = fetch_clinic_stats(&conn, &d1, today).unwrap();
        assert_eq!(
            stats,
            ClinicStats {
                total_patients: 2,
                total_appointments: 3,
                today_appointments: 1,
                pending_appointments: 1,
                total_medical_records: 1,
            }
        );

        let other = fetch_clinic_stats(&conn, &d2, today).unwrap();
        assert_eq!(other.total_patients, 1);
        assert_eq!(other.today_appointments, 1);
        assert_eq!(other.total_medical_records, 0);
    }

    #[test]
    fn pending_counts_only_scheduled() {
        let conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&conn, "d1@clinic.ec");
        let patient = seed_patient(&conn, &doctor_id, "Ana");

        insert_appointment(&conn, &booking(&patient.id, "2026-02-10")).unwrap();
        for status in [
            AppointmentStatus::Completed,
            AppointmentStatus::Postponed,
            AppointmentStatus::Cancelled,
        ] {
            let apt = insert_appointment(&conn, &booking(&patient.id, "2026-02-11")).unwrap();
            update_status(&conn, &apt.id, status).unwrap();
        }

        let stats =
            fetch_clinic_stats(&conn, &doctor_id, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
                .unwrap();
        assert_eq!(stats.total_appointments, 4);
        assert_eq!(stats.pending_appointments, 1);
        assert_eq!(stats.today_appointments, 0);
    }

    #[test]
    fn empty_clinic_is_all_zeroes() {
        let conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&conn, "d1@clinic.ec");

        let stats =
            fetch_clinic_stats(&conn, &doctor_id, NaiveDate::from_ymd_opt(2026, 2, 10).unwrap())
                .unwrap();
        assert_eq!(stats.total_patients, 0);
        assert_eq!(stats.total_appointments, 0);
        assert_eq!(stats.today_appointments, 0);
        assert_eq!(stats.pending_appointments, 0);
        assert_eq!(stats.total_medical_records, 0);
    }
}
