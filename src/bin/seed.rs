//! Demo-data seeder.
//!
//! Populates the configured database with one doctor account and a small
//! clinic: four patients, two scheduled visits for today, and one past
//! visit completed with its treatment record. Safe to re-run — seeding is
//! skipped when the demo account already exists.
//!
//! Login: doctor@example.com / 123456

use tracing_subscriber::EnvFilter;

use odonta::auth;
use odonta::config;
use odonta::core_state::CoreState;
use odonta::db::repository::appointment::{complete_with_record, insert_appointment, NewAppointment};
use odonta::db::repository::doctor::{find_doctor_by_email, insert_doctor, NewDoctor};
use odonta::db::repository::medical_record::NewMedicalRecord;
use odonta::db::repository::patient::{insert_patient, PatientFields};

const DEMO_EMAIL: &str = "doctor@example.com";
const DEMO_PASSWORD: &str = "123456";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let core = CoreState::new();
    core.initialize()?;
    let mut conn = core.open_db()?;

    if find_doctor_by_email(&conn, DEMO_EMAIL)?.is_some() {
        tracing::info!("Demo account {DEMO_EMAIL} already exists, nothing to do");
        return Ok(());
    }

    let doctor = insert_doctor(
        &conn,
        &NewDoctor {
            name: "Juan Pérez",
            email: DEMO_EMAIL,
            password_hash: &auth::hash_password(DEMO_PASSWORD),
            specialties: &["general".to_string(), "orthodontics".to_string()],
        },
    )?;

    let patients = [
        ("María García", "maria@email.com", "+1234567890", "1990-05-15",
         "Calle Principal 123, Ciudad", "Juan García - +1234567899",
         vec!["Alergia a la penicilina".to_string()]),
        ("Carlos López", "carlos@email.com", "+1234567891", "1985-08-22",
         "Avenida Central 456, Ciudad", "Ana López - +1234567892",
         Vec::new()),
        ("Ana Martínez", "ana@email.com", "+1234567893", "1992-12-10",
         "Plaza Mayor 789, Ciudad", "Pedro Martínez - +1234567894",
         vec!["Diabetes tipo 2".to_string()]),
        ("Luis Rodríguez", "luis@email.com", "+1234567895", "1988-03-18",
         "Calle Secundaria 321, Ciudad", "Carmen Rodríguez - +1234567896",
         vec!["Hipertensión".to_string()]),
    ];

    let mut patient_ids = Vec::new();
    for (name, email, phone, birth_date, address, emergency, history) in patients {
        let patient = insert_patient(
            &conn,
            &doctor.id,
            &PatientFields {
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                birth_date: birth_date.to_string(),
                address: address.to_string(),
                emergency_contact: emergency.to_string(),
                medical_history: history,
            },
        )?;
        patient_ids.push(patient.id);
    }

    let today = config::clinic_today();

    insert_appointment(
        &conn,
        &NewAppointment {
            patient_id: patient_ids[0].clone(),
            date: today.to_string(),
            time: "09:00".into(),
            reason: "Limpieza dental".into(),
            duration: 30,
            notes: Some("Control rutinario".into()),
        },
    )?;
    insert_appointment(
        &conn,
        &NewAppointment {
            patient_id: patient_ids[1].clone(),
            date: today.to_string(),
            time: "10:30".into(),
            reason: "Endodoncia".into(),
            duration: 90,
            notes: Some("Tratamiento de conducto".into()),
        },
    )?;

    // A past visit, completed with its treatment record
    let past_date = (today - chrono::Duration::days(10)).to_string();
    let past = insert_appointment(
        &conn,
        &NewAppointment {
            patient_id: patient_ids[0].clone(),
            date: past_date.clone(),
            time: "09:00".into(),
            reason: "Limpieza dental".into(),
            duration: 45,
            notes: None,
        },
    )?;
    complete_with_record(
        &mut conn,
        &doctor.id,
        &past.id,
        &NewMedicalRecord {
            appointment_id: past.id.clone(),
            patient_id: patient_ids[0].clone(),
            teeth_treated: vec![11, 12, 13],
            description: "Limpieza dental completa con ultrasonido".into(),
            materials: "Ultrasonido, pasta profiláctica, flúor".into(),
            observations: "Encías ligeramente inflamadas".into(),
            next_appointment: (today + chrono::Duration::days(180)).to_string(),
            cost: 150.0,
            date: past_date,
            time: "09:00".into(),
        },
    )?;

    tracing::info!("Datos de ejemplo creados exitosamente");
    tracing::info!("Email: {DEMO_EMAIL}");
    tracing::info!("Password: {DEMO_PASSWORD}");
    tracing::info!("Pacientes creados: {}", patient_ids.len());
    tracing::info!("Citas creadas: 3 (1 completada con registro médico)");

    Ok(())
}
