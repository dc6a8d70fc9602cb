use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

/// Open a SQLite connection without touching the schema. Schema setup runs
/// once per process through `CoreState::initialize`.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    Ok(conn)
}

/// Open an in-memory database with the full schema (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // doctors + patients + appointments + medical_records + schema_version
        let count = count_tables(&conn).unwrap();
        assert_eq!(count, 5, "Expected 5 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn appointment_status_check_constraint() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO doctors (id, name, email, password_hash, created_at)
             VALUES ('doc-1', 'Dra. Vera', 'vera@clinic.ec', 'x', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO patients (id, name, phone, birth_date, address, doctor_id, created_at)
             VALUES ('pat-1', 'Ana', '099', '1990-01-01', 'Calle 1', 'doc-1', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO appointments (id, patient_id, date, time, reason, duration_minutes, status, created_at)
             VALUES ('apt-1', 'pat-1', '2026-02-01', '09:00', 'Limpieza', 30, 'bogus', '2026-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err(), "CHECK constraint should reject unknown status");
    }

    #[test]
    fn patient_requires_existing_doctor() {
        let conn = open_memory_database().unwrap();
        let result = conn.execute(
            "INSERT INTO patients (id, name, phone, birth_date, address, doctor_id, created_at)
             VALUES ('pat-1', 'Ana', '099', '1990-01-01', 'Calle 1', 'no-such-doctor', '2026-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err(), "FK should reject orphan patient");
    }
}
