use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{FixedOffset, NaiveDate, Utc};

/// Application-level constants
pub const APP_NAME: &str = "Odonta";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default clinic UTC offset in hours: America/Guayaquil (UTC-5, no DST).
const DEFAULT_CLINIC_OFFSET_HOURS: i32 = -5;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "info,odonta=debug".to_string()
}

/// Get the application data directory
/// ~/Odonta/ on all platforms (user-visible, next to the clinic's exports)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Odonta")
}

/// Database path, overridable via ODONTA_DB.
pub fn database_path() -> PathBuf {
    std::env::var("ODONTA_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| app_data_dir().join("odonta.db"))
}

/// Listen address, overridable via ODONTA_ADDR.
pub fn bind_addr() -> SocketAddr {
    std::env::var("ODONTA_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 4600)))
}

/// Clinic timezone as a fixed UTC offset, overridable via ODONTA_UTC_OFFSET
/// (whole hours). Stats compute "today" in this zone, never in the server's
/// local zone.
pub fn clinic_utc_offset() -> FixedOffset {
    let hours = std::env::var("ODONTA_UTC_OFFSET")
        .ok()
        .and_then(|s| s.parse::<i32>().ok())
        .filter(|h| (-12..=14).contains(h))
        .unwrap_or(DEFAULT_CLINIC_OFFSET_HOURS);
    FixedOffset::east_opt(hours * 3600).expect("offset within validated range")
}

/// Current calendar date at the clinic.
pub fn clinic_today() -> NaiveDate {
    Utc::now().with_timezone(&clinic_utc_offset()).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Odonta"));
    }

    #[test]
    fn database_path_under_app_data() {
        if std::env::var("ODONTA_DB").is_ok() {
            return; // Respect the override when set externally
        }
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("odonta.db"));
    }

    #[test]
    fn default_clinic_offset_is_guayaquil() {
        if std::env::var("ODONTA_UTC_OFFSET").is_ok() {
            return;
        }
        let offset = clinic_utc_offset();
        assert_eq!(offset.local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn clinic_today_matches_offset_date() {
        let expected = Utc::now().with_timezone(&clinic_utc_offset()).date_naive();
        assert_eq!(clinic_today(), expected);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
