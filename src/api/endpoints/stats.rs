//! Dashboard counters.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::config;
use crate::db::repository::stats::{fetch_clinic_stats, ClinicStats};

/// `GET /api/stats` — per-doctor counters, recomputed on every call.
/// "Today" is the calendar date at the clinic's configured UTC offset.
pub async fn overview(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<ClinicStats>, ApiError> {
    let conn = ctx.core.open_db()?;
    let stats = fetch_clinic_stats(&conn, &doctor.doctor_id, config::clinic_today())?;
    Ok(Json(stats))
}
