use crate::{
    attendance::{
        ingest::{self, IngestSummary},
        normalizer::AttendanceOutcome,
        report::{self, DailyReportRow, MonthlyReport},
    },
    error::AppError,
    model::attendance::NewAttendanceRecord,
    utils::outcome_cache::OutcomeCache,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyQuery {
    /// Day to report on
    #[param(example = "2026-01-01", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// Month to report on
    #[param(example = "2026-01")]
    pub month: String,
}

#[derive(Deserialize, ToSchema)]
pub struct NormalizeRequest {
    #[schema(example = "14:05 08:10")]
    pub fingerprints: String,
}

/// Upload a fingerprint sheet
///
/// Rows are keyed by column header, either the scanner export headers or
/// `employee_id`, `date`, `fingerprints`. Rows are upserted by employee and
/// date, so uploading the same sheet again replaces the day instead of
/// duplicating it.
#[utoipa::path(
    post,
    path = "/api/attendance/upload",
    request_body(
        content = Vec<NewAttendanceRecord>,
        description = "Sheet rows keyed by column header",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Sheet ingested", body = IngestSummary),
        (status = 400, description = "Body is not a JSON array"),
        (status = 429, description = "Too many uploads"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_upload", skip(pool, rows), fields(rows = rows.len()))]
pub async fn upload(
    pool: web::Data<MySqlPool>,
    rows: web::Json<Vec<Value>>,
) -> Result<HttpResponse, AppError> {
    info!("Attendance upload received");

    let summary = ingest::ingest(pool.get_ref(), &rows).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Daily attendance table
#[utoipa::path(
    get,
    path = "/api/attendance/daily",
    params(DailyQuery),
    responses(
        (status = 200, description = "One row per stored record", body = Vec<DailyReportRow>),
        (status = 400, description = "Invalid date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_daily", skip(pool, cache, query), fields(date = %query.date))]
pub async fn daily_report(
    pool: web::Data<MySqlPool>,
    cache: web::Data<OutcomeCache>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, AppError> {
    let rows = report::daily_report(pool.get_ref(), cache.get_ref(), query.date).await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Monthly attendance for one employee
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee code"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Days and totals for the month", body = MonthlyReport),
        (status = 400, description = "Month is not YYYY-MM", body = Object, example = json!({
            "message": "month `2026-13` is not YYYY-MM"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_monthly",
    skip(pool, cache, path, query),
    fields(employee_id = %path.as_str(), month = %query.month)
)]
pub async fn monthly_report(
    pool: web::Data<MySqlPool>,
    cache: web::Data<OutcomeCache>,
    path: web::Path<String>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();

    let report =
        report::monthly_report(pool.get_ref(), cache.get_ref(), &employee_id, &query.month)
            .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Interpret a punch string without storing it
#[utoipa::path(
    post,
    path = "/api/attendance/normalize",
    request_body = NormalizeRequest,
    responses(
        (status = 200, description = "Derived outcome", body = AttendanceOutcome, example = json!({
            "checkIn": "08:10",
            "checkOut": "14:05",
            "status": "OnTime",
            "workedHours": 8
        }))
    ),
    tag = "Attendance"
)]
pub async fn normalize(
    cache: web::Data<OutcomeCache>,
    payload: web::Json<NormalizeRequest>,
) -> HttpResponse {
    let outcome: AttendanceOutcome = cache.outcome(&payload.fingerprints).await;

    HttpResponse::Ok().json(outcome)
}
