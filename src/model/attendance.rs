use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Column widths of `attendance_data`, in characters.
pub const EMPLOYEE_ID_MAX_CHARS: usize = 64;
pub const FINGERPRINTS_MAX_CHARS: usize = 512;

/// A stored day of punches, one per (employee_id, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    /// Whitespace-separated punches, any order.
    pub fingerprints: String,
}

/// A validated sheet row ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewAttendanceRecord {
    #[schema(example = "1001")]
    pub employee_id: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "08:10 16:00")]
    pub fingerprints: String,
}

/// Attendance row joined with the employee columns the daily table shows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyRecordRow {
    pub employee_id: String,
    pub date: NaiveDate,
    pub fingerprints: String,
    pub name: Option<String>,
    pub specialty: Option<String>,
}
