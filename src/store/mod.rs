use chrono::NaiveDate;

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, DailyRecordRow, NewAttendanceRecord};
use crate::model::employee::Employee;

pub mod mysql;

#[cfg(test)]
pub mod memory;

/// Storage operations the attendance engine needs.
#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    /// Inserts or replaces every record keyed by (employee_id, date) as one
    /// unit. Returns the rows reported as affected by the backend.
    async fn upsert_attendance(&self, records: &[NewAttendanceRecord]) -> Result<u64, AppError>;

    async fn attendance_for_date(&self, date: NaiveDate) -> Result<Vec<DailyRecordRow>, AppError>;

    /// Records in `[from, until)`, ordered by date.
    async fn attendance_for_employee(
        &self,
        employee_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError>;

    async fn find_employee(&self, employee_id: &str) -> Result<Option<Employee>, AppError>;
}
