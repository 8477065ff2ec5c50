use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::AttendanceStore;
use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, DailyRecordRow, NewAttendanceRecord};
use crate::model::employee::Employee;

/// Rows per INSERT statement, four placeholders each.
const UPSERT_CHUNK: usize = 500;

impl AttendanceStore for MySqlPool {
    async fn upsert_attendance(&self, records: &[NewAttendanceRecord]) -> Result<u64, AppError> {
        let mut tx = self.begin().await?;
        let mut affected = 0;

        for chunk in records.chunks(UPSERT_CHUNK) {
            let mut query = QueryBuilder::<MySql>::new(
                "INSERT INTO attendance_data (id, employee_id, date, fingerprints) ",
            );
            query.push_values(chunk, |mut row, record| {
                row.push_bind(Uuid::new_v4().to_string())
                    .push_bind(record.employee_id.as_str())
                    .push_bind(record.date)
                    .push_bind(record.fingerprints.as_str());
            });
            // id is left untouched on conflict
            query.push(" ON DUPLICATE KEY UPDATE fingerprints = VALUES(fingerprints)");

            let result = query.build().execute(&mut *tx).await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        debug!(records = records.len(), affected, "Attendance batch upserted");

        Ok(affected)
    }

    async fn attendance_for_date(&self, date: NaiveDate) -> Result<Vec<DailyRecordRow>, AppError> {
        let rows = sqlx::query_as::<_, DailyRecordRow>(
            r#"
            SELECT a.employee_id, a.date, a.fingerprints, e.name, e.specialty
            FROM attendance_data a
            LEFT JOIN employees e ON e.employee_id = a.employee_id
            WHERE a.date = ?
            ORDER BY a.employee_id
            "#,
        )
        .bind(date)
        .fetch_all(self)
        .await?;

        Ok(rows)
    }

    async fn attendance_for_employee(
        &self,
        employee_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, date, fingerprints
            FROM attendance_data
            WHERE employee_id = ?
            AND date >= ?
            AND date < ?
            ORDER BY date
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(until)
        .fetch_all(self)
        .await?;

        Ok(rows)
    }

    async fn find_employee(&self, employee_id: &str) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT employee_id, name, specialty, regular_leave_balance, casual_leave_balance
            FROM employees
            WHERE employee_id = ?
            "#,
        )
        .bind(employee_id)
        .fetch_optional(self)
        .await?;

        Ok(employee)
    }
}
