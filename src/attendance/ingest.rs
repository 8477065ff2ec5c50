use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::attendance::{
    EMPLOYEE_ID_MAX_CHARS, FINGERPRINTS_MAX_CHARS, NewAttendanceRecord,
};
use crate::store::AttendanceStore;

/// Accepted headers per column, the scanner export's own header first.
pub const EMPLOYEE_ID_COLUMNS: &[&str] = &["رقم الموظف", "employee_id"];
pub const DATE_COLUMNS: &[&str] = &["التاريخ", "date"];
pub const FINGERPRINT_COLUMNS: &[&str] = &["توقيتات البصمات", "fingerprints"];

/// Serial of 9999-12-31, the last date MySQL `DATE` holds.
const MAX_SHEET_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuarantinedRow {
    /// Zero-based position in the uploaded sheet
    #[schema(example = 3)]
    pub row: usize,
    #[schema(example = "missing employee id")]
    pub reason: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct IngestSummary {
    #[schema(example = 120)]
    pub received: usize,
    #[schema(example = 118)]
    pub stored: usize,
    /// Later rows for an (employee, date) already seen in the same upload
    #[schema(example = 1)]
    pub duplicates: usize,
    pub quarantined: Vec<QuarantinedRow>,
}

#[derive(Debug, Default)]
pub struct PreparedBatch {
    pub records: Vec<NewAttendanceRecord>,
    pub duplicates: usize,
    pub quarantined: Vec<QuarantinedRow>,
}

fn cell<'a>(row: &'a Map<String, Value>, headers: &[&str]) -> Option<&'a Value> {
    headers
        .iter()
        .find_map(|h| row.get(*h))
        .filter(|v| !v.is_null())
}

fn parse_employee_id(value: &Value) -> Result<String, String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(whole), _) => whole.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f >= 0.0 => format!("{f:.0}"),
            _ => return Err(format!("employee id `{n}` is not a whole number")),
        },
        other => return Err(format!("employee id has unsupported type: {other}")),
    };

    if id.is_empty() {
        return Err("missing employee id".to_string());
    }
    if id.chars().count() > EMPLOYEE_ID_MAX_CHARS {
        return Err(format!(
            "employee id is longer than {EMPLOYEE_ID_MAX_CHARS} characters"
        ));
    }
    Ok(id)
}

/// Sheet exports store dates either as text or as a serial day count from
/// 1899-12-30.
fn parse_sheet_date(value: &Value) -> Result<NaiveDate, String> {
    match value {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| format!("date `{}` is not YYYY-MM-DD", s.trim())),
        Value::Number(n) => {
            let serial = n
                .as_f64()
                .filter(|f| (1.0..=MAX_SHEET_SERIAL).contains(f))
                .ok_or_else(|| format!("date serial `{n}` is out of range"))?;
            NaiveDate::from_ymd_opt(1899, 12, 30)
                .and_then(|epoch| {
                    Duration::try_days(serial.trunc() as i64)
                        .and_then(|days| epoch.checked_add_signed(days))
                })
                .ok_or_else(|| format!("date serial `{n}` is out of range"))
        }
        other => Err(format!("date has unsupported type: {other}")),
    }
}

/// Punch cells are text; a lone time-formatted cell arrives as a day
/// fraction, read to the nearest second and truncated to the minute.
fn punch_cell(value: Option<&Value>) -> Result<String, String> {
    match value {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => {
            let fraction = n
                .as_f64()
                .filter(|f| (0.0..1.0).contains(f))
                .ok_or_else(|| format!("punch value `{n}` is not a time of day"))?;
            let seconds = ((fraction * 86_400.0).round() as u32).min(86_399);
            let minutes = seconds / 60;
            Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
        }
        Some(other) => Err(format!("punch cell has unsupported type: {other}")),
    }
}

/// Maps one sheet row onto a record, or explains why it cannot be stored.
pub fn map_row(value: &Value) -> Result<NewAttendanceRecord, String> {
    let row = value
        .as_object()
        .ok_or_else(|| "row is not an object".to_string())?;

    let employee_id = cell(row, EMPLOYEE_ID_COLUMNS)
        .ok_or_else(|| "missing employee id".to_string())
        .and_then(parse_employee_id)?;
    let date = cell(row, DATE_COLUMNS)
        .ok_or_else(|| "missing date".to_string())
        .and_then(parse_sheet_date)?;
    let fingerprints = punch_cell(cell(row, FINGERPRINT_COLUMNS))?;
    if fingerprints.chars().count() > FINGERPRINTS_MAX_CHARS {
        return Err(format!(
            "punches are longer than {FINGERPRINTS_MAX_CHARS} characters"
        ));
    }

    Ok(NewAttendanceRecord {
        employee_id,
        date,
        fingerprints,
    })
}

/// Validates every row and collapses repeated (employee_id, date) keys, the
/// last row winning in the position of the first.
pub fn prepare_batch(rows: &[Value]) -> PreparedBatch {
    let mut batch = PreparedBatch::default();
    let mut seen: HashMap<(String, NaiveDate), usize> = HashMap::new();

    for (index, value) in rows.iter().enumerate() {
        let record = match map_row(value) {
            Ok(record) => record,
            Err(reason) => {
                batch.quarantined.push(QuarantinedRow { row: index, reason });
                continue;
            }
        };

        let key = (record.employee_id.clone(), record.date);
        match seen.get(&key) {
            Some(&at) => {
                batch.records[at] = record;
                batch.duplicates += 1;
            }
            None => {
                seen.insert(key, batch.records.len());
                batch.records.push(record);
            }
        }
    }

    batch
}

/// Validates an uploaded sheet and upserts the good rows in one batch.
///
/// A storage failure fails the whole upload; quarantined rows never do.
pub async fn ingest<S: AttendanceStore>(
    store: &S,
    rows: &[Value],
) -> Result<IngestSummary, AppError> {
    let batch = prepare_batch(rows);

    for q in &batch.quarantined {
        warn!(row = q.row, reason = %q.reason, "Sheet row quarantined");
    }

    if !batch.records.is_empty() {
        store.upsert_attendance(&batch.records).await?;
    }

    info!(
        received = rows.len(),
        stored = batch.records.len(),
        duplicates = batch.duplicates,
        quarantined = batch.quarantined.len(),
        "Attendance sheet ingested"
    );

    Ok(IngestSummary {
        received: rows.len(),
        stored: batch.records.len(),
        duplicates: batch.duplicates,
        quarantined: batch.quarantined,
    })
}
