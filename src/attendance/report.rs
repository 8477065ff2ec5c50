use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::normalizer::{AttendanceOutcome, AttendanceStatus};
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::store::AttendanceStore;
use crate::utils::outcome_cache::OutcomeCache;

/// Weekly rest day; punches on it are credited as overtime.
pub const REST_DAY: Weekday = Weekday::Fri;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceReportRow {
    #[schema(example = "1001")]
    pub employee_id: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub outcome: AttendanceOutcome,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyReportRow {
    #[schema(example = "1001")]
    pub employee_id: String,
    #[schema(example = "Mona Adel", nullable = true)]
    pub name: Option<String>,
    #[schema(example = "Nursing", nullable = true)]
    pub specialty: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub outcome: AttendanceOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub days_recorded: u32,
    pub on_time: u32,
    pub late: u32,
    pub missing_checkout: u32,
    pub absent: u32,
    pub unreadable: u32,
    /// Full-day credits, rest days included
    pub worked_hours: u32,
    /// Credits earned on the weekly rest day
    pub overtime_hours: u32,
}

impl MonthlySummary {
    pub fn tally(&mut self, date: NaiveDate, outcome: &AttendanceOutcome) {
        self.days_recorded += 1;
        match outcome.status {
            AttendanceStatus::OnTime => self.on_time += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::MissingCheckout => self.missing_checkout += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Unreadable => self.unreadable += 1,
        }

        let credit = u32::from(outcome.worked_hours.unwrap_or(0));
        self.worked_hours += credit;
        if date.weekday() == REST_DAY {
            self.overtime_hours += credit;
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyReport {
    #[schema(example = "1001")]
    pub employee_id: String,
    pub employee: Option<Employee>,
    #[schema(example = "2026-01")]
    pub month: String,
    pub days: Vec<AttendanceReportRow>,
    pub summary: MonthlySummary,
}

/// Parses `YYYY-MM` into the half-open range of its days.
pub fn month_range(month: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let invalid = || AppError::bad_request(format!("month `{month}` is not YYYY-MM"));

    if month.len() != 7 {
        return Err(invalid());
    }
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| invalid())?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(invalid)?;

    Ok((first, next))
}

fn flag_unreadable(employee_id: &str, date: NaiveDate, outcome: &AttendanceOutcome) {
    if outcome.status == AttendanceStatus::Unreadable {
        warn!(
            employee_id,
            %date,
            problem = outcome.problem.as_deref().unwrap_or_default(),
            "Unreadable fingerprint record"
        );
    }
}

/// Every employee's outcome for one day.
pub async fn daily_report<S: AttendanceStore>(
    store: &S,
    cache: &OutcomeCache,
    date: NaiveDate,
) -> Result<Vec<DailyReportRow>, AppError> {
    let records = store.attendance_for_date(date).await?;
    let raws: Vec<&str> = records.iter().map(|r| r.fingerprints.as_str()).collect();
    let outcomes = cache.outcomes(&raws).await;

    debug!(%date, records = records.len(), "Daily report built");

    Ok(records
        .into_iter()
        .zip(outcomes)
        .map(|(record, outcome)| {
            flag_unreadable(&record.employee_id, record.date, &outcome);
            DailyReportRow {
                employee_id: record.employee_id,
                name: record.name,
                specialty: record.specialty,
                date: record.date,
                outcome,
            }
        })
        .collect())
}

/// One employee's days for a `YYYY-MM` month with totals.
pub async fn monthly_report<S: AttendanceStore>(
    store: &S,
    cache: &OutcomeCache,
    employee_id: &str,
    month: &str,
) -> Result<MonthlyReport, AppError> {
    let (from, until) = month_range(month)?;

    let employee = store.find_employee(employee_id).await?;
    let records = store.attendance_for_employee(employee_id, from, until).await?;
    let raws: Vec<&str> = records.iter().map(|r| r.fingerprints.as_str()).collect();
    let outcomes = cache.outcomes(&raws).await;

    let mut summary = MonthlySummary::default();
    let days = records
        .into_iter()
        .zip(outcomes)
        .map(|(record, outcome)| {
            flag_unreadable(&record.employee_id, record.date, &outcome);
            summary.tally(record.date, &outcome);
            AttendanceReportRow {
                employee_id: record.employee_id,
                date: record.date,
                outcome,
            }
        })
        .collect();

    debug!(employee_id, month, days = summary.days_recorded, "Monthly report built");

    Ok(MonthlyReport {
        employee_id: employee_id.to_string(),
        employee,
        month: month.to_string(),
        days,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::ingest::ingest;
    use crate::attendance::normalizer::{AttendancePolicy, normalize};
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cache() -> OutcomeCache {
        OutcomeCache::new(AttendancePolicy::default(), 1_000)
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::default();
        store.add_employee("1", "Mona Adel", "Nursing");
        store.add_employee("2", "Karim Fathy", "Pharmacy");

        let rows = vec![
            // 2026-03-02 is a Monday, 2026-03-06 a Friday
            json!({"employee_id": "1", "date": "2026-03-02", "fingerprints": "16:00 08:10"}),
            json!({"employee_id": "2", "date": "2026-03-02", "fingerprints": "08:45 16:00"}),
            json!({"employee_id": "3", "date": "2026-03-02", "fingerprints": "08:00 ??"}),
            json!({"employee_id": "1", "date": "2026-03-03", "fingerprints": "09:15"}),
            json!({"employee_id": "1", "date": "2026-03-04", "fingerprints": ""}),
            json!({"employee_id": "1", "date": "2026-03-05", "fingerprints": "08:50 12:00 16:00"}),
            json!({"employee_id": "1", "date": "2026-03-06", "fingerprints": "09:00 13:00"}),
            json!({"employee_id": "1", "date": "2026-04-01", "fingerprints": "08:00 16:00"}),
        ];
        ingest(&store, &rows).await.unwrap();
        store
    }

    #[test]
    fn month_range_covers_whole_month() {
        assert_eq!(
            month_range("2026-02").unwrap(),
            (date("2026-02-01"), date("2026-03-01"))
        );
        assert_eq!(
            month_range("2025-12").unwrap(),
            (date("2025-12-01"), date("2026-01-01"))
        );
    }

    #[test]
    fn month_range_rejects_other_formats() {
        for bad in ["2026-13", "2026-1", "2026/03", "March", "2026-03-01"] {
            assert!(matches!(month_range(bad), Err(AppError::BadRequest(_))), "{bad}");
        }
    }

    #[test]
    fn summary_counts_statuses_and_rest_day_credit() {
        let mut summary = MonthlySummary::default();
        summary.tally(date("2026-03-02"), &normalize("08:00 16:00"));
        summary.tally(date("2026-03-03"), &normalize("08:40 16:00"));
        summary.tally(date("2026-03-06"), &normalize("10:00 14:00"));
        summary.tally(date("2026-03-07"), &normalize("08:00"));
        summary.tally(date("2026-03-08"), &normalize(""));

        assert_eq!(
            summary,
            MonthlySummary {
                days_recorded: 5,
                on_time: 1,
                late: 2,
                missing_checkout: 1,
                absent: 1,
                unreadable: 0,
                worked_hours: 24,
                overtime_hours: 8,
            }
        );
    }

    #[actix_web::test]
    async fn daily_report_normalizes_every_record() {
        let store = seeded_store().await;
        let rows = daily_report(&store, &cache(), date("2026-03-02")).await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name.as_deref(), Some("Mona Adel"));
        assert_eq!(rows[0].outcome.status, AttendanceStatus::OnTime);
        assert_eq!(rows[0].outcome.check_in.unwrap().to_string(), "08:10");
        assert_eq!(rows[1].specialty.as_deref(), Some("Pharmacy"));
        assert_eq!(rows[1].outcome.status, AttendanceStatus::Late);
        // unknown employee and bad punches still get a row
        assert_eq!(rows[2].name, None);
        assert_eq!(rows[2].outcome.status, AttendanceStatus::Unreadable);
    }

    #[actix_web::test]
    async fn daily_report_row_has_flat_output_shape() {
        let store = seeded_store().await;
        let rows = daily_report(&store, &cache(), date("2026-03-02")).await.unwrap();
        let json = serde_json::to_value(&rows[0]).unwrap();

        assert_eq!(
            json,
            json!({
                "employee_id": "1",
                "name": "Mona Adel",
                "specialty": "Nursing",
                "date": "2026-03-02",
                "checkIn": "08:10",
                "checkOut": "16:00",
                "status": "OnTime",
                "workedHours": 8
            })
        );
    }

    #[actix_web::test]
    async fn empty_day_gives_empty_report() {
        let store = seeded_store().await;
        let rows = daily_report(&store, &cache(), date("2026-03-20")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[actix_web::test]
    async fn monthly_report_stays_inside_the_month() {
        let store = seeded_store().await;
        let report = monthly_report(&store, &cache(), "1", "2026-03").await.unwrap();

        let dates: Vec<_> = report.days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                date("2026-03-02"),
                date("2026-03-03"),
                date("2026-03-04"),
                date("2026-03-05"),
                date("2026-03-06"),
            ]
        );
        assert_eq!(report.employee.unwrap().name, "Mona Adel");
        assert_eq!(
            report.summary,
            MonthlySummary {
                days_recorded: 5,
                on_time: 1,
                late: 2,
                missing_checkout: 1,
                absent: 1,
                unreadable: 0,
                worked_hours: 24,
                overtime_hours: 8,
            }
        );
    }

    #[actix_web::test]
    async fn monthly_report_for_unknown_employee_is_empty() {
        let store = seeded_store().await;
        let report = monthly_report(&store, &cache(), "99", "2026-03").await.unwrap();

        assert!(report.employee.is_none());
        assert!(report.days.is_empty());
        assert_eq!(report.summary, MonthlySummary::default());
    }

    #[actix_web::test]
    async fn monthly_report_rejects_bad_month() {
        let store = seeded_store().await;
        let err = monthly_report(&store, &cache(), "1", "03-2026").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
