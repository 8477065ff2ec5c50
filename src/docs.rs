use crate::api::attendance::NormalizeRequest;
use crate::attendance::ingest::{IngestSummary, QuarantinedRow};
use crate::attendance::normalizer::{AttendanceOutcome, AttendanceStatus};
use crate::attendance::report::{
    AttendanceReportRow, DailyReportRow, MonthlyReport, MonthlySummary,
};
use crate::model::attendance::NewAttendanceRecord;
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Fingerprint attendance

Turns raw fingerprint-scanner punches into attendance outcomes.

### 🔹 Key Features
- **Sheet upload**
  - Upload a day's scanner export; rows are upserted per employee and date
  - Rows missing an employee id or date are quarantined and reported back
- **Daily table**
  - Check-in, check-out, status and worked hours for every employee on a date
- **Monthly view**
  - One employee's month with status counts and rest-day overtime

### ⏱ Attendance rules
- Shift starts at 08:00 with a 30-minute grace period
- A single punch is reported as a missing check-out
- A full day is credited as 8 hours
- Friday is the weekly rest day; attendance on it counts as overtime

### 📦 Status values
`Absent`, `OnTime`, `Late`, `MissingCheckout`, and `Unreadable` for punch
strings that are not zero-padded `HH:MM` times.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::upload,
        crate::api::attendance::daily_report,
        crate::api::attendance::monthly_report,
        crate::api::attendance::normalize
    ),
    components(
        schemas(
            NewAttendanceRecord,
            IngestSummary,
            QuarantinedRow,
            AttendanceStatus,
            AttendanceOutcome,
            AttendanceReportRow,
            DailyReportRow,
            MonthlySummary,
            MonthlyReport,
            Employee,
            NormalizeRequest
        )
    ),
    tags(
        (name = "Attendance", description = "Fingerprint attendance APIs"),
    )
)]
pub struct ApiDoc;
