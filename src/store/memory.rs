use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::NaiveDate;
use uuid::Uuid;

use super::AttendanceStore;
use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, DailyRecordRow, NewAttendanceRecord};
use crate::model::employee::Employee;

/// Map-backed store for tests, keyed like the unique index on
/// `attendance_data`.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
    employees: Mutex<HashMap<String, Employee>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn add_employee(&self, employee_id: &str, name: &str, specialty: &str) {
        self.employees.lock().unwrap().insert(
            employee_id.to_string(),
            Employee {
                employee_id: employee_id.to_string(),
                name: name.to_string(),
                specialty: Some(specialty.to_string()),
                regular_leave_balance: 21,
                casual_leave_balance: 7,
            },
        );
    }

    pub fn snapshot(&self) -> Vec<AttendanceRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

impl AttendanceStore for MemoryStore {
    async fn upsert_attendance(&self, records: &[NewAttendanceRecord]) -> Result<u64, AppError> {
        if self.fail_writes {
            return Err(AppError::from(sqlx::Error::PoolClosed));
        }

        let mut stored = self.records.lock().unwrap();
        let mut affected = 0;
        for record in records {
            let key = (record.employee_id.clone(), record.date);
            match stored.entry(key) {
                Entry::Occupied(mut slot) => {
                    if slot.get().fingerprints != record.fingerprints {
                        slot.get_mut().fingerprints = record.fingerprints.clone();
                        affected += 2;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(AttendanceRecord {
                        id: Uuid::new_v4().to_string(),
                        employee_id: record.employee_id.clone(),
                        date: record.date,
                        fingerprints: record.fingerprints.clone(),
                    });
                    affected += 1;
                }
            }
        }

        Ok(affected)
    }

    async fn attendance_for_date(&self, date: NaiveDate) -> Result<Vec<DailyRecordRow>, AppError> {
        let employees = self.employees.lock().unwrap();
        let rows = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.date == date)
            .map(|r| {
                let employee = employees.get(&r.employee_id);
                DailyRecordRow {
                    employee_id: r.employee_id.clone(),
                    date: r.date,
                    fingerprints: r.fingerprints.clone(),
                    name: employee.map(|e| e.name.clone()),
                    specialty: employee.and_then(|e| e.specialty.clone()),
                }
            })
            .collect();

        Ok(rows)
    }

    async fn attendance_for_employee(
        &self,
        employee_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let mut rows: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.employee_id == employee_id && r.date >= from && r.date < until)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);

        Ok(rows)
    }

    async fn find_employee(&self, employee_id: &str) -> Result<Option<Employee>, AppError> {
        Ok(self.employees.lock().unwrap().get(employee_id).cloned())
    }
}
