//! Persistence for the roster, shift catalog, absences and committed rotas.
//!
//! Records reference each other by id only. `commit_period` is the single
//! write path for generated rotas and must be all-or-nothing.

mod memory;
mod sqlite;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::models::{
    AbsenceInterval, Member, PeriodId, RotaPeriod, ShiftDefinition, WeeklyAssignment,
};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage backend consumed by the period orchestrator and reports.
pub trait RotaStore {
    /// Full roster.
    fn members(&self) -> Result<Vec<Member>, StoreError>;

    /// Full shift catalog.
    fn shifts(&self) -> Result<Vec<ShiftDefinition>, StoreError>;

    /// Absences overlapping `[start, end]` (inclusive).
    fn absences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AbsenceInterval>, StoreError>;

    fn period_exists(&self, period_id: PeriodId) -> Result<bool, StoreError>;

    fn period(&self, period_id: PeriodId) -> Result<Option<RotaPeriod>, StoreError>;

    /// All committed periods, newest start date first.
    fn periods(&self) -> Result<Vec<RotaPeriod>, StoreError>;

    /// Assignments of one period ordered by week, then member id.
    fn assignments(&self, period_id: PeriodId) -> Result<Vec<WeeklyAssignment>, StoreError>;

    /// Persist a period and all of its assignments atomically.
    ///
    /// On error nothing from the write set is visible.
    fn commit_period(
        &mut self,
        period: &RotaPeriod,
        assignments: &[WeeklyAssignment],
    ) -> Result<(), StoreError>;

    /// Delete a period and its assignments. Returns false if it did not exist.
    fn delete_period(&mut self, period_id: PeriodId) -> Result<bool, StoreError>;
}

/// Reject an absence whose end precedes its start.
pub(crate) fn check_absence(absence: &AbsenceInterval) -> Result<(), StoreError> {
    if absence.end_date < absence.start_date {
        return Err(StoreError::InvalidRecord(format!(
            "Absence {} ends ({}) before it starts ({})",
            absence.id, absence.end_date, absence.start_date
        )));
    }
    Ok(())
}

/// Reject a write set with foreign rows or a member placed twice in one week.
pub(crate) fn check_write_set(
    period: &RotaPeriod,
    assignments: &[WeeklyAssignment],
) -> Result<(), StoreError> {
    let mut seen = rustc_hash::FxHashSet::default();
    for a in assignments {
        if a.period_id != period.period_id {
            return Err(StoreError::InvalidRecord(format!(
                "Assignment for period {} in write set of period {}",
                a.period_id, period.period_id
            )));
        }
        if a.week_start < period.start_date || a.week_start > period.end_date {
            return Err(StoreError::InvalidRecord(format!(
                "Week {} lies outside period {} ({} - {})",
                a.week_start, period.period_id, period.start_date, period.end_date
            )));
        }
        if !seen.insert((a.week_start, a.member_id)) {
            return Err(StoreError::DuplicateAssignment {
                period_id: a.period_id,
                week_start: a.week_start,
                member_id: a.member_id,
            });
        }
    }
    Ok(())
}
