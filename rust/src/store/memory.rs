//! In-process store backed by vectors.

use chrono::NaiveDate;

use super::{check_absence, check_write_set, RotaStore};
use crate::error::StoreError;
use crate::models::{
    AbsenceInterval, Member, PeriodId, RotaPeriod, ShiftDefinition, WeeklyAssignment,
};

/// Vector-backed `RotaStore`, mainly for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    members: Vec<Member>,
    shifts: Vec<ShiftDefinition>,
    absences: Vec<AbsenceInterval>,
    periods: Vec<RotaPeriod>,
    assignments: Vec<WeeklyAssignment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), StoreError> {
        if self
            .members
            .iter()
            .any(|m| m.id == member.id || m.name == member.name)
        {
            return Err(StoreError::InvalidRecord(format!(
                "Member {} ({:?}) already exists",
                member.id, member.name
            )));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn add_shift(&mut self, shift: ShiftDefinition) -> Result<(), StoreError> {
        if self
            .shifts
            .iter()
            .any(|s| s.id == shift.id || s.name == shift.name)
        {
            return Err(StoreError::InvalidRecord(format!(
                "Shift {} ({:?}) already exists",
                shift.id, shift.name
            )));
        }
        self.shifts.push(shift);
        Ok(())
    }

    pub fn add_absence(&mut self, absence: AbsenceInterval) -> Result<(), StoreError> {
        check_absence(&absence)?;
        if !self.members.iter().any(|m| m.id == absence.member_id) {
            return Err(StoreError::UnknownMember(absence.member_id));
        }
        self.absences.push(absence);
        Ok(())
    }
}

impl RotaStore for MemoryStore {
    fn members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.members.clone())
    }

    fn shifts(&self) -> Result<Vec<ShiftDefinition>, StoreError> {
        Ok(self.shifts.clone())
    }

    fn absences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AbsenceInterval>, StoreError> {
        Ok(self
            .absences
            .iter()
            .filter(|a| a.overlaps(start, end))
            .cloned()
            .collect())
    }

    fn period_exists(&self, period_id: PeriodId) -> Result<bool, StoreError> {
        Ok(self.periods.iter().any(|p| p.period_id == period_id))
    }

    fn period(&self, period_id: PeriodId) -> Result<Option<RotaPeriod>, StoreError> {
        Ok(self
            .periods
            .iter()
            .find(|p| p.period_id == period_id)
            .cloned())
    }

    fn periods(&self) -> Result<Vec<RotaPeriod>, StoreError> {
        let mut periods = self.periods.clone();
        periods.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.period_id.cmp(&a.period_id))
        });
        Ok(periods)
    }

    fn assignments(&self, period_id: PeriodId) -> Result<Vec<WeeklyAssignment>, StoreError> {
        let mut rows: Vec<WeeklyAssignment> = self
            .assignments
            .iter()
            .filter(|a| a.period_id == period_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.week_start, a.member_id));
        Ok(rows)
    }

    fn commit_period(
        &mut self,
        period: &RotaPeriod,
        assignments: &[WeeklyAssignment],
    ) -> Result<(), StoreError> {
        // Validate the whole write set before touching anything
        if self.period_exists(period.period_id)? {
            return Err(StoreError::DuplicatePeriod(period.period_id));
        }
        check_write_set(period, assignments)?;
        for a in assignments {
            if !self.members.iter().any(|m| m.id == a.member_id) {
                return Err(StoreError::UnknownMember(a.member_id));
            }
            if !self.shifts.iter().any(|s| s.id == a.shift_id) {
                return Err(StoreError::InvalidRecord(format!("Unknown shift: {}", a.shift_id)));
            }
        }

        self.periods.push(period.clone());
        self.assignments.extend_from_slice(assignments);
        Ok(())
    }

    fn delete_period(&mut self, period_id: PeriodId) -> Result<bool, StoreError> {
        let before = self.periods.len();
        self.periods.retain(|p| p.period_id != period_id);
        if self.periods.len() == before {
            return Ok(false);
        }
        self.assignments.retain(|a| a.period_id != period_id);
        Ok(true)
    }
}
