//! Leave filtering: removes absent members from a week's candidate pool.

use chrono::{Days, NaiveDate};
use rustc_hash::FxHashMap;

use crate::models::{AbsenceInterval, Member, WEEK_DAYS};

/// Last day of the week starting at `week_start` (inclusive).
pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start
        .checked_add_days(Days::new(WEEK_DAYS - 1))
        .unwrap_or(NaiveDate::MAX)
}

/// Absence intervals indexed by member.
#[derive(Clone, Debug, Default)]
pub struct LeaveFilter {
    by_member: FxHashMap<i64, Vec<AbsenceInterval>>,
}

impl LeaveFilter {
    pub fn new(absences: impl IntoIterator<Item = AbsenceInterval>) -> Self {
        let mut by_member: FxHashMap<i64, Vec<AbsenceInterval>> = FxHashMap::default();
        for absence in absences {
            by_member.entry(absence.member_id).or_default().push(absence);
        }
        for intervals in by_member.values_mut() {
            intervals.sort_by_key(|a| a.start_date);
        }
        Self { by_member }
    }

    /// First absence of `member_id` overlapping the week, if any.
    pub fn absence_during(
        &self,
        member_id: i64,
        week_start: NaiveDate,
    ) -> Option<&AbsenceInterval> {
        let end = week_end(week_start);
        self.by_member
            .get(&member_id)?
            .iter()
            .find(|a| a.overlaps(week_start, end))
    }

    /// Members with no absence overlapping `[week_start, week_start + 6]`, in input order.
    pub fn eligible_for_week<'m>(
        &self,
        members: &'m [Member],
        week_start: NaiveDate,
    ) -> Vec<&'m Member> {
        members
            .iter()
            .filter(|m| self.absence_during(m.id, week_start).is_none())
            .collect()
    }
}
