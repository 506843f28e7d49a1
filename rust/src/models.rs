//! Core data types for the rota engine.

use chrono::{Days, NaiveDate, NaiveTime};
use pyo3::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Identifier of a generated rota period.
pub type PeriodId = i64;

/// Number of days covered by one rota week.
pub const WEEK_DAYS: u64 = 7;

/// Capability tag deciding which shifts a member may never work.
///
/// Which shifts each tag excludes is configured in `RotaConfig::exemptions`,
/// not hardcoded here.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Standard,
    Admin,
    EveningExempt,
    NightExempt,
}

impl Role {
    /// Stable string form used by storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "standard",
            Role::Admin => "admin",
            Role::EveningExempt => "evening_exempt",
            Role::NightExempt => "night_exempt",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Role::Standard),
            "admin" => Ok(Role::Admin),
            "evening_exempt" => Ok(Role::EveningExempt),
            "night_exempt" => Ok(Role::NightExempt),
            other => Err(format!("Unknown role tag: {}", other)),
        }
    }
}

/// A roster member.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    #[pyo3(get, set)]
    pub id: i64,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub role: Role,
}

#[pymethods]
impl Member {
    #[new]
    #[pyo3(signature = (id, name, role=Role::Standard))]
    fn new(id: i64, name: String, role: Role) -> Self {
        Self { id, name, role }
    }

    fn __repr__(&self) -> String {
        format!(
            "Member(id={}, name={:?}, role={})",
            self.id, self.name, self.role
        )
    }
}

/// A named, capacity-bounded shift.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShiftDefinition {
    #[pyo3(get, set)]
    pub id: i64,
    #[pyo3(get, set)]
    pub name: String,
    /// Display ordering only
    #[pyo3(get, set)]
    pub start_time: NaiveTime,
    #[pyo3(get, set)]
    pub end_time: NaiveTime,
    #[pyo3(get, set)]
    pub min_members: u32,
    #[pyo3(get, set)]
    pub max_members: u32,
    #[pyo3(get, set)]
    pub is_default: bool,
}

#[pymethods]
impl ShiftDefinition {
    #[new]
    #[pyo3(signature = (
        id,
        name,
        start_time,
        end_time,
        min_members=1,
        max_members=10,
        is_default=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: i64,
        name: String,
        start_time: NaiveTime,
        end_time: NaiveTime,
        min_members: u32,
        max_members: u32,
        is_default: bool,
    ) -> Self {
        Self {
            id,
            name,
            start_time,
            end_time,
            min_members,
            max_members,
            is_default,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ShiftDefinition(name={:?}, min={}, max={}, default={})",
            self.name, self.min_members, self.max_members, self.is_default
        )
    }
}

/// A temporary absence, inclusive on both ends.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbsenceInterval {
    #[pyo3(get, set)]
    pub id: i64,
    #[pyo3(get, set)]
    pub member_id: i64,
    #[pyo3(get, set)]
    pub start_date: NaiveDate,
    #[pyo3(get, set)]
    pub end_date: NaiveDate,
}

impl AbsenceInterval {
    /// Closed-interval overlap test against `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[pymethods]
impl AbsenceInterval {
    #[new]
    fn new(id: i64, member_id: i64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id,
            member_id,
            start_date,
            end_date,
        }
    }

    /// Number of calendar days covered.
    fn days_taken(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    fn __repr__(&self) -> String {
        format!(
            "AbsenceInterval(member_id={}, start={}, end={})",
            self.member_id, self.start_date, self.end_date
        )
    }
}

/// One committed multi-week generation run.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotaPeriod {
    #[pyo3(get)]
    pub period_id: PeriodId,
    #[pyo3(get)]
    pub start_date: NaiveDate,
    #[pyo3(get)]
    pub end_date: NaiveDate,
}

impl RotaPeriod {
    /// Build a period spanning `weeks` whole weeks from `start_date`.
    pub fn spanning(period_id: PeriodId, start_date: NaiveDate, weeks: u32) -> Option<Self> {
        let end_date = start_date
            .checked_add_days(Days::new(WEEK_DAYS * weeks as u64))?
            .pred_opt()?;
        Some(Self {
            period_id,
            start_date,
            end_date,
        })
    }

    /// Number of whole weeks in the period.
    pub fn weeks(&self) -> u32 {
        (((self.end_date - self.start_date).num_days() + 1) / WEEK_DAYS as i64) as u32
    }
}

#[pymethods]
impl RotaPeriod {
    fn __repr__(&self) -> String {
        format!(
            "RotaPeriod(period_id={}, start={}, end={})",
            self.period_id, self.start_date, self.end_date
        )
    }
}

/// One member's shift for one week of a period.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklyAssignment {
    #[pyo3(get)]
    pub period_id: PeriodId,
    #[pyo3(get)]
    pub week_start: NaiveDate,
    #[pyo3(get)]
    pub member_id: i64,
    #[pyo3(get)]
    pub shift_id: i64,
}

#[pymethods]
impl WeeklyAssignment {
    fn __repr__(&self) -> String {
        format!(
            "WeeklyAssignment(period_id={}, week={}, member_id={}, shift_id={})",
            self.period_id, self.week_start, self.member_id, self.shift_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_role_round_trips_through_storage_tag() {
        for role in [
            Role::Standard,
            Role::Admin,
            Role::EveningExempt,
            Role::NightExempt,
        ] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("supervisor".parse::<Role>().is_err());
    }

    #[test]
    fn test_absence_overlap_is_closed_interval() {
        let absence = AbsenceInterval {
            id: 1,
            member_id: 1,
            start_date: d(2025, 9, 7),
            end_date: d(2025, 9, 10),
        };

        // Touches the last day of the week
        assert!(absence.overlaps(d(2025, 9, 1), d(2025, 9, 7)));
        // Touches the first day of the week
        assert!(absence.overlaps(d(2025, 9, 10), d(2025, 9, 16)));
        assert!(!absence.overlaps(d(2025, 9, 11), d(2025, 9, 17)));
        assert_eq!(absence.days_taken(), 4);
    }

    #[test]
    fn test_period_spanning_weeks() {
        let period = RotaPeriod::spanning(7, d(2025, 9, 1), 12).unwrap();
        assert_eq!(period.end_date, d(2025, 11, 23));
        assert_eq!(period.weeks(), 12);
    }
}
