//! Read-only views of a committed rota period.

use chrono::{Days, NaiveDate};
use pyo3::prelude::*;
use rustc_hash::FxHashMap;

use crate::catalog::ShiftCatalog;
use crate::error::{RotaError, StoreError};
use crate::leave::week_end;
use crate::models::{PeriodId, RotaPeriod, WeeklyAssignment, WEEK_DAYS};
use crate::store::RotaStore;

/// One week of a rota table.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotaRow {
    #[pyo3(get)]
    pub week_start: NaiveDate,
    #[pyo3(get)]
    pub week_end: NaiveDate,
    /// Sorted member names per column
    #[pyo3(get)]
    pub cells: Vec<Vec<String>>,
}

#[pymethods]
impl RotaRow {
    fn __repr__(&self) -> String {
        format!("RotaRow({} - {}, {:?})", self.week_start, self.week_end, self.cells)
    }
}

/// Weeks by shifts, shifts in display order.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotaTable {
    #[pyo3(get)]
    pub period: RotaPeriod,
    #[pyo3(get)]
    pub columns: Vec<String>,
    #[pyo3(get)]
    pub rows: Vec<RotaRow>,
}

impl RotaTable {
    /// Members on `shift` in the week starting `week_start`.
    pub fn cell(&self, week_start: NaiveDate, shift: &str) -> Option<&[String]> {
        let col = self.columns.iter().position(|c| c == shift)?;
        let row = self.rows.iter().find(|r| r.week_start == week_start)?;
        row.cells.get(col).map(Vec::as_slice)
    }
}

#[pymethods]
impl RotaTable {
    fn __repr__(&self) -> String {
        format!(
            "RotaTable(period_id={}, columns={:?}, weeks={})",
            self.period.period_id,
            self.columns,
            self.rows.len()
        )
    }
}

/// How often one member worked each shift over a period.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDistribution {
    #[pyo3(get)]
    pub member: String,
    /// (shift name, weeks) in display order
    #[pyo3(get)]
    pub counts: Vec<(String, u32)>,
    #[pyo3(get)]
    pub total_special: u32,
}

#[pymethods]
impl MemberDistribution {
    fn __repr__(&self) -> String {
        format!(
            "MemberDistribution(member='{}', counts={:?}, total_special={})",
            self.member, self.counts, self.total_special
        )
    }
}

/// Period rows resolved against the current roster and catalog.
struct ResolvedPeriod {
    period: RotaPeriod,
    catalog: ShiftCatalog,
    /// (week_start, member name, shift name)
    rows: Vec<(NaiveDate, String, String)>,
}

fn resolve<S: RotaStore + ?Sized>(
    store: &S,
    period_id: PeriodId,
) -> Result<ResolvedPeriod, RotaError> {
    let period = store
        .period(period_id)?
        .ok_or(StoreError::UnknownPeriod(period_id))?;
    let catalog = ShiftCatalog::new(store.shifts()?)?;

    let member_names: FxHashMap<i64, String> =
        store.members()?.into_iter().map(|m| (m.id, m.name)).collect();
    let shift_names: FxHashMap<i64, &str> =
        catalog.iter().map(|s| (s.id, s.name.as_str())).collect();

    let rows = store
        .assignments(period_id)?
        .into_iter()
        .map(|a: WeeklyAssignment| {
            let member = member_names.get(&a.member_id).ok_or_else(|| {
                StoreError::InvalidRecord(format!(
                    "assignment references unknown member {}",
                    a.member_id
                ))
            })?;
            let shift = shift_names.get(&a.shift_id).ok_or_else(|| {
                StoreError::InvalidRecord(format!(
                    "assignment references unknown shift {}",
                    a.shift_id
                ))
            })?;
            Ok((a.week_start, member.clone(), shift.to_string()))
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(ResolvedPeriod {
        period,
        catalog,
        rows,
    })
}

/// Build the tabular view of a committed period.
pub fn rota_table<S: RotaStore + ?Sized>(
    store: &S,
    period_id: PeriodId,
) -> Result<RotaTable, RotaError> {
    let resolved = resolve(store, period_id)?;
    let columns: Vec<String> = resolved
        .catalog
        .display_order()
        .into_iter()
        .map(|s| s.name.clone())
        .collect();

    let mut rows = Vec::with_capacity(resolved.period.weeks() as usize);
    for week in 0..resolved.period.weeks() {
        let week_start = resolved.period.start_date + Days::new(WEEK_DAYS * u64::from(week));
        let cells = columns
            .iter()
            .map(|column| {
                let mut names: Vec<String> = resolved
                    .rows
                    .iter()
                    .filter(|(w, _, shift)| *w == week_start && shift == column)
                    .map(|(_, member, _)| member.clone())
                    .collect();
                names.sort();
                names
            })
            .collect();
        rows.push(RotaRow {
            week_start,
            week_end: week_end(week_start),
            cells,
        });
    }

    Ok(RotaTable {
        period: resolved.period,
        columns,
        rows,
    })
}

/// Per-member shift counts over a committed period, sorted by member name.
///
/// Members on the roster with no assignments in the period are omitted.
pub fn shift_distribution<S: RotaStore + ?Sized>(
    store: &S,
    period_id: PeriodId,
) -> Result<Vec<MemberDistribution>, RotaError> {
    let resolved = resolve(store, period_id)?;
    let order = resolved.catalog.display_order();

    let mut tallies: FxHashMap<&str, FxHashMap<&str, u32>> = FxHashMap::default();
    for (_, member, shift) in &resolved.rows {
        *tallies
            .entry(member.as_str())
            .or_default()
            .entry(shift.as_str())
            .or_insert(0) += 1;
    }

    let mut distribution: Vec<MemberDistribution> = tallies
        .into_iter()
        .map(|(member, per_shift)| {
            let counts: Vec<(String, u32)> = order
                .iter()
                .map(|s| {
                    let n = per_shift.get(s.name.as_str()).copied().unwrap_or(0);
                    (s.name.clone(), n)
                })
                .collect();
            let total_special = counts
                .iter()
                .filter(|(name, _)| !resolved.catalog.is_default(name))
                .map(|(_, n)| n)
                .sum();
            MemberDistribution {
                member: member.to_string(),
                counts,
                total_special,
            }
        })
        .collect();
    distribution.sort_by(|a, b| a.member.cmp(&b.member));

    Ok(distribution)
}
