//! Rust implementation of the rota generation engine.
//!
//! Generates multi-week shift rotas for a fixed roster: leave exclusion,
//! role exemptions, linked shifts and a deterministic fairness ranking, with
//! each period committed to the store all-or-nothing.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use std::path::Path;

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub mod logging;

pub mod allocator;
pub mod catalog;
mod config;
pub mod context;
pub mod error;
pub mod exemption;
pub mod fairness;
pub mod id;
pub mod leave;
pub mod linkage;
mod models;
pub mod orchestrator;
pub mod report;
pub mod store;
pub mod validator;
pub mod week;

pub use catalog::ShiftCatalog;
pub use config::RotaConfig;
pub use context::{GenerationContext, GenerationEvent, GenerationPhase};
pub use error::{RotaError, StoreError};
pub use models::{
    AbsenceInterval, Member, PeriodId, Role, RotaPeriod, ShiftDefinition, WeeklyAssignment,
};
pub use orchestrator::{generate_period_rota, PeriodGenerator};
pub use report::{rota_table, shift_distribution, MemberDistribution, RotaRow, RotaTable};
pub use store::{MemoryStore, RotaStore, SqliteStore};

fn to_py_err(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn open_store(db_path: &str) -> PyResult<SqliteStore> {
    SqliteStore::open(Path::new(db_path)).map_err(to_py_err)
}

/// Generate and commit a rota period.
///
/// # Arguments
/// * `db_path` - SQLite database holding the roster, catalog and absences
/// * `start_date` - First day of the first week
/// * `period_weeks` - Number of weeks to generate (>= 1)
/// * `config` - Exemptions, linked shifts and limits
/// * `seed` - When given, period ids are ten-digit values drawn from this seed;
///   otherwise the next unused sequential id is taken
///
/// # Returns
/// * The new period id
///
/// # Raises
/// * ValueError if the roster or catalog is misconfigured, or any week is
///   infeasible. Nothing is written in that case.
#[pyfunction]
#[pyo3(
    name = "generate_period_rota",
    signature = (db_path, start_date, period_weeks, config=None, seed=None)
)]
fn py_generate_period_rota(
    db_path: &str,
    start_date: NaiveDate,
    period_weeks: u32,
    config: Option<RotaConfig>,
    seed: Option<u64>,
) -> PyResult<PeriodId> {
    let config = config.unwrap_or_default();
    let mut store = open_store(db_path)?;
    let mut ctx = match seed {
        Some(seed) => GenerationContext::seeded(seed),
        None => GenerationContext::sequential(),
    };

    generate_period_rota(&mut store, start_date, period_weeks, &config, &mut ctx)
        .map_err(to_py_err)
}

/// Delete a period and its assignments. Returns False if it did not exist.
#[pyfunction]
#[pyo3(name = "delete_period")]
fn py_delete_period(db_path: &str, period_id: PeriodId) -> PyResult<bool> {
    let mut store = open_store(db_path)?;
    store.delete_period(period_id).map_err(to_py_err)
}

/// All committed periods, newest start date first.
#[pyfunction]
#[pyo3(name = "list_periods")]
fn py_list_periods(db_path: &str) -> PyResult<Vec<RotaPeriod>> {
    open_store(db_path)?.periods().map_err(to_py_err)
}

/// Tabular view of a committed period: weeks by shifts.
#[pyfunction]
#[pyo3(name = "rota_table")]
fn py_rota_table(db_path: &str, period_id: PeriodId) -> PyResult<RotaTable> {
    rota_table(&open_store(db_path)?, period_id).map_err(to_py_err)
}

/// Per-member shift counts over a committed period.
#[pyfunction]
#[pyo3(name = "shift_distribution")]
fn py_shift_distribution(
    db_path: &str,
    period_id: PeriodId,
) -> PyResult<Vec<MemberDistribution>> {
    shift_distribution(&open_store(db_path)?, period_id).map_err(to_py_err)
}

/// Python module definition
#[pymodule]
fn rota_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Role>()?;
    m.add_class::<Member>()?;
    m.add_class::<ShiftDefinition>()?;
    m.add_class::<AbsenceInterval>()?;
    m.add_class::<RotaPeriod>()?;
    m.add_class::<WeeklyAssignment>()?;

    // Config types
    m.add_class::<RotaConfig>()?;

    // Reports
    m.add_class::<RotaTable>()?;
    m.add_class::<RotaRow>()?;
    m.add_class::<MemberDistribution>()?;

    // Generation and period management
    m.add_function(wrap_pyfunction!(py_generate_period_rota, m)?)?;
    m.add_function(wrap_pyfunction!(py_delete_period, m)?)?;
    m.add_function(wrap_pyfunction!(py_list_periods, m)?)?;
    m.add_function(wrap_pyfunction!(py_rota_table, m)?)?;
    m.add_function(wrap_pyfunction!(py_shift_distribution, m)?)?;

    Ok(())
}
