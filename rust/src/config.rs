//! Configuration types for rota generation.

use pyo3::prelude::*;

use crate::logging::VERBOSITY_SILENT;
use crate::models::Role;

/// Configuration for a period generation run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct RotaConfig {
    /// Role tag -> shift names that role may never be assigned
    #[pyo3(get, set)]
    pub exemptions: Vec<(Role, Vec<String>)>,
    /// (trigger, follow-up) pairs: sole trigger assignee gets the follow-up next week
    #[pyo3(get, set)]
    pub linked_shifts: Vec<(String, String)>,
    /// Minimum roster members able to work at least one special shift (0 disables the check)
    #[pyo3(get, set)]
    pub min_rotating_members: usize,
    /// Attempts before period id allocation gives up
    #[pyo3(get, set)]
    pub max_id_attempts: u32,
    /// Logging verbosity (0-3)
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for RotaConfig {
    fn default() -> Self {
        Self {
            exemptions: Vec::new(),
            linked_shifts: Vec::new(),
            min_rotating_members: 0,
            max_id_attempts: 1000,
            verbosity: VERBOSITY_SILENT,
        }
    }
}

#[pymethods]
impl RotaConfig {
    #[new]
    #[pyo3(signature = (
        exemptions=None,
        linked_shifts=None,
        min_rotating_members=None,
        max_id_attempts=None,
        verbosity=None
    ))]
    fn new(
        exemptions: Option<Vec<(Role, Vec<String>)>>,
        linked_shifts: Option<Vec<(String, String)>>,
        min_rotating_members: Option<usize>,
        max_id_attempts: Option<u32>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            exemptions: exemptions.unwrap_or(defaults.exemptions),
            linked_shifts: linked_shifts.unwrap_or(defaults.linked_shifts),
            min_rotating_members: min_rotating_members.unwrap_or(defaults.min_rotating_members),
            max_id_attempts: max_id_attempts.unwrap_or(defaults.max_id_attempts),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "RotaConfig(exemptions={}, linked_shifts={:?}, min_rotating_members={})",
            self.exemptions.len(),
            self.linked_shifts,
            self.min_rotating_members
        )
    }
}
