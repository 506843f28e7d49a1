//! Validated shift catalog with a resolved default shift.

use rustc_hash::FxHashMap;

use crate::error::RotaError;
use crate::models::ShiftDefinition;

/// The shift definitions for one generation run.
///
/// Construction guarantees unique names, `min <= max` for every shift and
/// exactly one default shift.
#[derive(Clone, Debug)]
pub struct ShiftCatalog {
    shifts: Vec<ShiftDefinition>,
    by_name: FxHashMap<String, usize>,
    default_index: usize,
}

impl ShiftCatalog {
    /// Validate shift definitions and resolve the default shift.
    ///
    /// The default is the single shift flagged `is_default`. With no flag set,
    /// the shift with the strictly largest `max_members` is used.
    pub fn new(shifts: Vec<ShiftDefinition>) -> Result<Self, RotaError> {
        if shifts.is_empty() {
            return Err(RotaError::Configuration(
                "Shift catalog is empty: at least one shift is required".to_string(),
            ));
        }

        let mut by_name: FxHashMap<String, usize> =
            FxHashMap::with_capacity_and_hasher(shifts.len(), Default::default());
        for (idx, shift) in shifts.iter().enumerate() {
            if shift.min_members > shift.max_members {
                return Err(RotaError::Configuration(format!(
                    "Shift '{}' has min_members {} greater than max_members {}",
                    shift.name, shift.min_members, shift.max_members
                )));
            }
            if by_name.insert(shift.name.clone(), idx).is_some() {
                return Err(RotaError::Configuration(format!(
                    "Duplicate shift name: '{}'",
                    shift.name
                )));
            }
        }

        let default_index = Self::resolve_default(&shifts)?;

        Ok(Self {
            shifts,
            by_name,
            default_index,
        })
    }

    fn resolve_default(shifts: &[ShiftDefinition]) -> Result<usize, RotaError> {
        let flagged: Vec<usize> = shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_default)
            .map(|(idx, _)| idx)
            .collect();

        match flagged.as_slice() {
            [idx] => return Ok(*idx),
            [] => {}
            _ => {
                let names: Vec<&str> = flagged.iter().map(|&i| shifts[i].name.as_str()).collect();
                return Err(RotaError::Configuration(format!(
                    "More than one default shift: {}",
                    names.join(", ")
                )));
            }
        }

        // No explicit flag: fall back to the largest capacity
        let largest = shifts.iter().map(|s| s.max_members).max().unwrap_or(0);
        let candidates: Vec<usize> = shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.max_members == largest)
            .map(|(idx, _)| idx)
            .collect();

        match candidates.as_slice() {
            [idx] => Ok(*idx),
            _ => Err(RotaError::Configuration(format!(
                "No default shift determinable: {} shifts share the largest max_members ({})",
                candidates.len(),
                largest
            ))),
        }
    }

    pub fn default_shift(&self) -> &ShiftDefinition {
        &self.shifts[self.default_index]
    }

    pub fn is_default(&self, name: &str) -> bool {
        self.by_name.get(name) == Some(&self.default_index)
    }

    pub fn get(&self, name: &str) -> Option<&ShiftDefinition> {
        self.by_name.get(name).map(|&idx| &self.shifts[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShiftDefinition> {
        self.shifts.iter()
    }

    /// Non-default shifts, tightest first: ascending `min_members`, then name.
    pub fn special_shifts(&self) -> Vec<&ShiftDefinition> {
        let mut special: Vec<&ShiftDefinition> = self
            .shifts
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.default_index)
            .map(|(_, s)| s)
            .collect();
        special.sort_by(|a, b| {
            a.min_members
                .cmp(&b.min_members)
                .then_with(|| a.name.cmp(&b.name))
        });
        special
    }

    /// All shifts in report column order: by start time, then name.
    pub fn display_order(&self) -> Vec<&ShiftDefinition> {
        let mut ordered: Vec<&ShiftDefinition> = self.shifts.iter().collect();
        ordered.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.name.cmp(&b.name))
        });
        ordered
    }
}
