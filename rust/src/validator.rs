//! Post-assignment capacity checks for a finished week.

use crate::catalog::ShiftCatalog;
use crate::error::RotaError;
use crate::week::WeekPlan;

/// The default shift holding more members than its `max_members`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacityWarning {
    pub shift: String,
    pub assigned: u32,
    pub max_members: u32,
}

/// Check every shift's headcount against its capacity range.
///
/// Falling short of `min_members` is fatal, as is exceeding `max_members` on
/// a special shift. The default shift exceeding its `max_members` is returned
/// as a warning.
pub fn validate_week(
    plan: &WeekPlan<'_>,
    catalog: &ShiftCatalog,
) -> Result<Vec<CapacityWarning>, RotaError> {
    let mut warnings = Vec::new();

    for shift in catalog.iter() {
        let assigned = plan.count(&shift.name);
        if assigned < shift.min_members {
            return Err(RotaError::Validation {
                week_start: plan.week_start,
                shift: shift.name.clone(),
                reason: format!("{} assigned, minimum is {}", assigned, shift.min_members),
            });
        }
        if assigned <= shift.max_members {
            continue;
        }
        if !shift.is_default {
            return Err(RotaError::Validation {
                week_start: plan.week_start,
                shift: shift.name.clone(),
                reason: format!("{} assigned, maximum is {}", assigned, shift.max_members),
            });
        }
        warnings.push(CapacityWarning {
            shift: shift.name.clone(),
            assigned,
            max_members: shift.max_members,
        });
    }

    Ok(warnings)
}
