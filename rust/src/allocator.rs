//! Weekly allocation: fill special-shift minimums fairly, everyone else to the default.

use crate::catalog::ShiftCatalog;
use crate::error::RotaError;
use crate::exemption::ExemptionPolicy;
use crate::fairness::FairnessTracker;
use crate::models::Member;
use crate::week::WeekPlan;
use crate::{log_changes, log_checks};

/// Greedy per-week allocator.
pub struct WeeklyAllocator<'c> {
    catalog: &'c ShiftCatalog,
    exemptions: &'c ExemptionPolicy,
    verbosity: u8,
}

impl<'c> WeeklyAllocator<'c> {
    pub fn new(catalog: &'c ShiftCatalog, exemptions: &'c ExemptionPolicy, verbosity: u8) -> Self {
        Self {
            catalog,
            exemptions,
            verbosity,
        }
    }

    /// Allocate every member in `available` to exactly one shift.
    ///
    /// Special shifts are taken tightest first and filled only up to their
    /// minimum, counting members already placed (linked follow-ups). The
    /// remaining members all go to the default shift.
    pub fn allocate<'m>(
        &self,
        mut available: Vec<&'m Member>,
        plan: &mut WeekPlan<'m>,
        fairness: &FairnessTracker,
    ) -> Result<(), RotaError> {
        let verbosity = self.verbosity;

        for shift in self.catalog.special_shifts() {
            let mut assigned = plan.count(&shift.name);

            while assigned < shift.min_members {
                let candidates: Vec<&'m Member> = available
                    .iter()
                    .copied()
                    .filter(|m| !self.exemptions.is_exempt(m, &shift.name))
                    .collect();

                log_checks!(
                    verbosity,
                    "  {} candidates: {}",
                    shift.name,
                    candidates
                        .iter()
                        .map(|m| {
                            let key = fairness.key(m, &shift.name);
                            format!("{}({}/{})", m.name, key.shift_count, key.total_special)
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                );

                let Some(winner) = fairness.best_candidate(&candidates, &shift.name) else {
                    return Err(RotaError::InfeasibleWeek {
                        week_start: plan.week_start,
                        shift: shift.name.clone(),
                        required: shift.min_members,
                        assigned,
                    });
                };

                available.retain(|m| m.id != winner.id);
                plan.assign(winner, &shift.name, false);
                assigned += 1;
                log_changes!(verbosity, "  Assigned {} to {}", winner.name, shift.name);
            }
        }

        let default_shift = self.catalog.default_shift();
        for member in available {
            plan.assign(member, &default_shift.name, false);
        }

        let assigned = plan.count(&default_shift.name);
        if assigned < default_shift.min_members {
            return Err(RotaError::InfeasibleWeek {
                week_start: plan.week_start,
                shift: default_shift.name.clone(),
                required: default_shift.min_members,
                assigned,
            });
        }

        Ok(())
    }
}
