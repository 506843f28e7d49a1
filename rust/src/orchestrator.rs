//! Period orchestration: week-by-week generation with an all-or-nothing commit.

use chrono::{Days, NaiveDate};

use crate::allocator::WeeklyAllocator;
use crate::catalog::ShiftCatalog;
use crate::config::RotaConfig;
use crate::context::{GenerationContext, GenerationEvent, GenerationPhase};
use crate::error::RotaError;
use crate::exemption::ExemptionPolicy;
use crate::fairness::FairnessTracker;
use crate::leave::{week_end, LeaveFilter};
use crate::linkage::{LinkOutcome, LinkageMemory, LinkedShiftResolver};
use crate::models::{Member, PeriodId, RotaPeriod, WeeklyAssignment, WEEK_DAYS};
use crate::store::RotaStore;
use crate::validator::validate_week;
use crate::week::WeekPlan;
use crate::{log_changes, log_checks, log_debug, log_error};

/// Generate and commit a rota period of `period_weeks` weeks from `start_date`.
///
/// Either every week is generated and the whole period is committed in one
/// store transaction, or nothing is written and the error is returned.
pub fn generate_period_rota<S: RotaStore + ?Sized>(
    store: &mut S,
    start_date: NaiveDate,
    period_weeks: u32,
    config: &RotaConfig,
    ctx: &mut GenerationContext,
) -> Result<PeriodId, RotaError> {
    ctx.enter(GenerationPhase::Init);
    log_changes!(
        config.verbosity,
        "Starting rota generation for {} week(s) from {}",
        period_weeks,
        start_date
    );

    let result = PeriodGenerator::new(&*store, config)
        .and_then(|generator| generator.generate(store, start_date, period_weeks, ctx));

    if let Err(err) = &result {
        log_error!("Rota generation aborted: {}", err);
        ctx.record(GenerationEvent::Aborted {
            reason: err.to_string(),
        });
        ctx.enter(GenerationPhase::Aborted);
    }
    result
}

/// Validated inputs for one generation run.
pub struct PeriodGenerator<'a> {
    config: &'a RotaConfig,
    /// Sorted by name
    members: Vec<Member>,
    catalog: ShiftCatalog,
    exemptions: ExemptionPolicy,
    linkage: LinkedShiftResolver,
}

impl<'a> PeriodGenerator<'a> {
    /// Load and validate roster, catalog and configuration.
    pub fn new<S: RotaStore + ?Sized>(
        store: &S,
        config: &'a RotaConfig,
    ) -> Result<Self, RotaError> {
        let mut members = store.members()?;
        if members.is_empty() {
            return Err(RotaError::Configuration(
                "Roster is empty: at least one member is required".to_string(),
            ));
        }
        members.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = members.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(RotaError::Configuration(format!(
                "Duplicate member name: '{}'",
                pair[0].name
            )));
        }

        let catalog = ShiftCatalog::new(store.shifts()?)?;
        let exemptions = ExemptionPolicy::from_config(config, &catalog)?;
        let linkage = LinkedShiftResolver::from_config(config, &catalog)?;

        let rotating = members
            .iter()
            .filter(|m| exemptions.can_rotate(m, &catalog))
            .count();
        if rotating < config.min_rotating_members {
            return Err(RotaError::Configuration(format!(
                "Rota generation requires at least {} members able to work a special shift, \
                 found {}",
                config.min_rotating_members, rotating
            )));
        }

        Ok(Self {
            config,
            members,
            catalog,
            exemptions,
            linkage,
        })
    }

    /// Run every week in sequence, then commit the staged period.
    pub fn generate<S: RotaStore + ?Sized>(
        &self,
        store: &mut S,
        start_date: NaiveDate,
        period_weeks: u32,
        ctx: &mut GenerationContext,
    ) -> Result<PeriodId, RotaError> {
        let verbosity = self.config.verbosity;
        if period_weeks == 0 {
            return Err(RotaError::Configuration(
                "Period must cover at least one week".to_string(),
            ));
        }

        let period_id = ctx.allocate_period_id(&*store, self.config.max_id_attempts)?;
        let period = RotaPeriod::spanning(period_id, start_date, period_weeks).ok_or_else(|| {
            RotaError::Configuration(format!(
                "Period of {} weeks from {} is out of date range",
                period_weeks, start_date
            ))
        })?;
        let leave = LeaveFilter::new(store.absences_between(period.start_date, period.end_date)?);
        let mut fairness = FairnessTracker::new(&self.members);
        let mut memory = LinkageMemory::default();
        let mut staged: Vec<WeeklyAssignment> = Vec::new();
        ctx.enter(GenerationPhase::Seeded);
        log_changes!(
            verbosity,
            "Seeded period {} ({} - {})",
            period.period_id,
            period.start_date,
            period.end_date
        );

        for week in 0..period_weeks {
            ctx.enter(GenerationPhase::Generating { week: week + 1 });
            let week_start = start_date + Days::new(WEEK_DAYS * u64::from(week));

            let plan = self.generate_week(week_start, week > 0, &leave, &memory, &fairness, ctx)?;

            for placement in &plan.placements {
                let shift = self
                    .catalog
                    .get(&placement.shift)
                    .ok_or_else(|| RotaError::Validation {
                        week_start,
                        shift: placement.shift.clone(),
                        reason: "shift missing from catalog".to_string(),
                    })?;
                staged.push(WeeklyAssignment {
                    period_id,
                    week_start,
                    member_id: placement.member.id,
                    shift_id: shift.id,
                });
            }
            ctx.record(GenerationEvent::WeekStaged {
                week_start,
                assignments: plan.len(),
            });

            fairness.record_week(
                plan.placements
                    .iter()
                    .map(|p| (p.member.id, p.shift.as_str())),
                &self.catalog,
            );
            memory = self.linkage.remember(&plan);

            for member in &self.members {
                log_debug!(
                    verbosity,
                    "    {}: special={} {}",
                    member.name,
                    fairness.total_special(member.id),
                    self.catalog
                        .iter()
                        .map(|s| format!("{}={}", s.name, fairness.count(member.id, &s.name)))
                        .collect::<Vec<_>>()
                        .join(" ")
                );
            }
        }

        store.commit_period(&period, &staged)?;
        ctx.record(GenerationEvent::Committed {
            period_id,
            assignments: staged.len(),
        });
        ctx.enter(GenerationPhase::Committed);
        log_changes!(
            verbosity,
            "Committed period {} with {} assignments",
            period_id,
            staged.len()
        );

        Ok(period_id)
    }

    /// Leave filter -> linked shifts -> allocation -> validation for one week.
    fn generate_week<'m>(
        &'m self,
        week_start: NaiveDate,
        apply_linkage: bool,
        leave: &LeaveFilter,
        memory: &LinkageMemory,
        fairness: &FairnessTracker,
        ctx: &mut GenerationContext,
    ) -> Result<WeekPlan<'m>, RotaError> {
        let verbosity = self.config.verbosity;
        log_changes!(verbosity, "--- Week {} - {} ---", week_start, week_end(week_start));

        for member in &self.members {
            if let Some(absence) = leave.absence_during(member.id, week_start) {
                log_checks!(
                    verbosity,
                    "  Excluding {} (leave {} - {})",
                    member.name,
                    absence.start_date,
                    absence.end_date
                );
                ctx.record(GenerationEvent::LeaveExcluded {
                    week_start,
                    member: member.name.clone(),
                    absence_start: absence.start_date,
                    absence_end: absence.end_date,
                });
            }
        }
        let mut available = leave.eligible_for_week(&self.members, week_start);

        let mut plan = WeekPlan::new(week_start);
        if apply_linkage {
            let outcomes = self.linkage.pre_assign(
                memory,
                &mut available,
                &mut plan,
                &self.exemptions,
                &self.members,
            );
            for outcome in outcomes {
                match &outcome {
                    LinkOutcome::Assigned {
                        member, follow_up, ..
                    } => {
                        log_changes!(verbosity, "  Assigned {} to {} (linked)", member, follow_up)
                    }
                    LinkOutcome::Skipped {
                        trigger,
                        follow_up,
                        reason,
                    } => log_checks!(
                        verbosity,
                        "  No linked {} after {}: {:?}",
                        follow_up,
                        trigger,
                        reason
                    ),
                }
                ctx.record(GenerationEvent::Linkage {
                    week_start,
                    outcome,
                });
            }
        }

        WeeklyAllocator::new(&self.catalog, &self.exemptions, verbosity).allocate(
            available,
            &mut plan,
            fairness,
        )?;

        for warning in validate_week(&plan, &self.catalog)? {
            log_changes!(
                verbosity,
                "  WARNING: {} has {} members, max is {}",
                warning.shift,
                warning.assigned,
                warning.max_members
            );
            ctx.record(GenerationEvent::CapacityExceeded {
                week_start,
                warning,
            });
        }

        Ok(plan)
    }
}
