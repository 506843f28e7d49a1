//! Per-generation context: id source and structured event sink.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::error::RotaError;
use crate::id::{allocate_period_id, PeriodIdAllocator, SeededIdAllocator, SequentialIdAllocator};
use crate::linkage::LinkOutcome;
use crate::models::PeriodId;
use crate::store::RotaStore;
use crate::validator::CapacityWarning;

/// Orchestrator state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationPhase {
    Init,
    Seeded,
    Generating { week: u32 },
    Committed,
    Aborted,
}

/// Structured record of something that happened during a generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationEvent {
    PhaseChanged(GenerationPhase),
    LeaveExcluded {
        week_start: NaiveDate,
        member: String,
        absence_start: NaiveDate,
        absence_end: NaiveDate,
    },
    Linkage {
        week_start: NaiveDate,
        outcome: LinkOutcome,
    },
    CapacityExceeded {
        week_start: NaiveDate,
        warning: CapacityWarning,
    },
    WeekStaged {
        week_start: NaiveDate,
        assignments: usize,
    },
    Committed {
        period_id: PeriodId,
        assignments: usize,
    },
    Aborted {
        reason: String,
    },
}

/// State owned by one generation call.
///
/// Ids handed out through this context are never handed out again by it,
/// even if the period they were issued for was aborted.
pub struct GenerationContext {
    id_source: Box<dyn PeriodIdAllocator>,
    issued: FxHashSet<PeriodId>,
    events: Vec<GenerationEvent>,
    phase: GenerationPhase,
}

impl GenerationContext {
    pub fn new(id_source: Box<dyn PeriodIdAllocator>) -> Self {
        Self {
            id_source,
            issued: FxHashSet::default(),
            events: Vec::new(),
            phase: GenerationPhase::Init,
        }
    }

    /// Monotonic ids starting at 1.
    pub fn sequential() -> Self {
        Self::new(Box::new(SequentialIdAllocator::default()))
    }

    /// Ten-digit ids reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(SeededIdAllocator::new(seed)))
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn events(&self) -> &[GenerationEvent] {
        &self.events
    }

    /// Drain recorded events, e.g. between runs that share this context.
    pub fn take_events(&mut self) -> Vec<GenerationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Non-fatal issues: capacity overruns and skipped linked shifts.
    pub fn warnings(&self) -> impl Iterator<Item = &GenerationEvent> {
        self.events.iter().filter(|e| {
            matches!(
                e,
                GenerationEvent::CapacityExceeded { .. }
                    | GenerationEvent::Linkage {
                        outcome: LinkOutcome::Skipped { .. },
                        ..
                    }
            )
        })
    }

    pub fn record(&mut self, event: GenerationEvent) {
        self.events.push(event);
    }

    pub(crate) fn enter(&mut self, phase: GenerationPhase) {
        self.phase = phase;
        self.events.push(GenerationEvent::PhaseChanged(phase));
    }

    pub(crate) fn allocate_period_id<S: RotaStore + ?Sized>(
        &mut self,
        store: &S,
        max_attempts: u32,
    ) -> Result<PeriodId, RotaError> {
        allocate_period_id(self.id_source.as_mut(), store, &mut self.issued, max_attempts)
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::sequential()
    }
}
