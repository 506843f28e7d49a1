//! Period identifier allocation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use crate::error::RotaError;
use crate::models::PeriodId;
use crate::store::RotaStore;

/// Source of candidate period identifiers.
pub trait PeriodIdAllocator {
    /// Next candidate. May collide with an existing period; the caller retries.
    fn next_candidate(&mut self) -> PeriodId;
}

/// Deterministic, monotonically increasing identifiers.
#[derive(Clone, Debug)]
pub struct SequentialIdAllocator {
    next: PeriodId,
}

impl SequentialIdAllocator {
    pub fn starting_at(first: PeriodId) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIdAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl PeriodIdAllocator for SequentialIdAllocator {
    fn next_candidate(&mut self) -> PeriodId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Ten-digit identifiers drawn from a seeded RNG.
///
/// The same seed yields the same sequence of candidates.
pub struct SeededIdAllocator {
    rng: StdRng,
}

impl SeededIdAllocator {
    pub const MIN_ID: PeriodId = 1_000_000_000;
    pub const MAX_ID: PeriodId = 9_999_999_999;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PeriodIdAllocator for SeededIdAllocator {
    fn next_candidate(&mut self) -> PeriodId {
        self.rng.gen_range(Self::MIN_ID..=Self::MAX_ID)
    }
}

/// Draw candidates until one is unused by `store` and not in `issued`.
///
/// The winning id is added to `issued`.
pub fn allocate_period_id<S: RotaStore + ?Sized>(
    allocator: &mut dyn PeriodIdAllocator,
    store: &S,
    issued: &mut FxHashSet<PeriodId>,
    max_attempts: u32,
) -> Result<PeriodId, RotaError> {
    for _ in 0..max_attempts {
        let candidate = allocator.next_candidate();
        if issued.contains(&candidate) || store.period_exists(candidate)? {
            continue;
        }
        issued.insert(candidate);
        return Ok(candidate);
    }

    Err(RotaError::Configuration(format!(
        "Could not allocate an unused period id after {} attempts",
        max_attempts
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RotaPeriod;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn commit_empty(store: &mut MemoryStore, id: PeriodId) {
        let period =
            RotaPeriod::spanning(id, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(), 1).unwrap();
        store.commit_period(&period, &[]).unwrap();
    }

    #[test]
    fn test_sequential_skips_used_ids() {
        let mut store = MemoryStore::new();
        commit_empty(&mut store, 1);
        commit_empty(&mut store, 2);

        let mut allocator = SequentialIdAllocator::default();
        let mut issued = FxHashSet::default();
        let id = allocate_period_id(&mut allocator, &store, &mut issued, 10).unwrap();

        assert_eq!(id, 3);
        assert!(issued.contains(&3));
    }

    #[test]
    fn test_issued_ids_are_not_reused() {
        let store = MemoryStore::new();
        let mut issued: FxHashSet<PeriodId> = [1, 2].into_iter().collect();

        let id = allocate_period_id(
            &mut SequentialIdAllocator::default(),
            &store,
            &mut issued,
            10,
        )
        .unwrap();
        assert_eq!(id, 3);
    }

    #[test]
    fn test_exhausted_attempts_is_configuration_error() {
        let mut store = MemoryStore::new();
        commit_empty(&mut store, 1);

        let result = allocate_period_id(
            &mut SequentialIdAllocator::default(),
            &store,
            &mut FxHashSet::default(),
            1,
        );
        assert!(matches!(result, Err(RotaError::Configuration(_))));
    }

    #[test]
    fn test_seeded_ids_are_reproducible_ten_digit() {
        let mut a = SeededIdAllocator::new(42);
        let mut b = SeededIdAllocator::new(42);

        for _ in 0..5 {
            let id = a.next_candidate();
            assert_eq!(id, b.next_candidate());
            assert!((SeededIdAllocator::MIN_ID..=SeededIdAllocator::MAX_ID).contains(&id));
        }
    }
}
