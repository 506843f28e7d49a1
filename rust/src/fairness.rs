//! Fairness state: per-member shift exposure across a period.

use rustc_hash::FxHashMap;

use crate::catalog::ShiftCatalog;
use crate::models::Member;

/// Sort key for candidate ranking (lower = picked first).
///
/// Ordered by this shift's count, then total special shifts, then name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FairnessKey<'a> {
    pub shift_count: u32,
    pub total_special: u32,
    pub name: &'a str,
}

#[derive(Clone, Debug, Default)]
struct MemberTally {
    per_shift: FxHashMap<String, u32>,
    total_special: u32,
}

/// Per-member assignment counters for one period.
///
/// Updated once per week, after that week is finalized, so every candidate
/// within a week is ranked against the same snapshot.
#[derive(Clone, Debug, Default)]
pub struct FairnessTracker {
    tallies: FxHashMap<i64, MemberTally>,
}

impl FairnessTracker {
    /// Zeroed counters for every known member.
    pub fn new<'m>(members: impl IntoIterator<Item = &'m Member>) -> Self {
        let tallies = members
            .into_iter()
            .map(|m| (m.id, MemberTally::default()))
            .collect();
        Self { tallies }
    }

    pub fn count(&self, member_id: i64, shift_name: &str) -> u32 {
        self.tallies
            .get(&member_id)
            .and_then(|t| t.per_shift.get(shift_name))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_special(&self, member_id: i64) -> u32 {
        self.tallies
            .get(&member_id)
            .map(|t| t.total_special)
            .unwrap_or(0)
    }

    pub fn key<'m>(&self, member: &'m Member, shift_name: &str) -> FairnessKey<'m> {
        FairnessKey {
            shift_count: self.count(member.id, shift_name),
            total_special: self.total_special(member.id),
            name: &member.name,
        }
    }

    /// Lowest-ranked candidate for `shift_name`.
    pub fn best_candidate<'m>(
        &self,
        candidates: &[&'m Member],
        shift_name: &str,
    ) -> Option<&'m Member> {
        candidates
            .iter()
            .copied()
            .min_by_key(|&m| self.key(m, shift_name))
    }

    /// Fold a finalized week's `(member_id, shift_name)` assignments into the counters.
    pub fn record_week<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = (i64, &'a str)>,
        catalog: &ShiftCatalog,
    ) {
        for (member_id, shift_name) in assignments {
            let tally = self.tallies.entry(member_id).or_default();
            *tally.per_shift.entry(shift_name.to_string()).or_insert(0) += 1;
            if !catalog.is_default(shift_name) {
                tally.total_special += 1;
            }
        }
    }
}
