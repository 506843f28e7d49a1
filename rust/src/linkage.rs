//! Linked shifts: the sole assignee of a trigger shift gets its follow-up next week.

use rustc_hash::FxHashMap;

use crate::catalog::ShiftCatalog;
use crate::config::RotaConfig;
use crate::error::RotaError;
use crate::exemption::ExemptionPolicy;
use crate::models::Member;
use crate::week::WeekPlan;

/// Trigger shift name -> member id of its sole assignee in the previous week.
pub type LinkageMemory = FxHashMap<String, i64>;

/// Why a linked follow-up was not pre-assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkSkip {
    /// Trigger had zero or several assignees last week
    NoSingleton,
    /// Assignee is absent this week or no longer on the roster
    Unavailable { member: String },
    /// Assignee's role is exempt from the follow-up shift
    Exempt { member: String },
    /// Assignee was already pre-assigned by an earlier pair
    AlreadyAssigned { member: String, shift: String },
    /// Follow-up shift already holds its `max_members`
    FollowUpFull { member: String, max_members: u32 },
}

/// Result of evaluating one (trigger, follow-up) pair for a week.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    Assigned {
        member: String,
        trigger: String,
        follow_up: String,
    },
    Skipped {
        trigger: String,
        follow_up: String,
        reason: LinkSkip,
    },
}

#[derive(Clone, Debug)]
struct LinkedPair {
    trigger: String,
    follow_up: String,
    /// `None` for the default shift, which has no hard cap
    capacity: Option<u32>,
}

/// Enforces the configured trigger -> follow-up mandates.
#[derive(Clone, Debug, Default)]
pub struct LinkedShiftResolver {
    pairs: Vec<LinkedPair>,
}

impl LinkedShiftResolver {
    /// Validate configured pairs against the catalog.
    pub fn from_config(config: &RotaConfig, catalog: &ShiftCatalog) -> Result<Self, RotaError> {
        let mut pairs = Vec::with_capacity(config.linked_shifts.len());
        for (trigger, follow_up) in &config.linked_shifts {
            for name in [trigger, follow_up] {
                if !catalog.contains(name) {
                    return Err(RotaError::Configuration(format!(
                        "Linked shift '{}' -> '{}' references unknown shift '{}'",
                        trigger, follow_up, name
                    )));
                }
            }
            if trigger == follow_up {
                return Err(RotaError::Configuration(format!(
                    "Linked shift '{}' cannot be its own follow-up",
                    trigger
                )));
            }
            pairs.push(LinkedPair {
                trigger: trigger.clone(),
                follow_up: follow_up.clone(),
                capacity: catalog
                    .get(follow_up)
                    .filter(|s| !s.is_default)
                    .map(|s| s.max_members),
            });
        }

        Ok(Self { pairs })
    }

    /// Record each trigger shift's singleton assignee from a finalized week.
    pub fn remember(&self, plan: &WeekPlan<'_>) -> LinkageMemory {
        let mut memory = LinkageMemory::default();
        for pair in &self.pairs {
            if let Some(member) = plan.singleton(&pair.trigger) {
                memory.insert(pair.trigger.clone(), member.id);
            }
        }
        memory
    }

    /// Pre-assign follow-up shifts before fairness allocation runs.
    ///
    /// Assigned members are removed from `available`.
    pub fn pre_assign<'m>(
        &self,
        memory: &LinkageMemory,
        available: &mut Vec<&'m Member>,
        plan: &mut WeekPlan<'m>,
        exemptions: &ExemptionPolicy,
        roster: &'m [Member],
    ) -> Vec<LinkOutcome> {
        let mut outcomes = Vec::with_capacity(self.pairs.len());

        for LinkedPair {
            trigger,
            follow_up,
            capacity,
        } in &self.pairs
        {
            let skipped = |reason: LinkSkip| LinkOutcome::Skipped {
                trigger: trigger.clone(),
                follow_up: follow_up.clone(),
                reason,
            };

            let Some(&member_id) = memory.get(trigger) else {
                outcomes.push(skipped(LinkSkip::NoSingleton));
                continue;
            };

            let Some(pos) = available.iter().position(|m| m.id == member_id) else {
                let member = roster
                    .iter()
                    .find(|m| m.id == member_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| member_id.to_string());
                let reason = match plan.shift_of(member_id) {
                    Some(shift) => LinkSkip::AlreadyAssigned {
                        member,
                        shift: shift.to_string(),
                    },
                    None => LinkSkip::Unavailable { member },
                };
                outcomes.push(skipped(reason));
                continue;
            };

            let member = available[pos];
            if exemptions.is_exempt(member, follow_up) {
                outcomes.push(skipped(LinkSkip::Exempt {
                    member: member.name.clone(),
                }));
                continue;
            }

            if let Some(max_members) = *capacity {
                if plan.count(follow_up) >= max_members {
                    outcomes.push(skipped(LinkSkip::FollowUpFull {
                        member: member.name.clone(),
                        max_members,
                    }));
                    continue;
                }
            }

            available.remove(pos);
            plan.assign(member, follow_up, true);
            outcomes.push(LinkOutcome::Assigned {
                member: member.name.clone(),
                trigger: trigger.clone(),
                follow_up: follow_up.clone(),
            });
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, ShiftDefinition};
    use chrono::{NaiveDate, NaiveTime};

    fn catalog() -> ShiftCatalog {
        let t = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let shift = |id: i64, name: &str, min: u32, max: u32, is_default: bool| ShiftDefinition {
            id,
            name: name.to_string(),
            start_time: t,
            end_time: t,
            min_members: min,
            max_members: max,
            is_default,
        };
        ShiftCatalog::new(vec![
            shift(1, "Day", 1, 5, true),
            shift(2, "Night", 1, 1, false),
            shift(3, "Night Off", 0, 1, false),
            shift(4, "Late", 0, 1, false),
        ])
        .unwrap()
    }

    fn roster() -> Vec<Member> {
        vec![
            Member {
                id: 1,
                name: "a".to_string(),
                role: Role::Admin,
            },
            Member {
                id: 2,
                name: "b".to_string(),
                role: Role::Standard,
            },
            Member {
                id: 3,
                name: "c".to_string(),
                role: Role::NightExempt,
            },
        ]
    }

    fn config() -> RotaConfig {
        RotaConfig {
            linked_shifts: vec![("Night".to_string(), "Night Off".to_string())],
            exemptions: vec![(Role::NightExempt, vec!["Night Off".to_string()])],
            ..RotaConfig::default()
        }
    }

    fn week(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
    }

    #[test]
    fn test_unknown_or_self_links_rejected() {
        let catalog = catalog();
        let unknown = RotaConfig {
            linked_shifts: vec![("Night".to_string(), "Rest".to_string())],
            ..RotaConfig::default()
        };
        assert!(matches!(
            LinkedShiftResolver::from_config(&unknown, &catalog),
            Err(RotaError::Configuration(_))
        ));

        let self_link = RotaConfig {
            linked_shifts: vec![("Night".to_string(), "Night".to_string())],
            ..RotaConfig::default()
        };
        assert!(matches!(
            LinkedShiftResolver::from_config(&self_link, &catalog),
            Err(RotaError::Configuration(_))
        ));
    }

    #[test]
    fn test_singleton_is_pre_assigned_follow_up() {
        let catalog = catalog();
        let config = config();
        let roster = roster();
        let resolver = LinkedShiftResolver::from_config(&config, &catalog).unwrap();
        let exemptions = ExemptionPolicy::from_config(&config, &catalog).unwrap();

        let mut last_week = WeekPlan::new(week(1));
        last_week.assign(&roster[1], "Night", false);
        last_week.assign(&roster[0], "Day", false);
        let memory = resolver.remember(&last_week);
        assert_eq!(memory.get("Night"), Some(&2));

        let mut available: Vec<&Member> = roster.iter().collect();
        let mut plan = WeekPlan::new(week(8));
        let outcomes =
            resolver.pre_assign(&memory, &mut available, &mut plan, &exemptions, &roster);

        assert_eq!(
            outcomes,
            vec![LinkOutcome::Assigned {
                member: "b".to_string(),
                trigger: "Night".to_string(),
                follow_up: "Night Off".to_string(),
            }]
        );
        assert_eq!(plan.shift_of(2), Some("Night Off"));
        assert!(plan.placements[0].linked);
        assert!(available.iter().all(|m| m.id != 2));
    }

    #[test]
    fn test_absent_or_exempt_assignee_is_skipped() {
        let catalog = catalog();
        let config = config();
        let roster = roster();
        let resolver = LinkedShiftResolver::from_config(&config, &catalog).unwrap();
        let exemptions = ExemptionPolicy::from_config(&config, &catalog).unwrap();

        // b on leave this week
        let memory: LinkageMemory = [("Night".to_string(), 2)].into_iter().collect();
        let mut available: Vec<&Member> = vec![&roster[0], &roster[2]];
        let mut plan = WeekPlan::new(week(8));
        let outcomes =
            resolver.pre_assign(&memory, &mut available, &mut plan, &exemptions, &roster);
        assert!(matches!(
            &outcomes[0],
            LinkOutcome::Skipped { reason: LinkSkip::Unavailable { member }, .. } if member == "b"
        ));
        assert!(plan.is_empty());

        // c is exempt from Night Off
        let memory: LinkageMemory = [("Night".to_string(), 3)].into_iter().collect();
        let mut available: Vec<&Member> = roster.iter().collect();
        let mut plan = WeekPlan::new(week(8));
        let outcomes =
            resolver.pre_assign(&memory, &mut available, &mut plan, &exemptions, &roster);
        assert!(matches!(
            &outcomes[0],
            LinkOutcome::Skipped { reason: LinkSkip::Exempt { .. }, .. }
        ));
        assert_eq!(available.len(), 3);
    }

    #[test]
    fn test_no_singleton_last_week() {
        let catalog = catalog();
        let config = config();
        let roster = roster();
        let resolver = LinkedShiftResolver::from_config(&config, &catalog).unwrap();
        let exemptions = ExemptionPolicy::from_config(&config, &catalog).unwrap();

        let mut last_week = WeekPlan::new(week(1));
        last_week.assign(&roster[1], "Night", false);
        last_week.assign(&roster[2], "Night", false);
        let memory = resolver.remember(&last_week);
        assert!(memory.is_empty());

        let mut available: Vec<&Member> = roster.iter().collect();
        let mut plan = WeekPlan::new(week(8));
        let outcomes =
            resolver.pre_assign(&memory, &mut available, &mut plan, &exemptions, &roster);
        assert!(matches!(
            &outcomes[0],
            LinkOutcome::Skipped { reason: LinkSkip::NoSingleton, .. }
        ));
    }

    #[test]
    fn test_pairs_run_in_listed_order() {
        let catalog = catalog();
        let config = RotaConfig {
            linked_shifts: vec![
                ("Night".to_string(), "Night Off".to_string()),
                ("Night".to_string(), "Late".to_string()),
            ],
            ..RotaConfig::default()
        };
        let roster = roster();
        let resolver = LinkedShiftResolver::from_config(&config, &catalog).unwrap();
        let exemptions = ExemptionPolicy::from_config(&config, &catalog).unwrap();

        let memory: LinkageMemory = [("Night".to_string(), 2)].into_iter().collect();
        let mut available: Vec<&Member> = roster.iter().collect();
        let mut plan = WeekPlan::new(week(8));
        let outcomes =
            resolver.pre_assign(&memory, &mut available, &mut plan, &exemptions, &roster);

        assert!(matches!(
            &outcomes[0],
            LinkOutcome::Assigned { member, follow_up, .. }
                if member == "b" && follow_up == "Night Off"
        ));
        assert_eq!(
            outcomes[1],
            LinkOutcome::Skipped {
                trigger: "Night".to_string(),
                follow_up: "Late".to_string(),
                reason: LinkSkip::AlreadyAssigned {
                    member: "b".to_string(),
                    shift: "Night Off".to_string(),
                },
            }
        );
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_shared_follow_up_stops_at_max_members() {
        let catalog = catalog();
        let config = RotaConfig {
            linked_shifts: vec![
                ("Night".to_string(), "Night Off".to_string()),
                ("Late".to_string(), "Night Off".to_string()),
            ],
            ..RotaConfig::default()
        };
        let roster = roster();
        let resolver = LinkedShiftResolver::from_config(&config, &catalog).unwrap();
        let exemptions = ExemptionPolicy::from_config(&config, &catalog).unwrap();

        let memory: LinkageMemory = [("Night".to_string(), 2), ("Late".to_string(), 1)]
            .into_iter()
            .collect();
        let mut available: Vec<&Member> = roster.iter().collect();
        let mut plan = WeekPlan::new(week(8));
        let outcomes =
            resolver.pre_assign(&memory, &mut available, &mut plan, &exemptions, &roster);

        assert_eq!(plan.count("Night Off"), 1);
        assert_eq!(plan.shift_of(2), Some("Night Off"));
        assert!(matches!(
            &outcomes[1],
            LinkOutcome::Skipped {
                reason: LinkSkip::FollowUpFull { member, max_members: 1 },
                ..
            } if member == "a"
        ));
        assert!(available.iter().any(|m| m.id == 1));
    }
}
