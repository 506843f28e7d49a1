//! A single week's assignments while it is being built.

use chrono::NaiveDate;

use crate::models::Member;

/// One member placed on one shift.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement<'m> {
    pub member: &'m Member,
    pub shift: String,
    /// Placed by the linked-shift mandate rather than fairness ranking
    pub linked: bool,
}

/// The assignments of one week, in the order they were made.
#[derive(Clone, Debug)]
pub struct WeekPlan<'m> {
    pub week_start: NaiveDate,
    pub placements: Vec<Placement<'m>>,
}

impl<'m> WeekPlan<'m> {
    pub fn new(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            placements: Vec::new(),
        }
    }

    pub fn assign(&mut self, member: &'m Member, shift: &str, linked: bool) {
        self.placements.push(Placement {
            member,
            shift: shift.to_string(),
            linked,
        });
    }

    pub fn shift_of(&self, member_id: i64) -> Option<&str> {
        self.placements
            .iter()
            .find(|p| p.member.id == member_id)
            .map(|p| p.shift.as_str())
    }

    pub fn count(&self, shift: &str) -> u32 {
        self.placements.iter().filter(|p| p.shift == shift).count() as u32
    }

    /// Members on `shift`, sorted by name.
    pub fn members_on(&self, shift: &str) -> Vec<&'m Member> {
        let mut members: Vec<&'m Member> = self
            .placements
            .iter()
            .filter(|p| p.shift == shift)
            .map(|p| p.member)
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }

    /// The sole assignee of `shift`, if exactly one member holds it.
    pub fn singleton(&self, shift: &str) -> Option<&'m Member> {
        match self.members_on(shift).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn member(id: i64, name: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
            role: Role::Standard,
        }
    }

    #[test]
    fn test_singleton_requires_exactly_one() {
        let a = member(1, "a");
        let b = member(2, "b");
        let c = member(3, "c");
        let mut plan = WeekPlan::new(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());

        plan.assign(&a, "Night", false);
        plan.assign(&c, "Day", false);
        plan.assign(&b, "Day", false);

        assert_eq!(plan.singleton("Night").map(|m| m.id), Some(1));
        assert!(plan.singleton("Day").is_none());
        assert!(plan.singleton("Evening").is_none());

        let day: Vec<&str> = plan.members_on("Day").iter().map(|m| m.name.as_str()).collect();
        assert_eq!(day, vec!["b", "c"]);
        assert_eq!(plan.count("Day"), 2);
        assert_eq!(plan.shift_of(3), Some("Day"));
        assert_eq!(plan.shift_of(9), None);
    }
}
