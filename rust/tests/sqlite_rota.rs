//! End-to-end generation against the SQLite store.

use chrono::{NaiveDate, NaiveTime};
use rota_engine::id::SeededIdAllocator;
use rota_engine::{
    generate_period_rota, rota_table, shift_distribution, AbsenceInterval, GenerationContext,
    GenerationPhase, Member, Role, RotaConfig, RotaError, RotaStore, ShiftDefinition, SqliteStore,
};

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn t(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

fn shift(id: i64, name: &str, start: u32, min: u32, max: u32, is_default: bool) -> ShiftDefinition {
    ShiftDefinition {
        id,
        name: name.to_string(),
        start_time: t(start),
        end_time: t((start + 8) % 24),
        min_members: min,
        max_members: max,
        is_default,
    }
}

/// Six members (one admin), Day / Evening / Night / Night Off.
fn ward() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let roster = [
        (1, "Alice", Role::Admin),
        (2, "Bob", Role::Standard),
        (3, "Carol", Role::Standard),
        (4, "Dan", Role::NightExempt),
        (5, "Erin", Role::Standard),
        (6, "Frank", Role::EveningExempt),
    ];
    for (id, name, role) in roster {
        store
            .add_member(&Member {
                id,
                name: name.to_string(),
                role,
            })
            .unwrap();
    }
    store.add_shift(&shift(10, "Day", 8, 1, 6, true)).unwrap();
    store.add_shift(&shift(20, "Evening", 14, 1, 2, false)).unwrap();
    store.add_shift(&shift(30, "Night", 22, 1, 1, false)).unwrap();
    store.add_shift(&shift(40, "Night Off", 0, 0, 1, false)).unwrap();
    store
}

fn ward_config() -> RotaConfig {
    RotaConfig {
        exemptions: vec![
            (
                Role::Admin,
                vec!["Evening".into(), "Night".into(), "Night Off".into()],
            ),
            (Role::NightExempt, vec!["Night".into(), "Night Off".into()]),
            (Role::EveningExempt, vec!["Evening".into()]),
        ],
        linked_shifts: vec![("Night".into(), "Night Off".into())],
        min_rotating_members: 4,
        ..RotaConfig::default()
    }
}

#[test]
fn test_generated_period_respects_every_rule() {
    let mut store = ward();
    let config = ward_config();
    let mut ctx = GenerationContext::sequential();

    let period_id = generate_period_rota(&mut store, d(2025, 9, 1), 6, &config, &mut ctx).unwrap();
    assert_eq!(ctx.phase(), GenerationPhase::Committed);

    let table = rota_table(&store, period_id).unwrap();
    assert_eq!(table.columns, vec!["Night Off", "Day", "Evening", "Night"]);
    assert_eq!(table.rows.len(), 6);

    for (i, row) in table.rows.iter().enumerate() {
        let on = |shift: &str| table.cell(row.week_start, shift).unwrap().to_vec();

        // Everyone placed exactly once
        let mut placed: Vec<String> = row.cells.iter().flatten().cloned().collect();
        placed.sort();
        assert_eq!(placed, vec!["Alice", "Bob", "Carol", "Dan", "Erin", "Frank"]);

        assert_eq!(on("Night").len(), 1);
        assert_eq!(on("Evening").len(), 1);
        assert!(on("Day").contains(&"Alice".to_string()));
        assert!(!on("Night").contains(&"Dan".to_string()));
        assert!(!on("Evening").contains(&"Frank".to_string()));

        if i > 0 {
            let previous_night = table.rows[i - 1].cells[3].clone();
            assert_eq!(on("Night Off"), previous_night);
        }
    }

    // Four members share the special shifts
    let distribution = shift_distribution(&store, period_id).unwrap();
    assert_eq!(distribution.len(), 6);
    let alice = &distribution[0];
    assert_eq!(alice.member, "Alice");
    assert_eq!(alice.total_special, 0);
    let specials: u32 = distribution.iter().map(|m| m.total_special).sum();
    // Night + Evening every week, Night Off from week 2
    assert_eq!(specials, 6 + 6 + 5);
}

#[test]
fn test_generation_is_deterministic() {
    let config = ward_config();
    let mut first = ward();
    let mut second = ward();

    let a = generate_period_rota(
        &mut first,
        d(2025, 9, 1),
        4,
        &config,
        &mut GenerationContext::sequential(),
    )
    .unwrap();
    let b = generate_period_rota(
        &mut second,
        d(2025, 9, 1),
        4,
        &config,
        &mut GenerationContext::sequential(),
    )
    .unwrap();

    assert_eq!(first.assignments(a).unwrap(), second.assignments(b).unwrap());
}

#[test]
fn test_infeasible_period_writes_nothing() {
    let mut store = ward();
    // Only Alice (admin) and Dan (night exempt) left in week 3
    for (id, member_id) in [(1, 2), (2, 3), (3, 5), (4, 6)] {
        store
            .add_absence(&AbsenceInterval {
                id,
                member_id,
                start_date: d(2025, 9, 16),
                end_date: d(2025, 9, 17),
            })
            .unwrap();
    }

    let mut ctx = GenerationContext::sequential();
    let err = generate_period_rota(&mut store, d(2025, 9, 1), 4, &ward_config(), &mut ctx)
        .unwrap_err();

    assert!(matches!(err, RotaError::InfeasibleWeek { .. }));
    assert_eq!(err.week_start(), Some(d(2025, 9, 15)));
    assert_eq!(ctx.phase(), GenerationPhase::Aborted);
    assert!(store.periods().unwrap().is_empty());
}

#[test]
fn test_seeded_ids_and_delete() {
    let mut store = ward();
    let mut ctx = GenerationContext::seeded(2025);

    let period_id =
        generate_period_rota(&mut store, d(2025, 9, 1), 2, &ward_config(), &mut ctx).unwrap();
    assert!((SeededIdAllocator::MIN_ID..=SeededIdAllocator::MAX_ID).contains(&period_id));
    assert_eq!(store.assignments(period_id).unwrap().len(), 12);

    assert!(store.delete_period(period_id).unwrap());
    assert!(store.assignments(period_id).unwrap().is_empty());
    assert!(!store.delete_period(period_id).unwrap());
}

#[test]
fn test_too_few_rotating_members_is_rejected() {
    let mut store = ward();
    let config = RotaConfig {
        min_rotating_members: 6,
        ..ward_config()
    };

    let err = generate_period_rota(
        &mut store,
        d(2025, 9, 1),
        2,
        &config,
        &mut GenerationContext::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RotaError::Configuration(_)));
}
