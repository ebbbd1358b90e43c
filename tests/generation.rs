//! End-to-end generation against synthetic tables.

mod common;

use occupant_schedules::activity::STATE_COUNT;
use occupant_schedules::calendar::Calendar;
use occupant_schedules::schedule::{ScheduleColumn, ScheduleSet};
use occupant_schedules::simulation::{OccupantActivitySimulator, ScheduleGenerator};
use occupant_schedules::rng::ScheduleRng;
use rstest::rstest;
use strum::IntoEnumIterator;

fn generate(occupants: usize, minutes_per_step: usize) -> ScheduleSet {
    let store = common::store();
    ScheduleGenerator::new(&store, common::settings(occupants, minutes_per_step))
        .unwrap()
        .generate()
        .unwrap()
}

#[test]
fn test_same_seed_is_bit_identical() {
    let first = generate(3, 15);
    let second = generate(3, 15);
    assert_eq!(first, second);

    let store = common::store();
    let mut other = common::settings(3, 15);
    other.building_id = 2;
    let third = ScheduleGenerator::new(&store, other).unwrap().generate().unwrap();
    assert_ne!(
        first.column(ScheduleColumn::Occupants).unwrap(),
        third.column(ScheduleColumn::Occupants).unwrap()
    );
}

#[test]
fn test_three_occupant_hourly_year() {
    let set = generate(3, 60);
    assert_eq!(set.calendar().total_steps(), 8760);

    // 23.6% of the time away gives roughly 6690 occupied full-load hours
    let hours = set.full_load_hours(ScheduleColumn::Occupants).unwrap();
    assert!((hours - 6689.0).abs() < 669.0, "occupants full-load hours {hours}");

    let sleep = set.full_load_hours(ScheduleColumn::Sleep).unwrap();
    assert!((sleep - 8760.0 * 0.30).abs() < 263.0, "sleep full-load hours {sleep}");
}

#[rstest]
#[case(1)]
#[case(10)]
#[case(15)]
#[case(30)]
#[case(60)]
fn test_every_permitted_resolution(#[case] minutes_per_step: usize) {
    let set = generate(2, minutes_per_step);
    let steps = 8760 * 60 / minutes_per_step;

    assert_eq!(set.len(), ScheduleColumn::iter().count());
    for (column, values) in set.columns() {
        assert_eq!(values.len(), steps, "{column}");
        assert!(values.iter().all(|v| v.is_finite() && *v >= 0.0), "{column}");
    }
    set.validate().unwrap();

    for column in ScheduleColumn::iter().filter(|c| c.is_max_normalized()) {
        let max = set.column(column).unwrap().iter().cloned().fold(0.0, f64::max);
        assert_eq!(max, 1.0, "{column}");
    }
}

#[test]
fn test_water_totals_do_not_depend_on_resolution() {
    let hourly = generate(2, 60);
    let fine = generate(2, 5);
    for column in ScheduleColumn::iter().filter(|c| c.is_water() || c.is_power()) {
        let coarse: f64 = hourly.column(column).unwrap().iter().sum();
        let detailed: f64 = fine.column(column).unwrap().iter().sum();
        assert!((coarse - detailed).abs() < 1e-6 * coarse.max(1.0), "{column}");
    }
}

#[test]
fn test_leap_year_has_8784_hours() {
    let store = common::store();
    let mut settings = common::settings(1, 60);
    settings.year = 2012;
    let set = ScheduleGenerator::new(&store, settings).unwrap().generate().unwrap();
    assert_eq!(set.column(ScheduleColumn::Occupants).unwrap().len(), 8784);
}

#[test]
fn test_sleepers_are_home() {
    let set = generate(4, 30);
    let occupants = set.column(ScheduleColumn::Occupants).unwrap();
    let sleep = set.column(ScheduleColumn::Sleep).unwrap();
    for (present, asleep) in occupants.iter().zip(sleep) {
        assert!(asleep <= present, "{asleep} asleep but only {present} home");
    }
}

#[test]
fn test_chains_are_one_hot() {
    let store = common::store();
    let calendar = Calendar::new(2007, 60).unwrap();
    let mut rng = ScheduleRng::for_building(9);
    let household = OccupantActivitySimulator::new(&store, calendar)
        .simulate_household(3, &mut rng)
        .unwrap();

    assert_eq!(household.occupant_count(), 3);
    for chain in household.chains() {
        assert_eq!(chain.len(), calendar.chain_steps());
        for step in 0..chain.len() {
            let indicators = chain.indicators(step).unwrap();
            assert_eq!(indicators.len(), STATE_COUNT);
            assert_eq!(indicators.iter().map(|v| *v as usize).sum::<usize>(), 1);
        }
        assert!(chain.indicators(chain.len()).is_none());
    }
}

#[test]
fn test_empty_dwelling_has_no_events() {
    let set = generate(0, 60);
    for column in ScheduleColumn::iter().filter(|c| c.is_water() || c.is_power()) {
        assert!(set.column(column).unwrap().iter().all(|v| *v == 0.0), "{column}");
    }
    assert!(set.column(ScheduleColumn::Occupants).unwrap().iter().all(|v| *v == 0.0));
    assert!(set.column(ScheduleColumn::Sleep).unwrap().iter().all(|v| *v == 0.0));
    // exterior lighting does not depend on occupancy
    assert_eq!(
        set.column(ScheduleColumn::LightingExterior).unwrap(),
        generate(3, 60).column(ScheduleColumn::LightingExterior).unwrap()
    );
}

#[test]
fn test_csv_export_reads_back() {
    let set = generate(2, 30);
    let mut buffer = Vec::new();
    set.write_csv(&mut buffer).unwrap();

    let text = String::from_utf8(buffer.clone()).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("occupants,"));
    assert_eq!(text.lines().count(), 8760 * 2 + 1);

    let read = ScheduleSet::read_csv(buffer.as_slice(), 2007).unwrap();
    assert_eq!(read.calendar().minutes_per_step, 30);
    assert_eq!(read, set);
}
