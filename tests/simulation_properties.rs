mod common;

use approx::assert_relative_eq;
use pump_sim::config::SimulationConfig;
use pump_sim::devices::{DemandScenario, HydraulicModel};
use pump_sim::objective::ObjectiveFunction;
use pump_sim::sim::penalty::{PenaltyEngine, ViolationSet};
use pump_sim::sim::{PumpCycle, Schedule};
use pump_sim::tariff::TariffSchedule;

#[test]
fn initial_level_is_seeded_for_every_scenario() {
    for scenario in DemandScenario::ALL {
        let sim = common::simulator(scenario);
        for schedule in [common::two_cycle_schedule(), common::three_cycle_schedule()] {
            let outcome = sim
                .run(&schedule)
                .unwrap_or_else(|e| panic!("{scenario} schedule should simulate: {e}"));
            assert_eq!(outcome.series.level[0], 4.0);
        }
    }
}

#[test]
fn tariff_round_trips_anchors_and_stays_between_neighbours() {
    let tariff = TariffSchedule::from_config(&common::baseline_config().tariff);
    for window in tariff.anchors().windows(2) {
        let (h0, p0) = window[0];
        let (h1, p1) = window[1];
        assert_eq!(tariff.price_at(h0), p0);
        assert_eq!(tariff.price_at(h1), p1);
        for k in 1..10 {
            let t = h0 + (h1 - h0) * f64::from(k) / 10.0;
            let price = tariff.price_at(t);
            assert!(price >= p0.min(p1) - 1e-15 && price <= p0.max(p1) + 1e-15);
        }
    }
}

#[test]
fn penalty_reference_cases() {
    let engine = PenaltyEngine::new(5.0);
    let cases: [(&[u32], f64); 4] = [
        (&[], 0.0),
        (&[5], 5.0),
        (&[5, 6, 7], 30.0),
        (&[5, 6, 10], 20.0),
    ];
    for (hours, expected) in cases {
        let set: ViolationSet = hours.iter().copied().collect();
        assert_eq!(engine.penalty(&set), expected, "hours {hours:?}");
    }
}

#[test]
fn idle_pump_draws_nothing_at_any_level() {
    let config = SimulationConfig::baseline();
    let model = HydraulicModel::new(&config.pump, &config.pipe);
    for level in [-5.0, 0.0, 4.0, 9.0, 300.0] {
        let point = model.operating_point(level, false);
        assert_eq!(point.flow_m3h, 0.0);
        assert_eq!(point.power_kw, 0.0);
    }
}

#[test]
fn cycle_order_does_not_change_the_series() {
    let sim = common::simulator(DemandScenario::Low);
    let shuffled = common::three_cycle_schedule();
    let sorted = Schedule::new(shuffled.chronological());
    let a = sim.run(&shuffled).map(|o| o.series);
    let b = sim.run(&sorted).map(|o| o.series);
    assert!(a.is_ok());
    assert_eq!(a, b);
}

#[test]
fn overlapping_cycles_equal_their_union() {
    let sim = common::simulator(DemandScenario::High);
    let overlapping = Schedule::new(vec![PumpCycle::new(3.0, 4.0), PumpCycle::new(5.0, 3.0)]);
    let union = Schedule::new(vec![PumpCycle::new(3.0, 5.0)]);
    assert_eq!(
        sim.run(&overlapping).map(|o| o.series),
        sim.run(&union).map(|o| o.series)
    );
}

#[test]
fn objective_adds_quadratic_terms_to_terminal_cost() {
    let config = common::baseline_config();
    let objective = ObjectiveFunction::new(&config, DemandScenario::High, 2);
    let x = common::two_cycle_schedule().to_coordinates();
    let outcome = objective.simulate(&x).expect("schedule should simulate");
    let series = &outcome.series;
    let first = series.level[0];
    let last = series.level[series.len() - 1];
    let min = series.level.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.level.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut expected = series.cost[series.len() - 1] + 1000.0 * (last - first).powi(2);
    if min < 0.0 {
        expected += 1000.0 * min.powi(2);
    }
    if max > 9.0 {
        expected += 1000.0 * (max - 9.0).powi(2);
    }
    assert_relative_eq!(objective.score(&x), expected, max_relative = 1e-12);
}

#[test]
fn failed_simulation_scores_worst() {
    let mut config = common::baseline_config();
    config.tank.initial_level = f64::NAN;
    let objective = ObjectiveFunction::new(&config, DemandScenario::High, 2);
    let x = common::two_cycle_schedule().to_coordinates();
    assert_eq!(objective.score(&x), f64::INFINITY);
}

#[test]
fn reruns_are_bit_identical() {
    for scenario in DemandScenario::ALL {
        let sim = common::simulator(scenario);
        let schedule = common::three_cycle_schedule();
        let a = sim.run(&schedule);
        let b = sim.run(&schedule);
        assert_eq!(a, b, "{scenario}");
    }
}

#[test]
fn legacy_band_penalizes_more_hours_than_tank_bounds() {
    let schedule = Schedule::new(vec![PumpCycle::new(0.0, 2.0)]);
    let baseline = pump_sim::sim::Simulator::new(&SimulationConfig::baseline(), DemandScenario::High);
    let legacy =
        pump_sim::sim::Simulator::new(&SimulationConfig::legacy_band(), DemandScenario::High);
    let (Ok(a), Ok(b)) = (baseline.run(&schedule), legacy.run(&schedule)) else {
        panic!("schedule should simulate under both bands");
    };
    assert!(b.violations.len() > a.violations.len());
    assert!(b.penalty > a.penalty);
}
