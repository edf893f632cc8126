//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use pump_sim::config::SimulationConfig;
use pump_sim::devices::DemandScenario;
use pump_sim::sim::{PumpCycle, Schedule, Simulator};

/// Reference plant (0–9 m tank, 15-minute steps, reference tariff).
pub fn baseline_config() -> SimulationConfig {
    SimulationConfig::baseline()
}

/// Simulator for the reference plant under `scenario`.
pub fn simulator(scenario: DemandScenario) -> Simulator {
    Simulator::new(&baseline_config(), scenario)
}

/// Night and afternoon cycles that roughly balance a high-demand day.
pub fn two_cycle_schedule() -> Schedule {
    Schedule::new(vec![PumpCycle::new(1.0, 5.5), PumpCycle::new(13.0, 4.0)])
}

/// Three non-overlapping cycles given in non-chronological order.
pub fn three_cycle_schedule() -> Schedule {
    Schedule::new(vec![
        PumpCycle::new(17.0, 2.0),
        PumpCycle::new(2.0, 4.0),
        PumpCycle::new(10.0, 3.0),
    ])
}

/// Path of a scenario file shipped with the crate.
pub fn scenario_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}
