/// Discrete simulation time grid.
pub mod clock;
pub mod engine;
pub mod kpi;
/// Level-violation penalty.
pub mod penalty;
/// Pump cycle schedules.
pub mod schedule;
pub mod types;

pub use engine::Simulator;
pub use schedule::{PumpCycle, Schedule};
pub use types::{SimulationOutcome, TimeSeries};
