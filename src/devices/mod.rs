//! Physical plant components driving the tank balance.

/// Consumer demand curves.
pub mod demand;
/// Pump and delivery pipe hydraulics.
pub mod pump;

pub use demand::{DemandModel, DemandScenario};
pub use pump::{HydraulicModel, OperatingPoint};
