//! Post-hoc KPI computation from a simulation outcome.

use std::fmt;

use serde::Serialize;

use super::types::SimulationOutcome;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from the [`SimulationOutcome`] so reported figures
/// always agree with the step data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    /// Lowest tank level (m).
    pub min_level_m: f64,
    /// Highest tank level (m).
    pub max_level_m: f64,
    /// Level at the last grid point (m).
    pub terminal_level_m: f64,
    /// Terminal minus initial level (m).
    pub level_drift_m: f64,
    /// Volume delivered by the pump (m³).
    pub pumped_volume_m3: f64,
    /// Electrical energy drawn (kWh).
    pub energy_kwh: f64,
    /// Time the pump was scheduled ON over the simulated steps (h). Step 0
    /// carries no flow and is not counted.
    pub pump_on_hours: f64,
    /// Energy cost without the violation penalty.
    pub energy_cost: f64,
    /// Violation penalty.
    pub penalty: f64,
    /// Terminal cumulative cost, penalty included.
    pub total_cost: f64,
    /// Whole hours with an out-of-band level.
    pub violation_hours: Vec<u32>,
}

impl KpiReport {
    /// Computes all KPIs from a completed run.
    ///
    /// # Arguments
    ///
    /// * `outcome` - Simulation outcome
    /// * `dt_hours` - Step size in hours
    pub fn from_outcome(outcome: &SimulationOutcome, dt_hours: f64) -> Self {
        let series = &outcome.series;
        let initial = series.initial_level().unwrap_or(0.0);
        let terminal = series.terminal_level().unwrap_or(initial);
        let total_cost = series.terminal_cost().unwrap_or(outcome.penalty);

        let pumped_volume_m3 = series.flow.iter().map(|q| q * dt_hours).sum();
        let energy_kwh = series.power.iter().map(|p| p * dt_hours).sum();
        let on_steps = series.pump_on.iter().skip(1).filter(|&&on| on).count();

        Self {
            min_level_m: series.min_level().unwrap_or(initial),
            max_level_m: series.max_level().unwrap_or(initial),
            terminal_level_m: terminal,
            level_drift_m: terminal - initial,
            pumped_volume_m3,
            energy_kwh,
            pump_on_hours: on_steps as f64 * dt_hours,
            energy_cost: total_cost - outcome.penalty,
            penalty: outcome.penalty,
            total_cost,
            violation_hours: outcome.violations.hours(),
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(
            f,
            "Level range:           {:.2} m .. {:.2} m (final {:.2} m, drift {:+.3} m)",
            self.min_level_m, self.max_level_m, self.terminal_level_m, self.level_drift_m
        )?;
        writeln!(f, "Pumped volume:         {:.1} m³", self.pumped_volume_m3)?;
        writeln!(
            f,
            "Energy:                {:.1} kWh over {:.2} h",
            self.energy_kwh, self.pump_on_hours
        )?;
        writeln!(f, "Energy cost:           €{:.2}", self.energy_cost)?;
        writeln!(
            f,
            "Penalty:               €{:.2} (hours {:?})",
            self.penalty, self.violation_hours
        )?;
        write!(f, "Total cost:            €{:.2}", self.total_cost)
    }
}
