//! Human- and machine-readable summaries of accepted solutions.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::driver::Solution;
use crate::sim::PumpCycle;

/// Summary of one accepted solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionReport {
    /// Demand scenario label (`high` or `low`).
    pub scenario: String,
    /// Number of pump cycles searched for.
    pub n_cycles: usize,
    /// Decoded cycles sorted by start time.
    pub cycles: Vec<PumpCycle>,
    /// Objective value of the optimum.
    pub score: f64,
    /// Terminal cumulative cost, penalty included.
    pub terminal_cost: f64,
    pub penalty: f64,
    pub violation_hours: Vec<u32>,
    pub min_level_m: f64,
    pub max_level_m: f64,
    pub terminal_level_m: f64,
    pub pumped_volume_m3: f64,
    pub energy_kwh: f64,
    pub pump_on_hours: f64,
}

impl SolutionReport {
    pub fn from_solution(solution: &Solution) -> Self {
        let kpi = &solution.kpi;
        Self {
            scenario: solution.scenario.label().to_string(),
            n_cycles: solution.cycles,
            cycles: solution.schedule.chronological(),
            score: solution.score,
            terminal_cost: kpi.total_cost,
            penalty: kpi.penalty,
            violation_hours: kpi.violation_hours.clone(),
            min_level_m: kpi.min_level_m,
            max_level_m: kpi.max_level_m,
            terminal_level_m: kpi.terminal_level_m,
            pumped_volume_m3: kpi.pumped_volume_m3,
            energy_kwh: kpi.energy_kwh,
            pump_on_hours: kpi.pump_on_hours,
        }
    }
}

impl fmt::Display for SolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- Solution: {} demand, {} cycles ---",
            self.scenario, self.n_cycles
        )?;
        for (i, cycle) in self.cycles.iter().enumerate() {
            writeln!(f, "Cycle {}:               {cycle}", i + 1)?;
        }
        writeln!(f, "Terminal cost:         €{:.2}", self.terminal_cost)?;
        writeln!(
            f,
            "Penalty:               €{:.2} (hours {:?})",
            self.penalty, self.violation_hours
        )?;
        writeln!(
            f,
            "Level:                 min {:.2} m, max {:.2} m, final {:.2} m",
            self.min_level_m, self.max_level_m, self.terminal_level_m
        )?;
        write!(
            f,
            "Pumped:                {:.1} m³, {:.1} kWh over {:.2} h",
            self.pumped_volume_m3, self.energy_kwh, self.pump_on_hours
        )
    }
}

/// Writes reports as a pretty-printed JSON array to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_json(reports: &[SolutionReport], mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, reports)?;
    writeln!(writer)?;
    writer.flush()
}

/// Exports reports as a JSON file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_json(reports: &[SolutionReport], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_json(reports, io::BufWriter::new(file))
}
