use std::fmt;

use serde::Serialize;

use crate::error::SimulationError;

/// One contiguous pump ON interval `[start, start + duration)`, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PumpCycle {
    pub start: f64,
    pub duration: f64,
}

impl PumpCycle {
    pub const fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Returns `true` when `t` falls within the cycle.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.start + self.duration
    }
}

impl fmt::Display for PumpCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5.2}h → {:>5.2}h ({:.2}h)", self.start, self.end(), self.duration)
    }
}

/// Candidate pump schedule of `N` cycles.
///
/// Cycles may overlap; the pump is ON whenever any cycle covers the
/// instant and overlapping cycles do not add flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    cycles: Vec<PumpCycle>,
}

impl Schedule {
    pub fn new(cycles: Vec<PumpCycle>) -> Self {
        Self { cycles }
    }

    /// Decodes a raw coordinate vector of length `2N`: the first `N`
    /// entries are start times, the last `N` durations.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidSchedule` for an empty or odd-length
    /// vector, and `SimulationError::NonFinite` for NaN or infinite entries.
    pub fn from_coordinates(x: &[f64]) -> Result<Self, SimulationError> {
        if x.is_empty() || x.len() % 2 != 0 {
            return Err(SimulationError::InvalidSchedule(format!(
                "expected a non-empty vector of even length, got {}",
                x.len()
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(SimulationError::NonFinite {
                step: 0,
                quantity: "schedule",
            });
        }
        let n = x.len() / 2;
        let (starts, durations) = x.split_at(n);
        let cycles = starts
            .iter()
            .zip(durations)
            .map(|(&start, &duration)| PumpCycle::new(start, duration))
            .collect();
        Ok(Self { cycles })
    }

    /// Encodes back into the `2N` layout of [`Schedule::from_coordinates`].
    pub fn to_coordinates(&self) -> Vec<f64> {
        self.cycles
            .iter()
            .map(|c| c.start)
            .chain(self.cycles.iter().map(|c| c.duration))
            .collect()
    }

    pub fn cycles(&self) -> &[PumpCycle] {
        &self.cycles
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Returns `true` when any cycle covers `t`.
    pub fn is_on(&self, t: f64) -> bool {
        self.cycles.iter().any(|c| c.contains(t))
    }

    /// Cycles in wall-clock order of their start times.
    pub fn chronological(&self) -> Vec<PumpCycle> {
        let mut cycles = self.cycles.clone();
        cycles.sort_by(|a, b| a.start.total_cmp(&b.start));
        cycles
    }
}
