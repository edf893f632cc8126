//! Escalating penalty for runs of out-of-band hours.

use std::collections::BTreeSet;

/// Whole hours during which the tank level left the violation band.
///
/// Each hour is recorded once, however many steps of that hour violated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationSet {
    hours: BTreeSet<u32>,
}

impl ViolationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the whole hour containing time `t` (h, >= 0).
    pub fn record(&mut self, t: f64) {
        self.hours.insert(t.max(0.0).floor() as u32);
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    /// Violated hours in ascending order.
    pub fn hours(&self) -> Vec<u32> {
        self.hours.iter().copied().collect()
    }

    /// Lengths of the maximal runs of consecutive hours, in ascending hour order.
    pub fn run_lengths(&self) -> Vec<usize> {
        let mut runs = Vec::new();
        let mut previous: Option<u32> = None;
        for &hour in &self.hours {
            match runs.last_mut() {
                Some(len) if previous.is_some_and(|p| hour == p + 1) => *len += 1,
                _ => runs.push(1),
            }
            previous = Some(hour);
        }
        runs
    }
}

impl FromIterator<u32> for ViolationSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            hours: iter.into_iter().collect(),
        }
    }
}

/// Converts a [`ViolationSet`] into an additive cost.
///
/// A run of `k` consecutive hours costs `base · (1 + 2 + … + k)`, so short
/// excursions stay cheap and sustained ones grow quadratically.
///
/// # Examples
///
/// ```
/// use pump_sim::sim::penalty::{PenaltyEngine, ViolationSet};
///
/// let engine = PenaltyEngine::new(5.0);
/// let hours: ViolationSet = [5, 6, 10].into_iter().collect();
/// assert_eq!(engine.penalty(&hours), 20.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyEngine {
    base: f64,
}

impl PenaltyEngine {
    pub const fn new(base: f64) -> Self {
        Self { base }
    }

    /// Total penalty over all runs.
    pub fn penalty(&self, violations: &ViolationSet) -> f64 {
        violations
            .run_lengths()
            .into_iter()
            .map(|k| self.run_penalty(k))
            .sum()
    }

    /// Penalty of a single run of `k` hours.
    pub fn run_penalty(&self, k: usize) -> f64 {
        let k = k as f64;
        self.base * k * (k + 1.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(hours: &[u32]) -> ViolationSet {
        hours.iter().copied().collect()
    }

    #[test]
    fn empty_set_costs_nothing() {
        assert_eq!(PenaltyEngine::new(5.0).penalty(&ViolationSet::new()), 0.0);
    }

    #[test]
    fn isolated_hour() {
        assert_eq!(PenaltyEngine::new(5.0).penalty(&set(&[5])), 5.0);
    }

    #[test]
    fn contiguous_run_escalates() {
        assert_eq!(PenaltyEngine::new(5.0).penalty(&set(&[5, 6, 7])), 30.0);
    }

    #[test]
    fn separated_runs_add_up() {
        assert_eq!(PenaltyEngine::new(5.0).penalty(&set(&[5, 6, 10])), 20.0);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let engine = PenaltyEngine::new(5.0);
        assert_eq!(
            engine.penalty(&set(&[10, 6, 5])),
            engine.penalty(&set(&[5, 6, 10]))
        );
    }

    #[test]
    fn run_lengths_break_on_gaps() {
        assert_eq!(set(&[0, 1, 2, 4, 7, 8]).run_lengths(), vec![3, 1, 2]);
    }

    #[test]
    fn record_floors_to_whole_hours() {
        let mut violations = ViolationSet::new();
        violations.record(3.0);
        violations.record(3.25);
        violations.record(3.75);
        violations.record(4.0);
        assert_eq!(violations.hours(), vec![3, 4]);
    }
}
