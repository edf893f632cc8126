//! Simulation output: the per-step time series and its penalty breakdown.

use std::fmt;

use super::penalty::ViolationSet;

/// Column-oriented record of one simulation pass, indexed by step.
///
/// `level[0]` is the configured initial level. Every later entry is derived
/// from its predecessor only. `cost` already includes the violation
/// penalty, added uniformly to all entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    /// Grid time of each step (h).
    pub time: Vec<f64>,
    /// Whether any pump cycle covers the step.
    pub pump_on: Vec<bool>,
    /// Tank level after the step (m).
    pub level: Vec<f64>,
    /// Pump flow during the step (m³/h).
    pub flow: Vec<f64>,
    /// Electrical power during the step (kW).
    pub power: Vec<f64>,
    /// Energy price applied to the step.
    pub tariff: Vec<f64>,
    /// Cumulative cost up to and including the step, penalty-inclusive.
    pub cost: Vec<f64>,
}

impl TimeSeries {
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            time: Vec::with_capacity(steps),
            pump_on: Vec::with_capacity(steps),
            level: Vec::with_capacity(steps),
            flow: Vec::with_capacity(steps),
            power: Vec::with_capacity(steps),
            tariff: Vec::with_capacity(steps),
            cost: Vec::with_capacity(steps),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub(crate) fn push(&mut self, record: StepRecord) {
        self.time.push(record.time_h);
        self.pump_on.push(record.pump_on);
        self.level.push(record.level_m);
        self.flow.push(record.flow_m3h);
        self.power.push(record.power_kw);
        self.tariff.push(record.tariff);
        self.cost.push(record.cumulative_cost);
    }

    /// Row view of step `step`.
    pub fn record(&self, step: usize) -> Option<StepRecord> {
        (step < self.len()).then(|| StepRecord {
            step,
            time_h: self.time[step],
            pump_on: self.pump_on[step],
            level_m: self.level[step],
            flow_m3h: self.flow[step],
            power_kw: self.power[step],
            tariff: self.tariff[step],
            cumulative_cost: self.cost[step],
        })
    }

    /// All rows in step order.
    pub fn records(&self) -> impl Iterator<Item = StepRecord> + '_ {
        (0..self.len()).filter_map(|i| self.record(i))
    }

    /// First tank level.
    pub fn initial_level(&self) -> Option<f64> {
        self.level.first().copied()
    }

    /// Last tank level.
    pub fn terminal_level(&self) -> Option<f64> {
        self.level.last().copied()
    }

    /// Last cumulative cost, penalty included.
    pub fn terminal_cost(&self) -> Option<f64> {
        self.cost.last().copied()
    }

    /// Lowest level over the horizon.
    pub fn min_level(&self) -> Option<f64> {
        self.level.iter().copied().reduce(f64::min)
    }

    /// Highest level over the horizon.
    pub fn max_level(&self) -> Option<f64> {
        self.level.iter().copied().reduce(f64::max)
    }
}

/// One step of a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Step index.
    pub step: usize,
    /// Grid time (h).
    pub time_h: f64,
    /// Pump ON indicator.
    pub pump_on: bool,
    /// Tank level (m).
    pub level_m: f64,
    /// Pump flow (m³/h).
    pub flow_m3h: f64,
    /// Electrical power (kW).
    pub power_kw: f64,
    /// Energy price.
    pub tariff: f64,
    /// Cumulative cost.
    pub cumulative_cost: f64,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} ({:>5.2}h) | pump={} Q={:>6.1} m³/h P={:>6.1} kW | level={:>5.2} m | \
             price={:.4} cost={:>8.2}",
            self.step,
            self.time_h,
            if self.pump_on { "ON " } else { "OFF" },
            self.flow_m3h,
            self.power_kw,
            self.level_m,
            self.tariff,
            self.cumulative_cost,
        )
    }
}

/// A completed simulation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// Per-step record with the penalty folded into `cost`.
    pub series: TimeSeries,
    /// Hours during which the level left the violation band.
    pub violations: ViolationSet,
    /// Penalty added to every cost entry.
    pub penalty: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TimeSeries {
        let mut series = TimeSeries::with_capacity(3);
        for (i, level) in [4.0, 3.5, 4.5].into_iter().enumerate() {
            series.push(StepRecord {
                step: i,
                time_h: i as f64 * 0.25,
                pump_on: i == 2,
                level_m: level,
                flow_m3h: if i == 2 { 290.0 } else { 0.0 },
                power_kw: if i == 2 { 112.0 } else { 0.0 },
                tariff: 0.07,
                cumulative_cost: i as f64,
            });
        }
        series
    }

    #[test]
    fn level_extremes() {
        let series = sample();
        assert_eq!(series.min_level(), Some(3.5));
        assert_eq!(series.max_level(), Some(4.5));
        assert_eq!(series.initial_level(), Some(4.0));
        assert_eq!(series.terminal_level(), Some(4.5));
    }

    #[test]
    fn records_match_columns() {
        let series = sample();
        let rows: Vec<_> = series.records().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].power_kw, series.power[2]);
        assert!(rows[2].pump_on);
        assert_eq!(series.record(3), None);
    }

    #[test]
    fn empty_series_has_no_extremes() {
        let series = TimeSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.min_level(), None);
        assert_eq!(series.terminal_cost(), None);
    }

    #[test]
    fn step_record_display_does_not_panic() {
        let series = sample();
        let s = series.records().map(|r| r.to_string()).collect::<Vec<_>>();
        assert!(s.iter().all(|line| !line.is_empty()));
    }
}
