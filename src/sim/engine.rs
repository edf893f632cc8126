//! Time-stepping simulator for the tank, pump, and cost balance.

use crate::config::SimulationConfig;
use crate::devices::{DemandModel, DemandScenario, HydraulicModel};
use crate::error::SimulationError;
use crate::tariff::{HOURS_PER_DAY, TariffSchedule};

use super::clock::Clock;
use super::penalty::{PenaltyEngine, ViolationSet};
use super::schedule::Schedule;
use super::types::{SimulationOutcome, StepRecord, TimeSeries};

/// Simulator owning the plant models for one demand scenario.
///
/// Holds no per-run state: [`Simulator::run`] takes `&self`, so one
/// instance serves any number of concurrent evaluations and identical
/// schedules always yield identical outcomes.
#[derive(Debug, Clone)]
pub struct Simulator {
    clock: Clock,
    tank_area: f64,
    initial_level: f64,
    band: (f64, f64),
    demand: DemandModel,
    tariff: TariffSchedule,
    hydraulics: HydraulicModel,
    penalty: PenaltyEngine,
}

impl Simulator {
    /// Creates a simulator from a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Plant, tariff, and penalty configuration
    /// * `scenario` - Variable-class demand scenario
    ///
    /// # Panics
    ///
    /// Panics if the time grid or tariff is malformed; run
    /// [`SimulationConfig::validate`] first.
    pub fn new(config: &SimulationConfig, scenario: DemandScenario) -> Self {
        Self {
            clock: Clock::new(config.time.horizon, config.time.step),
            tank_area: config.tank.area,
            initial_level: config.tank.initial_level,
            band: (config.band_min(), config.band_max()),
            demand: DemandModel::new(scenario),
            tariff: TariffSchedule::from_config(&config.tariff),
            hydraulics: HydraulicModel::new(&config.pump, &config.pipe),
            penalty: PenaltyEngine::new(config.penalty.base),
        }
    }

    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    pub const fn scenario(&self) -> DemandScenario {
        self.demand.scenario()
    }

    /// Runs the full horizon for `schedule`.
    ///
    /// Steps fold left to right: step `i` reads only step `i - 1`. Once the
    /// pass completes, the violation penalty is added to every cost entry.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::NonFinite` if any level, power, or cost
    /// value becomes NaN or infinite; no partial series is returned.
    pub fn run(&self, schedule: &Schedule) -> Result<SimulationOutcome, SimulationError> {
        let total = self.clock.len();
        let mut series = TimeSeries::with_capacity(total);
        let mut violations = ViolationSet::new();

        let first = self.initial_record(schedule);
        series.push(first);

        (1..total).try_fold(first, |previous, step| {
            let record = self.advance(&previous, step, schedule)?;
            if record.level_m < self.band.0 || record.level_m > self.band.1 {
                violations.record(record.time_h);
            }
            series.push(record);
            Ok::<_, SimulationError>(record)
        })?;

        let penalty = self.penalty.penalty(&violations);
        for cost in &mut series.cost {
            *cost += penalty;
        }

        Ok(SimulationOutcome {
            series,
            violations,
            penalty,
        })
    }

    /// Step 0: the configured initial level with nothing pumped or paid yet.
    fn initial_record(&self, schedule: &Schedule) -> StepRecord {
        let time_h = self.clock.time_at(0);
        StepRecord {
            step: 0,
            time_h,
            pump_on: schedule.is_on(time_h),
            level_m: self.initial_level,
            flow_m3h: 0.0,
            power_kw: 0.0,
            tariff: self.tariff.price_at(time_h.rem_euclid(HOURS_PER_DAY)),
            cumulative_cost: 0.0,
        }
    }

    /// Executes one transition from `previous` to step `step`.
    fn advance(
        &self,
        previous: &StepRecord,
        step: usize,
        schedule: &Schedule,
    ) -> Result<StepRecord, SimulationError> {
        let dt = self.clock.step();
        let t = self.clock.time_at(step);
        let pump_on = schedule.is_on(t);

        // 1. Demand
        let total_demand = self.demand.total_m3h(t);

        // 2. Pump; only residential demand bypasses the tank
        let point = self.hydraulics.operating_point(previous.level_m, pump_on);
        let direct_supply = if pump_on {
            point.flow_m3h.min(self.demand.residential_m3h(t))
        } else {
            0.0
        };
        let tank_inflow = point.flow_m3h - direct_supply;

        // 3-4. Tank balance
        let net_withdrawal = total_demand - direct_supply;
        let level_m = previous.level_m + (tank_inflow - net_withdrawal) * dt / self.tank_area;

        // 6. Energy cost
        let tariff = self.tariff.price_at(t.rem_euclid(HOURS_PER_DAY));
        let cumulative_cost = previous.cumulative_cost + point.power_kw * tariff * dt;

        ensure_finite(step, "level", level_m)?;
        ensure_finite(step, "power", point.power_kw)?;
        ensure_finite(step, "cost", cumulative_cost)?;

        Ok(StepRecord {
            step,
            time_h: t,
            pump_on,
            level_m,
            flow_m3h: point.flow_m3h,
            power_kw: point.power_kw,
            tariff,
            cumulative_cost,
        })
    }
}

fn ensure_finite(step: usize, quantity: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::NonFinite { step, quantity })
    }
}
