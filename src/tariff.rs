//! Time-of-day energy price lookup.

use crate::config::TariffConfig;

/// Length of one tariff cycle (h).
pub const HOURS_PER_DAY: f64 = 24.0;

/// Piecewise-linear energy price over one daily cycle.
///
/// Anchors are sorted by hour, the first at 0 and the last at 24 with equal
/// prices so the schedule is continuous at midnight. Callers wrap the time
/// of day into `[0, 24)` before querying.
///
/// # Examples
///
/// ```
/// use pump_sim::tariff::TariffSchedule;
///
/// let tariff = TariffSchedule::new(vec![(0.0, 0.10), (12.0, 0.20), (24.0, 0.10)]);
/// assert!((tariff.price_at(6.0) - 0.15).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TariffSchedule {
    anchors: Vec<(f64, f64)>,
}

impl TariffSchedule {
    /// Creates a schedule from `(hour, price)` anchors.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two anchors are given or the hours are not
    /// strictly increasing.
    pub fn new(anchors: Vec<(f64, f64)>) -> Self {
        assert!(anchors.len() >= 2, "tariff needs at least two anchors");
        assert!(
            anchors.windows(2).all(|w| w[0].0 < w[1].0),
            "tariff anchor hours must be strictly increasing"
        );
        Self { anchors }
    }

    pub fn from_config(config: &TariffConfig) -> Self {
        Self::new(config.anchors.clone())
    }

    pub fn anchors(&self) -> &[(f64, f64)] {
        &self.anchors
    }

    /// Price at time of day `t` (h), linearly interpolated between the two
    /// bracketing anchors. Values outside the anchor span take the nearest
    /// endpoint price.
    pub fn price_at(&self, t: f64) -> f64 {
        let (first_hour, first_price) = self.anchors[0];
        let (last_hour, last_price) = self.anchors[self.anchors.len() - 1];
        if t <= first_hour {
            return first_price;
        }
        if t >= last_hour {
            return last_price;
        }

        // First anchor strictly after `t`; always in 1..len here.
        let upper = self.anchors.partition_point(|&(hour, _)| hour <= t);
        let (h0, p0) = self.anchors[upper - 1];
        let (h1, p1) = self.anchors[upper];
        let weight = (t - h0) / (h1 - h0);
        p0 + weight * (p1 - p0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn reference() -> TariffSchedule {
        TariffSchedule::from_config(&TariffConfig::default())
    }

    #[test]
    fn anchors_round_trip_exactly() {
        let tariff = reference();
        for &(hour, price) in tariff.anchors() {
            assert_eq!(tariff.price_at(hour), price, "anchor at {hour}h");
        }
    }

    #[test]
    fn interpolates_midpoint() {
        let tariff = reference();
        // Between (2, 0.0651) and (4, 0.0593).
        assert_relative_eq!(tariff.price_at(3.0), (0.0651 + 0.0593) / 2.0);
    }

    #[test]
    fn price_is_convex_combination_of_bracketing_anchors() {
        let tariff = reference();
        let anchors = tariff.anchors();
        for i in 0..96 {
            let t = f64::from(i) * 0.25;
            let price = tariff.price_at(t);
            let upper = anchors.iter().position(|&(h, _)| h > t).unwrap_or(anchors.len() - 1);
            let lower = upper.saturating_sub(1);
            let (lo, hi) = {
                let a = anchors[lower].1;
                let b = anchors[upper].1;
                (a.min(b), a.max(b))
            };
            assert!(
                price >= lo - 1e-15 && price <= hi + 1e-15,
                "price {price} at {t}h outside [{lo}, {hi}]"
            );
        }
    }

    #[test]
    fn continuous_at_midnight() {
        let tariff = reference();
        assert_relative_eq!(tariff.price_at(0.0), tariff.price_at(24.0));
        assert_relative_eq!(tariff.price_at(23.999_999), 0.0713, epsilon = 1e-6);
    }

    #[test]
    #[should_panic]
    fn unsorted_anchors_panic() {
        TariffSchedule::new(vec![(0.0, 0.1), (12.0, 0.2), (6.0, 0.3)]);
    }
}
