//! Population-based global minimizer (DE/best/1/bin).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, trace};

use super::polish;
use super::{Bounds, MinimizeOutcome, Minimizer, MinimizerSettings, Objective};
use crate::error::OptimizationError;

/// Smallest population the best/1 strategy can draw donors from.
const MIN_POPULATION: usize = 5;

/// Differential evolution over the unit cube mapped onto the bounds.
///
/// Each generation mutates the current best member with one scaled
/// difference of two random members, applies binomial crossover against
/// every target, then evaluates all trials in parallel before replacing
/// targets that a trial strictly improves on. Members are stored in unit
/// coordinates; trial coordinates leaving `[0, 1]` are redrawn uniformly.
///
/// Selection is deferred to the end of the generation, so an improving trial
/// only becomes a donor one generation later. That costs generations
/// compared with replacing targets in place.
///
/// All randomness comes from one seeded generator consumed sequentially,
/// so a given seed reproduces the run exactly regardless of thread count.
#[derive(Debug, Clone, Default)]
pub struct DifferentialEvolution {
    settings: MinimizerSettings,
}

impl DifferentialEvolution {
    pub fn new(settings: MinimizerSettings) -> Self {
        Self { settings }
    }

    fn population_size(&self, dim: usize) -> usize {
        (self.settings.population_per_dimension * dim).max(MIN_POPULATION)
    }
}

impl Minimizer for DifferentialEvolution {
    fn minimize(
        &self,
        objective: &dyn Objective,
        bounds: &Bounds,
    ) -> Result<MinimizeOutcome, OptimizationError> {
        let settings = &self.settings;
        let (f_min, f_max) = settings.mutation;
        if !(f_min > 0.0 && f_min <= f_max) {
            return Err(OptimizationError::Minimizer(format!(
                "invalid mutation range ({f_min}, {f_max})"
            )));
        }
        if !(0.0..=1.0).contains(&settings.recombination) {
            return Err(OptimizationError::Minimizer(format!(
                "invalid recombination {}",
                settings.recombination
            )));
        }

        let dim = bounds.dim();
        let size = self.population_size(dim);
        let mut rng = StdRng::seed_from_u64(settings.seed);

        let mut population = latin_hypercube(size, dim, &mut rng);
        let mut scores = evaluate_all(objective, bounds, &population);
        let mut evaluations = size;
        let mut best = argmin_index(&scores);

        let mut generations = 0;
        let mut converged = false;
        while generations < settings.max_generations {
            generations += 1;
            let factor = rng.random_range(f_min..=f_max);

            let trials: Vec<Vec<f64>> = (0..size)
                .map(|target| {
                    trial_vector(
                        &population,
                        target,
                        best,
                        factor,
                        settings.recombination,
                        &mut rng,
                    )
                })
                .collect();
            let trial_scores = evaluate_all(objective, bounds, &trials);
            evaluations += size;

            for (i, (trial, score)) in trials.into_iter().zip(trial_scores).enumerate() {
                if score < scores[i] {
                    population[i] = trial;
                    scores[i] = score;
                }
            }
            best = argmin_index(&scores);

            let (mean, spread) = mean_and_std(&scores);
            debug!(
                generation = generations,
                best = scores[best],
                mean,
                spread,
                "differential evolution step"
            );
            if scores.iter().all(|s| s.is_finite()) && spread <= settings.tolerance * mean.abs() {
                converged = true;
                break;
            }
        }
        if !converged {
            trace!(generations, "population did not converge");
        }

        let mut x = bounds.scale_unit(&population[best]);
        let mut score = scores[best];

        if settings.polish && converged {
            let polished = polish::nelder_mead(objective, bounds, &x)?;
            evaluations += polished.evaluations;
            if polished.score < score {
                x = polished.x;
                score = polished.score;
            }
        }

        Ok(MinimizeOutcome {
            x,
            score,
            generations,
            evaluations,
            converged,
        })
    }
}

/// Stratified initial population: each coordinate's `[0, 1]` range is split
/// into `size` strata and every stratum holds exactly one member.
fn latin_hypercube(size: usize, dim: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut population = vec![vec![0.0; dim]; size];
    let segment = 1.0 / size as f64;
    for j in 0..dim {
        let mut strata: Vec<f64> = (0..size)
            .map(|k| (k as f64 + rng.random::<f64>()) * segment)
            .collect();
        strata.shuffle(rng);
        for (member, value) in population.iter_mut().zip(strata) {
            member[j] = value;
        }
    }
    population
}

fn evaluate_all(objective: &dyn Objective, bounds: &Bounds, members: &[Vec<f64>]) -> Vec<f64> {
    members
        .par_iter()
        .map(|u| {
            let score = objective.evaluate(&bounds.scale_unit(u));
            if score.is_nan() { f64::INFINITY } else { score }
        })
        .collect()
}

/// Builds the best/1/bin trial for `target`.
fn trial_vector(
    population: &[Vec<f64>],
    target: usize,
    best: usize,
    factor: f64,
    recombination: f64,
    rng: &mut StdRng,
) -> Vec<f64> {
    let (r1, r2) = donors(population.len(), target, rng);
    let base = &population[best];
    let current = &population[target];
    let dim = current.len();
    let fill_point = rng.random_range(0..dim);

    (0..dim)
        .map(|j| {
            let crossover = j == fill_point || rng.random::<f64>() < recombination;
            let value = if crossover {
                base[j] + factor * (population[r1][j] - population[r2][j])
            } else {
                current[j]
            };
            if (0.0..=1.0).contains(&value) {
                value
            } else {
                rng.random::<f64>()
            }
        })
        .collect()
}

/// Two distinct member indices, both different from `target`.
fn donors(size: usize, target: usize, rng: &mut StdRng) -> (usize, usize) {
    let mut picks = index::sample(rng, size, 3)
        .into_iter()
        .filter(|&i| i != target);
    match (picks.next(), picks.next()) {
        (Some(a), Some(b)) => (a, b),
        // Unreachable with three distinct picks; keep the trial well-formed.
        _ => ((target + 1) % size, (target + 2) % size),
    }
}

fn argmin_index(scores: &[f64]) -> usize {
    scores
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i)
}

/// Population mean and standard deviation of `scores`.
fn mean_and_std(scores: &[f64]) -> (f64, f64) {
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn settings(max_generations: usize) -> MinimizerSettings {
        MinimizerSettings {
            max_generations,
            population_per_dimension: 15,
            ..MinimizerSettings::default()
        }
    }

    fn square_box(dim: usize, half_width: f64) -> Bounds {
        Bounds::new(vec![-half_width; dim], vec![half_width; dim])
            .expect("bounds should be valid")
    }

    /// Shifted bowl with a strictly positive minimum so the relative
    /// spread criterion can be met.
    fn shifted_bowl(x: &[f64]) -> f64 {
        10.0 + (x[0] - 1.5).powi(2) + (x[1] + 0.5).powi(2)
    }

    #[test]
    fn converges_on_shifted_bowl() {
        let de = DifferentialEvolution::new(settings(300));
        let outcome = de
            .minimize(&shifted_bowl, &square_box(2, 5.0))
            .expect("minimizer should run");
        assert!(outcome.converged);
        assert!(outcome.generations < 300);
        assert_abs_diff_eq!(outcome.score, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(outcome.x[0], 1.5, epsilon = 0.05);
        assert_abs_diff_eq!(outcome.x[1], -0.5, epsilon = 0.05);
    }

    #[test]
    fn same_seed_reproduces_run() {
        let de = DifferentialEvolution::new(settings(40));
        let bounds = square_box(2, 5.0);
        let a = de.minimize(&shifted_bowl, &bounds).ok();
        let b = de.minimize(&shifted_bowl, &bounds).ok();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn result_lies_inside_bounds() {
        // Unconstrained minimum outside the box, on the upper corner side.
        let slope = |x: &[f64]| 100.0 - x[0] - x[1];
        let bounds = square_box(2, 2.0);
        let de = DifferentialEvolution::new(settings(200));
        let outcome = de.minimize(&slope, &bounds).expect("minimizer should run");
        assert!(bounds.contains(&outcome.x));
        assert!(outcome.score < 100.0);
    }

    #[test]
    fn exhausted_budget_is_not_converged() {
        let de = DifferentialEvolution::new(MinimizerSettings {
            tolerance: 0.0,
            ..settings(3)
        });
        let outcome = de
            .minimize(&shifted_bowl, &square_box(2, 5.0))
            .expect("minimizer should run");
        assert!(!outcome.converged);
        assert_eq!(outcome.generations, 3);
        assert_eq!(outcome.evaluations, 4 * 30);
    }

    #[test]
    fn infinite_scores_block_convergence() {
        let wall = |_: &[f64]| f64::INFINITY;
        let de = DifferentialEvolution::new(settings(5));
        let outcome = de.minimize(&wall, &square_box(2, 1.0)).ok();
        assert_eq!(outcome.map(|o| o.converged), Some(false));
    }

    #[test]
    fn rejects_invalid_mutation_range() {
        let de = DifferentialEvolution::new(MinimizerSettings {
            mutation: (1.0, 0.5),
            ..MinimizerSettings::default()
        });
        assert!(de.minimize(&shifted_bowl, &square_box(2, 1.0)).is_err());
    }

    #[test]
    fn latin_hypercube_fills_every_stratum() {
        let mut rng = StdRng::seed_from_u64(7);
        let population = latin_hypercube(10, 3, &mut rng);
        for j in 0..3 {
            let mut strata: Vec<usize> = population
                .iter()
                .map(|member| (member[j] * 10.0).floor() as usize)
                .collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn donors_are_distinct_from_target() {
        let mut rng = StdRng::seed_from_u64(1);
        for target in 0..5 {
            let (a, b) = donors(5, target, &mut rng);
            assert_ne!(a, b);
            assert_ne!(a, target);
            assert_ne!(b, target);
        }
    }
}
