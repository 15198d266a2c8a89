use super::PricingProblem;
use crate::SolverError;
use crate::choice::feasibility;
use crate::profit::IncrementalProfit;
use rpp_core::models::{PricePair, PricingConfig, RouteLedger};
use rpp_core::ports::{OptimizationOutcome, Optimizer, ProfitSurface, SolveStatus};
use tracing::{Level, event};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluates the expected profit on every feasible cell of a price grid.
///
/// The exclusive price spans `[c_op, p_max]` and the pooled price the bound
/// derived from the rider's `k_delta_max`, each with `config.grid` points.
/// Cells where the pooled price is too high to be worth considering, measured
/// at the detour `delta_small`, are skipped and hold 0 in the surface.
///
/// The search starts from the initial guess and moves only on a strict
/// improvement, scanning exclusive prices in the outer loop and pooled prices
/// in the inner one, so ties resolve to the earliest cell. With the
/// `parallel` feature, rows are evaluated across threads but reduced in the
/// same order, and the outcome is identical.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridSearch;

impl Optimizer for GridSearch {
    type Error = SolverError;

    fn optimize(
        &self,
        config: &PricingConfig,
        rider: usize,
        ledger: &RouteLedger,
    ) -> Result<OptimizationOutcome, Self::Error> {
        let problem = PricingProblem::new(config, rider, ledger)?;
        let bounds = problem.bounds;

        let p_x = linspace(bounds.p_x, config.grid.points(bounds.p_x.0, bounds.p_x.1));
        let p_s = linspace(bounds.p_s, config.grid.points(bounds.p_s.0, bounds.p_s.1));

        // the feasibility filter uses the grid's own bound on the pooled detour
        let delta_small = config.delta_small;
        let k_delta_max = bounds.k_delta_max();

        let cells = evaluate(&problem.profit, &p_x, &p_s, delta_small, k_delta_max);
        event!(
            Level::DEBUG,
            n_x = p_x.len(),
            n_s = p_s.len(),
            feasible = cells.len(),
            "evaluated price grid"
        );

        let mut surface = ProfitSurface::zeros(p_x, p_s);
        let (profit, prices) =
            record_and_select(&mut surface, cells, problem.baseline, problem.initial_guess);

        event!(
            Level::INFO,
            rider,
            profit,
            p_x = prices.p_x,
            p_s = prices.p_s,
            "grid search finished"
        );

        Ok(OptimizationOutcome {
            profit,
            prices,
            surface: Some(surface),
            status: SolveStatus::Optimized,
        })
    }
}

/// `n` evenly spaced values from `lo` to `hi`, both included.
///
/// A single point sits at `lo`; no points gives an empty axis.
pub fn linspace((lo, hi): (f64, f64), n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|k| if k == n - 1 { hi } else { lo + k as f64 * step })
                .collect()
        }
    }
}

struct Cell {
    i: usize,
    j: usize,
    value: f64,
}

/// Writes the cells into `surface` and picks the best prices.
///
/// `cells` must be in row-major order. A cell replaces the incumbent, seeded
/// with `(baseline, initial_guess)`, only on a strict improvement.
fn record_and_select(
    surface: &mut ProfitSurface,
    cells: Vec<Cell>,
    baseline: f64,
    initial_guess: PricePair,
) -> (f64, PricePair) {
    let mut profit = baseline;
    let mut prices = initial_guess;

    for Cell { i, j, value } in cells {
        surface.set(i, j, value);
        if value > profit {
            profit = value;
            prices = PricePair::new(surface.p_x()[i], surface.p_s()[j]);
        }
    }

    (profit, prices)
}

fn row(
    profit: &IncrementalProfit,
    i: usize,
    p_x: f64,
    p_s: &[f64],
    delta_small: f64,
    k_delta_max: f64,
) -> Vec<Cell> {
    p_s.iter()
        .enumerate()
        .filter_map(|(j, &p_s)| {
            let prices = PricePair::new(p_x, p_s);
            (feasibility(prices, delta_small, k_delta_max) >= 0.0).then(|| Cell {
                i,
                j,
                value: profit.expected(prices),
            })
        })
        .collect()
}

// Feasible cells in row-major order
#[cfg(not(feature = "parallel"))]
fn evaluate(
    profit: &IncrementalProfit,
    p_x: &[f64],
    p_s: &[f64],
    delta_small: f64,
    k_delta_max: f64,
) -> Vec<Cell> {
    p_x.iter()
        .enumerate()
        .flat_map(|(i, &p_x)| row(profit, i, p_x, p_s, delta_small, k_delta_max))
        .collect()
}

// Feasible cells in row-major order
#[cfg(feature = "parallel")]
fn evaluate(
    profit: &IncrementalProfit,
    p_x: &[f64],
    p_s: &[f64],
    delta_small: f64,
    k_delta_max: f64,
) -> Vec<Cell> {
    let rows: Vec<Vec<Cell>> = p_x
        .par_iter()
        .enumerate()
        .map(|(i, &p_x)| row(profit, i, p_x, p_s, delta_small, k_delta_max))
        .collect();
    rows.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use approx::assert_abs_diff_eq;
    use rpp_core::models::{Point, RawPricingConfig, RouteLedger};

    fn surface() -> ProfitSurface {
        ProfitSurface::zeros(vec![0.1, 0.2], vec![0.0, 0.05, 0.1])
    }

    fn cell(i: usize, j: usize, value: f64) -> Cell {
        Cell { i, j, value }
    }

    #[test]
    fn test_ties_go_to_earliest_cell() {
        let mut surface = surface();
        let guess = PricePair::new(0.15, 0.02);
        let cells = vec![
            cell(0, 0, 1.0),
            cell(0, 2, 2.0),
            cell(1, 0, 2.0),
            cell(1, 1, 2.0),
        ];

        let (profit, prices) = record_and_select(&mut surface, cells, 0.5, guess);
        assert_eq!(profit, 2.0);
        assert_eq!(prices, PricePair::new(0.1, 0.1));
        assert_eq!(surface.get(1, 1), Some(2.0));
        // skipped cells keep their zero
        assert_eq!(surface.get(0, 1), Some(0.0));
    }

    #[test]
    fn test_ties_with_baseline_keep_initial_guess() {
        let mut surface = surface();
        let guess = PricePair::new(0.15, 0.02);
        let cells = vec![cell(0, 1, 2.0), cell(1, 2, 2.0)];

        let (profit, prices) = record_and_select(&mut surface, cells, 2.0, guess);
        assert_eq!(profit, 2.0);
        assert_eq!(prices, guess);
        assert_eq!(surface.get(0, 1), Some(2.0));
    }

    #[test]
    fn test_cells_come_in_row_major_order() {
        let config = PricingConfig::try_from(RawPricingConfig {
            p_max: Some(1.0),
            delta_small: Some(0.3),
            ..Default::default()
        })
        .unwrap();
        let first = config
            .bootstrapped_rider(Point::new(0.0, 0.0), Point::new(2.5, 0.0))
            .unwrap();
        let second = config
            .rider(Point::new(1.0, 3.0), Point::new(2.5, 0.0))
            .unwrap();
        let mut ledger = RouteLedger::try_from(vec![first, second]).unwrap();
        geometry::apply_insertion(&mut ledger, 1).unwrap();
        let profit = IncrementalProfit::new(&config, &ledger).unwrap();

        let p_x = linspace((0.1, 1.0), 31);
        let p_s = linspace((0.0, 0.6), 17);
        let cells = evaluate(&profit, &p_x, &p_s, 0.3, 0.85);

        let order = cells.iter().map(|c| (c.i, c.j)).collect::<Vec<_>>();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert!(!order.is_empty());
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_linspace() {
        assert!(linspace((0.0, 1.0), 0).is_empty());
        assert_eq!(linspace((0.2, 1.0), 1), vec![0.2]);
        assert_eq!(linspace((0.0, 1.0), 2), vec![0.0, 1.0]);

        let axis = linspace((0.1, 1.0), 4);
        assert_eq!(axis.len(), 4);
        assert_abs_diff_eq!(axis[1], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(axis[2], 0.7, epsilon = 1e-12);
        assert_eq!(axis[3], 1.0);
    }
}
