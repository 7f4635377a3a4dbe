use approx::abs_diff_eq;
use log::{debug, info, warn};
use ndarray::Array2;

use crate::action::{Action, Direction, ACTIONS};
use crate::error::{Algorithm, GridError};
use crate::policy::{Policy, Utilities, UtilityTrace};
use crate::state::{Coord, CoordIterator, State};

/// Discount rate applied to the utility of the next state.
pub const DISCOUNT: f64 = 0.99;
/// Default cap on sweeps per evaluation / value iteration run, and on
/// improvement rounds per policy iteration run.
pub const DEFAULT_MAX_SWEEPS: usize = 100_000;

/// Grid world environment.
///
/// Owns the cells, one shared utility table and two independent policies:
/// the one refined by policy iteration and the one derived by value
/// iteration. Sweeps visit non-wall cells in row-major order and update
/// utilities in place, so a sweep sees values already written earlier in
/// the same sweep.
#[derive(Debug, Clone)]
pub struct Grid {
    states: Array2<State>,
    /// Non-wall cells with their rewards, in sweep order.
    open: Vec<(Coord, f64)>,
    discount: f64,
    max_sweeps: usize,
    utilities: Utilities,
    pi_policy: Policy,
    vi_policy: Policy,
    pi_trace: UtilityTrace,
    vi_trace: UtilityTrace,
}

impl Grid {
    /// Build a grid from row-major rewards. NaN marks a wall.
    pub fn new(rows: usize, cols: usize, rewards: &[f64]) -> Result<Grid, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        let expected = rows * cols;
        if rewards.len() != expected {
            return Err(GridError::DimensionMismatch {
                rows, cols, expected, actual: rewards.len()
            });
        }

        let states = Array2::from_shape_fn(
            (rows, cols), |(r, c)| State::new(rewards[r * cols + c], r, c));
        let open: Vec<(Coord, f64)> = CoordIterator::new(rows, cols)
            .filter_map(|c| states[[c.row, c.col]].reward().map(|r| (c, r)))
            .collect();

        let mut grid = Grid {
            states,
            open,
            discount: DISCOUNT,
            max_sweeps: DEFAULT_MAX_SWEEPS,
            utilities: Utilities::new(),
            pi_policy: Policy::new(),
            vi_policy: Policy::new(),
            pi_trace: UtilityTrace::default(),
            vi_trace: UtilityTrace::default(),
        };
        grid.reset_utilities();
        grid.pi_policy = grid.default_policy();
        debug!("Built {}x{} grid with {} open cells", rows, cols, grid.open.len());
        Ok(grid)
    }

    /// Build an n x n grid.
    pub fn square(n: usize, rewards: &[f64]) -> Result<Grid, GridError> {
        Grid::new(n, n, rewards)
    }

    pub fn with_discount(mut self, discount: f64) -> Result<Grid, GridError> {
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(GridError::InvalidDiscount(discount));
        }
        self.discount = discount;
        Ok(self)
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Grid {
        self.max_sweeps = max_sweeps.max(1);
        self
    }

    pub fn rows(&self) -> usize {
        self.states.nrows()
    }

    pub fn cols(&self) -> usize {
        self.states.ncols()
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn states(&self) -> &Array2<State> {
        &self.states
    }

    pub fn state(&self, coord: Coord) -> Option<&State> {
        self.states.get((coord.row, coord.col))
    }

    pub fn utilities(&self) -> &Utilities {
        &self.utilities
    }

    pub fn utility(&self, coord: Coord) -> Option<f64> {
        self.utilities.get(&coord).copied()
    }

    pub fn policy_iteration_policy(&self) -> &Policy {
        &self.pi_policy
    }

    pub fn value_iteration_policy(&self) -> &Policy {
        &self.vi_policy
    }

    pub fn policy_iteration_trace(&self) -> &UtilityTrace {
        &self.pi_trace
    }

    pub fn value_iteration_trace(&self) -> &UtilityTrace {
        &self.vi_trace
    }

    /// Set the utility of every non-wall cell back to zero.
    pub fn reset_utilities(&mut self) {
        self.utilities = self.open.iter().map(|(c, _)| (*c, 0.0)).collect();
    }

    /// Prefer UP, RIGHT, DOWN in that order if the move is legal,
    /// otherwise fall back to LEFT whether or not it is legal.
    fn default_policy(&self) -> Policy {
        self.open
            .iter()
            .map(|(c, _)| {
                let direction = Direction::ALL[..3]
                    .iter()
                    .copied()
                    .find(|d| self.can_move(*c, *d))
                    .unwrap_or(Direction::Left);
                (*c, direction)
            })
            .collect()
    }

    fn neighbor(&self, coord: Coord, direction: Direction) -> Option<Coord> {
        let (dr, dc) = direction.offset();
        let row = coord.row.checked_add_signed(dr)?;
        let col = coord.col.checked_add_signed(dc)?;
        let target = self.states.get((row, col))?;
        if target.is_wall() {
            None
        } else {
            Some(target.coord())
        }
    }

    /// A move is legal when the target cell is on the grid and not a wall.
    pub fn can_move(&self, coord: Coord, direction: Direction) -> bool {
        self.neighbor(coord, direction).is_some()
    }

    /// Cell reached by moving in `direction`; illegal moves bounce back.
    pub fn next_state(&self, coord: Coord, direction: Direction) -> Coord {
        self.neighbor(coord, direction).unwrap_or(coord)
    }

    /// Probability-weighted utility of the cells `action` can lead to.
    ///
    /// # Panics
    /// Panics if a reachable cell has no utility, which means `coord` is a wall
    /// or off the grid.
    pub fn expected_utility(&self, action: &Action, coord: Coord) -> f64 {
        action
            .distribution()
            .iter()
            .map(|(direction, prob)| {
                let next = self.next_state(coord, *direction);
                prob * self.utilities[&next]
            })
            .sum()
    }

    /// Action with the greatest expected utility. Ties go to the earliest
    /// action in UP, RIGHT, DOWN, LEFT order.
    pub fn best_action(&self, coord: Coord) -> &'static Action {
        let mut best = &ACTIONS[0];
        let mut max_utility = f64::NEG_INFINITY;
        for action in &ACTIONS {
            let utility = self.expected_utility(action, coord);
            if utility > max_utility {
                max_utility = utility;
                best = action;
            }
        }
        best
    }

    /// Apply the Bellman update to one cell, returning the absolute change.
    fn update_utility(&mut self, coord: Coord, reward: f64, action: &Action) -> f64 {
        let utility = reward + self.discount * self.expected_utility(action, coord);
        let previous = self
            .utilities
            .insert(coord, utility)
            .unwrap_or_else(|| panic!("No utility for state {}", coord));
        (utility - previous).abs()
    }

    fn evaluation_sweep(&mut self) -> f64 {
        let mut delta: f64 = 0.0;
        for i in 0..self.open.len() {
            let (coord, reward) = self.open[i];
            let action = Action::of(self.pi_policy[&coord]);
            delta = delta.max(self.update_utility(coord, reward, action));
        }
        delta
    }

    fn value_sweep(&mut self, sweep: usize) -> f64 {
        let mut delta: f64 = 0.0;
        for i in 0..self.open.len() {
            let (coord, reward) = self.open[i];
            let action = self.best_action(coord);
            delta = delta.max(self.update_utility(coord, reward, action));
            self.vi_policy.insert(coord, action.intended());
            self.vi_trace.record(coord, sweep, self.utilities[&coord]);
        }
        delta
    }

    /// Evaluate the policy iteration policy until the largest change in a
    /// sweep drops below `epsilon`. Returns the number of sweeps.
    pub fn policy_evaluation(&mut self, epsilon: f64) -> Result<usize, GridError> {
        check_epsilon(epsilon)?;
        let mut delta = f64::INFINITY;
        for sweep in 1..=self.max_sweeps {
            delta = self.evaluation_sweep();
            if delta < epsilon {
                debug!("Policy evaluation converged after {} sweeps", sweep);
                return Ok(sweep);
            }
        }
        warn!("Policy evaluation hit the {} sweep cap (delta {})", self.max_sweeps, delta);
        Err(GridError::NotConverged {
            algorithm: Algorithm::PolicyEvaluation,
            limit: self.max_sweeps,
            delta,
        })
    }

    /// Greedy policy with respect to the current utilities.
    pub fn policy_improvement(&self) -> Policy {
        self.open
            .iter()
            .map(|(c, _)| (*c, self.best_action(*c).intended()))
            .collect()
    }

    /// Alternate evaluation and improvement until the policy stops changing.
    ///
    /// Utilities are not reset first. Returns the total number of evaluation
    /// sweeps across all rounds.
    pub fn policy_iteration(&mut self, epsilon: f64) -> Result<usize, GridError> {
        check_epsilon(epsilon)?;
        self.pi_trace = UtilityTrace::new(self.open.iter().map(|(c, _)| *c));
        let mut total_sweeps = 0;
        let mut changed = 0;

        for iteration in 1..=self.max_sweeps {
            total_sweeps += self.policy_evaluation(epsilon)?;
            for (coord, _) in &self.open {
                self.pi_trace.record(*coord, total_sweeps, self.utilities[coord]);
            }

            let improved = self.policy_improvement();
            if improved == self.pi_policy {
                info!(
                    "Policy iteration converged: old and new policy match after {} \
                     iterations ({} evaluation sweeps)",
                    iteration, total_sweeps
                );
                return Ok(total_sweeps);
            }
            changed = improved
                .iter()
                .filter(|(c, d)| self.pi_policy.get(*c) != Some(*d))
                .count();
            debug!("Iteration {}: policy changed in {} states", iteration, changed);
            self.pi_policy = improved;
        }
        warn!("Policy iteration hit the {} iteration cap", self.max_sweeps);
        Err(GridError::PolicyUnstable { limit: self.max_sweeps, changed })
    }

    /// Reset utilities, then sweep with the best action in every cell until
    /// the largest change drops below `epsilon`. Returns the number of sweeps.
    pub fn value_iteration(&mut self, epsilon: f64) -> Result<usize, GridError> {
        check_epsilon(epsilon)?;
        self.reset_utilities();
        self.vi_trace = UtilityTrace::new(self.open.iter().map(|(c, _)| *c));

        let mut delta = f64::INFINITY;
        for sweep in 1..=self.max_sweeps {
            delta = self.value_sweep(sweep);
            if delta < epsilon {
                info!("Value iteration converged after {} sweeps", sweep);
                return Ok(sweep);
            }
        }
        warn!("Value iteration hit the {} sweep cap (delta {})", self.max_sweeps, delta);
        Err(GridError::NotConverged {
            algorithm: Algorithm::ValueIteration,
            limit: self.max_sweeps,
            delta,
        })
    }

    /// Cells where the two policies differ by more than a tie.
    ///
    /// A difference counts only when the expected utilities of the two chosen
    /// actions, under the current utilities, are further apart than
    /// `tolerance`. Cells missing from either policy always count.
    pub fn policy_mismatches(&self, tolerance: f64) -> Vec<Coord> {
        self.open
            .iter()
            .map(|(c, _)| *c)
            .filter(|c| match (self.pi_policy.get(c), self.vi_policy.get(c)) {
                (Some(a), Some(b)) if a == b => false,
                (Some(a), Some(b)) => !abs_diff_eq!(
                    self.expected_utility(Action::of(*a), *c),
                    self.expected_utility(Action::of(*b), *c),
                    epsilon = tolerance
                ),
                _ => true,
            })
            .collect()
    }

    /// True when both policies assign the same direction to every cell.
    pub fn policies_agree(&self) -> bool {
        self.pi_policy == self.vi_policy
    }
}

fn check_epsilon(epsilon: f64) -> Result<(), GridError> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidEpsilon(epsilon))
    }
}
