use log::{info, warn};
use rand::Rng;

use crate::error::GridError;
use crate::grid::Grid;

/// Reward of an ordinary empty cell.
pub const STEP_REWARD: f64 = -0.04;

/// Convergence thresholds (policy evaluation, value iteration) tried by `survey`.
pub const EPSILON_PAIRS: [(f64, f64); 7] = [
    (0.1, 0.2),
    (0.01, 0.01),
    (0.001, 0.001),
    (0.00001, 0.00001),
    (0.000001, 0.000001),
    (0.0000001, 0.0000001),
    (0.000000000001, 0.000000000001),
];

/// Rows and column counts of the random mazes used by `survey`.
pub const SURVEY_SIZES: [usize; 6] = [10, 12, 14, 16, 18, 20];

/// The 6x6 maze with three walls along the fifth row.
pub fn classic_rewards() -> Vec<f64> {
    let w = f64::NAN;
    let s = STEP_REWARD;
    vec![
        1.0, w, 1.0, s, s, 1.0,
        s, -1.0, s, 1.0, w, -1.0,
        s, s, -1.0, s, 1.0, s,
        s, s, s, -1.0, s, 1.0,
        s, w, w, w, -1.0, s,
        s, s, s, s, s, s,
    ]
}

/// Each cell is a wall, +1, -1 or an ordinary cell with equal probability.
pub fn random_rewards<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Vec<f64> {
    (0..rows * cols)
        .map(|_| match rng.gen_range(0..4) {
            0 => f64::NAN,
            1 => 1.0,
            2 => -1.0,
            _ => STEP_REWARD,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolvedMaze {
    pub rows: usize,
    pub cols: usize,
    pub policy_sweeps: usize,
    pub value_sweeps: usize,
}

/// Outcome of one epsilon pair across all survey sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyReport {
    pub policy_epsilon: f64,
    pub value_epsilon: f64,
    /// Mazes where both algorithms produced the same policy.
    pub solved: Vec<SolvedMaze>,
    /// (rows, cols) of mazes where the policies differed or a solver gave up.
    pub unsolved: Vec<(usize, usize)>,
}

fn solve_maze(
    rows: usize, cols: usize, rewards: &[f64], policy_epsilon: f64, value_epsilon: f64
) -> Result<Option<SolvedMaze>, GridError> {
    let mut grid = Grid::new(rows, cols, rewards)?;
    let policy_sweeps = grid.policy_iteration(policy_epsilon)?;
    let value_sweeps = grid.value_iteration(value_epsilon)?;
    if grid.policies_agree() {
        Ok(Some(SolvedMaze { rows, cols, policy_sweeps, value_sweeps }))
    } else {
        Ok(None)
    }
}

/// Solve a fresh random maze of every size in `sizes` x `sizes` with both
/// algorithms, for every epsilon pair, and record which mazes agree.
///
/// Mazes where a solver hits its iteration cap are counted as unsolved.
pub fn survey<R: Rng>(
    rng: &mut R, epsilon_pairs: &[(f64, f64)], sizes: &[usize]
) -> Result<Vec<SurveyReport>, GridError> {
    let mut reports = Vec::new();
    for &(policy_epsilon, value_epsilon) in epsilon_pairs {
        let mut report = SurveyReport {
            policy_epsilon, value_epsilon, solved: Vec::new(), unsolved: Vec::new()
        };
        for &rows in sizes {
            for &cols in sizes {
                let rewards = random_rewards(rows, cols, rng);
                match solve_maze(rows, cols, &rewards, policy_epsilon, value_epsilon) {
                    Ok(Some(solved)) => report.solved.push(solved),
                    Ok(None) => report.unsolved.push((rows, cols)),
                    Err(e @ (GridError::NotConverged { .. } | GridError::PolicyUnstable { .. })) => {
                        warn!("{}x{} maze gave up: {}", rows, cols, e);
                        report.unsolved.push((rows, cols));
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        info!(
            "Precision ({}, {}): solved {}, unsolved {}",
            policy_epsilon, value_epsilon, report.solved.len(), report.unsolved.len()
        );
        reports.push(report);
    }
    Ok(reports)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn classic_maze_shape() {
        let rewards = classic_rewards();
        assert_eq!(rewards.len(), 36);
        assert_eq!(rewards.iter().filter(|r| r.is_nan()).count(), 5);
        assert!(rewards[1].is_nan());
        assert_eq!(rewards[0], 1.0);
    }

    #[test]
    fn random_rewards_use_four_kinds() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(7);
        // Act
        let rewards = random_rewards(20, 20, &mut rng);
        // Assert
        assert_eq!(rewards.len(), 400);
        let walls = rewards.iter().filter(|r| r.is_nan()).count();
        assert!(walls > 0 && walls < 400);
        assert!(rewards
            .iter()
            .filter(|r| !r.is_nan())
            .all(|r| *r == 1.0 || *r == -1.0 || *r == STEP_REWARD));
    }

    #[test]
    fn random_rewards_are_reproducible() {
        let a = random_rewards(5, 4, &mut StdRng::seed_from_u64(11));
        let b = random_rewards(5, 4, &mut StdRng::seed_from_u64(11));
        let same = a
            .iter()
            .zip(&b)
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()));
        assert!(same);
    }

    #[test]
    fn survey_covers_every_size() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(3);
        // Act
        let reports = survey(&mut rng, &EPSILON_PAIRS[2..4], &[3, 4]).unwrap();
        // Assert
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert_eq!(report.solved.len() + report.unsolved.len(), 4);
            for maze in &report.solved {
                assert!(maze.value_sweeps > 0);
                assert!(maze.policy_sweeps > 0);
            }
        }
        assert_eq!(reports[0].policy_epsilon, 0.001);
    }
}
