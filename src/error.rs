use std::fmt;

use thiserror::Error;

/// Iterative sweep loops that can hit the iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    PolicyEvaluation,
    ValueIteration,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Algorithm::PolicyEvaluation => "policy evaluation",
            Algorithm::ValueIteration => "value iteration",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,
    #[error("{rows}x{cols} grid needs {expected} rewards, got {actual}")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },
    #[error("epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f64),
    #[error("discount must be in (0, 1], got {0}")]
    InvalidDiscount(f64),
    #[error("{algorithm} did not converge within {limit} sweeps (last delta {delta})")]
    NotConverged {
        algorithm: Algorithm,
        limit: usize,
        delta: f64,
    },
    #[error("policy did not stabilise within {limit} iterations ({changed} states still changing)")]
    PolicyUnstable { limit: usize, changed: usize },
    #[error("{0}")]
    Csv(#[from] csv::Error),
}
