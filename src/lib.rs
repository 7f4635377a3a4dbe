//! Policy iteration and value iteration for a grid world with a noisy
//! four-direction transition model.

pub mod action;
pub mod error;
pub mod grid;
pub mod policy;
pub mod state;
pub mod worlds;

pub use action::{Action, Direction};
pub use error::GridError;
pub use grid::Grid;
pub use state::{Coord, State};
