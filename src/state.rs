use std::fmt;
use std::hash::{Hash, Hasher};

/// Grid position. Used as the key of every utility and policy map.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Coord {
        Coord { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One grid cell.
///
/// A cell is a wall iff its reward is NaN. Equality and hashing only look at
/// the coordinates.
#[derive(Debug, Clone, Copy)]
pub struct State {
    coord: Coord,
    reward: f64,
}

impl State {
    pub fn new(reward: f64, row: usize, col: usize) -> State {
        State { coord: Coord::new(row, col), reward }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn row(&self) -> usize {
        self.coord.row
    }

    pub fn col(&self) -> usize {
        self.coord.col
    }

    pub fn is_wall(&self) -> bool {
        self.reward.is_nan()
    }

    /// Reward for entering the cell, `None` for walls.
    pub fn reward(&self) -> Option<f64> {
        if self.is_wall() {
            None
        } else {
            Some(self.reward)
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coord.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.reward() {
            Some(r) => write!(f, "{}", r),
            None => write!(f, "Wall"),
        }
    }
}

/// Walks every coordinate of a rows x cols grid in row-major order.
pub struct CoordIterator {
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
}

impl CoordIterator {
    pub fn new(rows: usize, cols: usize) -> CoordIterator {
        CoordIterator { row: 0, col: 0, rows, cols }
    }
}

impl Iterator for CoordIterator {
    type Item = Coord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.rows || self.cols == 0 {
            return None;
        }
        let coord = Coord::new(self.row, self.col);
        if self.col + 1 < self.cols {
            self.col += 1;
        } else {
            self.col = 0;
            self.row += 1;
        }
        Some(coord)
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn iterate_coords() {
        // Arrange
        let coord_iter = CoordIterator::new(2, 3);
        let mut coords: HashSet<Coord> = HashSet::new();
        // Act
        for c in coord_iter {
            assert!(c.row < 2);
            assert!(c.col < 3);
            coords.insert(c);
        }
        // Assert
        assert_eq!(coords.len(), 6);
    }

    #[test]
    fn iterate_coords_row_major() {
        let coords: Vec<Coord> = CoordIterator::new(2, 2).collect();
        assert_eq!(
            coords,
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, 0), Coord::new(1, 1)]
        );
    }

    #[test]
    fn iterate_empty_grid() {
        assert_eq!(CoordIterator::new(0, 4).count(), 0);
        assert_eq!(CoordIterator::new(4, 0).count(), 0);
    }

    #[test]
    fn nan_reward_is_wall() {
        let wall = State::new(f64::NAN, 1, 2);
        let open = State::new(-0.04, 1, 3);
        assert!(wall.is_wall());
        assert_eq!(wall.reward(), None);
        assert!(!open.is_wall());
        assert_eq!(open.reward(), Some(-0.04));
        assert_eq!(wall.to_string(), "Wall");
    }

    #[test]
    fn equality_ignores_reward() {
        let a = State::new(1.0, 2, 2);
        let b = State::new(f64::NAN, 2, 2);
        let c = State::new(1.0, 2, 3);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut seen = HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));
    }
}
