use std::fmt;

/// Probability that the agent moves in the intended direction.
pub const INTENDED_PROB: f64 = 0.8;
/// Probability of drifting to each side at a right angle to the intended direction.
pub const DRIFT_PROB: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in preference order. Default policy seeding and
    /// best action tie-breaks both walk this order.
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// The two directions at right angles, in the order they are summed.
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Right | Direction::Left => [Direction::Up, Direction::Down],
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// (row, col) offset of one step.
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    pub const fn arrow(self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Right => '→',
            Direction::Down => '↓',
            Direction::Left => '←',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Direction::Up => "UP",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
        };
        write!(f, "{}", name)
    }
}

/// An intended direction and the distribution over directions actually taken.
///
/// The opposite direction never appears in the distribution.
#[derive(Debug, PartialEq)]
pub struct Action {
    intended: Direction,
    distribution: [(Direction, f64); 3],
}

/// The four canonical actions, indexed in `Direction::ALL` order.
pub static ACTIONS: [Action; 4] = [
    Action::new(Direction::Up),
    Action::new(Direction::Right),
    Action::new(Direction::Down),
    Action::new(Direction::Left),
];

impl Action {
    const fn new(intended: Direction) -> Action {
        let [side_a, side_b] = intended.perpendicular();
        Action {
            intended,
            distribution: [
                (intended, INTENDED_PROB),
                (side_a, DRIFT_PROB),
                (side_b, DRIFT_PROB),
            ],
        }
    }

    /// Canonical action for an intended direction.
    pub fn of(direction: Direction) -> &'static Action {
        match direction {
            Direction::Up => &ACTIONS[0],
            Direction::Right => &ACTIONS[1],
            Direction::Down => &ACTIONS[2],
            Direction::Left => &ACTIONS[3],
        }
    }

    pub fn intended(&self) -> Direction {
        self.intended
    }

    pub fn distribution(&self) -> &[(Direction, f64)] {
        &self.distribution
    }

    /// Probability of actually moving in `direction`; zero when absent.
    pub fn probability(&self, direction: Direction) -> f64 {
        self.distribution
            .iter()
            .find(|(d, _)| *d == direction)
            .map_or(0.0, |(_, p)| *p)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.intended)
    }
}
