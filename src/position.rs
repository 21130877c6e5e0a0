use crate::math::{Point2d, Vector2d};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// An integer block position in the world.
///
/// Positions are ordered lexically by `x`, then `y`, then `z`. The path finder
/// relies on this ordering to break ties between routes of equal cost.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    /// Creates a new position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The integer midpoint between two positions, rounded towards negative infinity.
    pub fn midpoint(&self, other: &Position) -> Position {
        Position::new(
            (self.x + other.x).div_euclid(2),
            (self.y + other.y).div_euclid(2),
            (self.z + other.z).div_euclid(2),
        )
    }

    /// Projects the position onto the horizontal (XZ) plane.
    pub fn to_point2d(&self) -> Point2d {
        Point2d::new(self.x as f64, self.z as f64)
    }
}

impl Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the eight compass headings in the horizontal plane.
///
/// North is towards negative `z` and east is towards positive `x`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Angle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Angle {
    /// All headings, clockwise from north.
    pub const ALL: [Angle; 8] = [
        Angle::N,
        Angle::NE,
        Angle::E,
        Angle::SE,
        Angle::S,
        Angle::SW,
        Angle::W,
        Angle::NW,
    ];

    /// The index of the heading, clockwise from north.
    fn index(self) -> usize {
        self as usize
    }

    /// The heading pointing the opposite way.
    pub fn opposite(self) -> Angle {
        Self::ALL[(self.index() + 4) % 8]
    }

    /// Returns true if both headings lie on the same axis, in either direction.
    pub fn is_parallel(self, other: Angle) -> bool {
        self == other || self == other.opposite()
    }

    /// The integer step in `(x, z)` taken when moving one unit along this heading.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Angle::N => (0, -1),
            Angle::NE => (1, -1),
            Angle::E => (1, 0),
            Angle::SE => (1, 1),
            Angle::S => (0, 1),
            Angle::SW => (-1, 1),
            Angle::W => (-1, 0),
            Angle::NW => (-1, -1),
        }
    }

    /// The unit vector of this heading in the XZ plane.
    pub fn to_vector(self) -> Vector2d {
        let (dx, dz) = self.delta();
        let len = if dx != 0 && dz != 0 {
            std::f64::consts::SQRT_2
        } else {
            1.0
        };
        Vector2d::new(dx as f64 / len, dz as f64 / len)
    }

    /// The heading of a horizontal displacement, if it is axis-aligned or an exact diagonal.
    pub fn from_delta(dx: i32, dz: i32) -> Option<Angle> {
        if dx == 0 && dz == 0 {
            return None;
        }
        if dx != 0 && dz != 0 && dx.abs() != dz.abs() {
            return None;
        }
        let step = (dx.signum(), dz.signum());
        Self::ALL.into_iter().find(|angle| angle.delta() == step)
    }

    /// The heading from one position to another, if the displacement is aligned.
    pub fn between(from: &Position, to: &Position) -> Option<Angle> {
        Self::from_delta(to.x - from.x, to.z - from.z)
    }
}
