//! Axes, turn directions, and face labels.

use strum::{Display, EnumIter};

/// One of the three rotation axes of the cube.
#[derive(Debug, Display, EnumIter, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left-to-right axis.
    X,
    /// Bottom-to-top axis.
    Y,
    /// Back-to-front axis.
    Z,
}

impl Axis {
    /// All three axes, in a fixed order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The four side faces around this axis, listed in clockwise order when
    /// looking down the positive direction of the axis.
    ///
    /// The ring rotation and the swipe-input logic both index into these
    /// tables, so the order must not change.
    pub fn ordered_faces(self) -> [Face; 4] {
        match self {
            Axis::X => [Face::Front, Face::Top, Face::Back, Face::Bottom],
            Axis::Y => [Face::Front, Face::Left, Face::Back, Face::Right],
            Axis::Z => [Face::Top, Face::Right, Face::Bottom, Face::Left],
        }
    }
}

/// Turn direction relative to the positive direction of an axis.
///
/// This is deliberately *not* the usual face-relative cube notation: `L` in
/// standard notation is a clockwise turn of the visible left face, which is a
/// counter-clockwise turn around the positive X axis and therefore
/// `(Axis::X, Direction::CounterClockwise, layer 0)` here.
#[derive(Debug, Display, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Clockwise, looking down the positive direction of the axis.
    #[default]
    Clockwise,
    /// Counter-clockwise, looking down the positive direction of the axis.
    CounterClockwise,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn rev(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// One of the six faces of the cube.
///
/// The discriminant order is load-bearing: the four side faces come first so
/// that arithmetic mod 4 walks the Y-axis ring, and several solver tables rely
/// on `Front=0 … Bottom=5`.
#[derive(Debug, Display, EnumIter, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    /// Positive Z face.
    Front = 0,
    /// Positive X face.
    Right = 1,
    /// Negative Z face.
    Back = 2,
    /// Negative X face.
    Left = 3,
    /// Positive Y face.
    Top = 4,
    /// Negative Y face.
    Bottom = 5,
}

impl Face {
    /// All six faces, in discriminant order.
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Right,
        Face::Back,
        Face::Left,
        Face::Top,
        Face::Bottom,
    ];

    /// The axis perpendicular to this face.
    pub fn axis(self) -> Axis {
        match self {
            Face::Left | Face::Right => Axis::X,
            Face::Top | Face::Bottom => Axis::Y,
            Face::Front | Face::Back => Axis::Z,
        }
    }

    /// Face index as used for array lookups.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Face::index`].
    ///
    /// # Panics
    ///
    /// Panics if `index >= 6`.
    pub fn from_index(index: usize) -> Face {
        Face::ALL[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_index_round_trip() {
        for face in Face::ALL {
            assert_eq!(face, Face::from_index(face.index()));
        }
    }

    #[test]
    fn ring_orders_contain_only_perpendicular_faces() {
        for axis in Axis::ALL {
            for face in axis.ordered_faces() {
                assert_ne!(face.axis(), axis);
            }
        }
    }
}
