//! Error types for notation parsing and formatting.

use cubetwist_core::{Color, Rotation};
use thiserror::Error;

/// Error converting between a cube and a facelet string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FaceletError {
    /// Facelet strings only describe 3×3×3 cubes.
    #[error("facelet strings require a 3×3×3 cube, got {x}×{y}×{z}")]
    WrongCubeSize {
        /// X dimension of the offending cube.
        x: usize,
        /// Y dimension of the offending cube.
        y: usize,
        /// Z dimension of the offending cube.
        z: usize,
    },
    /// Input string is not exactly 54 characters.
    #[error("facelet string has {0} characters, expected 54")]
    BadLength(usize),
    /// A character outside `URFDLB`.
    #[error("unrecognized facelet character {0:?}")]
    BadCharacter(char),
    /// A sticker color that the cube's scheme does not map to any face.
    #[error("sticker color {0} is not part of the cube's color scheme")]
    UnknownColor(Color),
}

/// Error parsing or formatting face-turn notation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoveError {
    /// A token that is not a face letter with an optional `'` or `2` suffix.
    #[error("unrecognized move token {0:?}")]
    BadToken(String),
    /// A rotation with no face-turn spelling, such as an inner-layer or
    /// multi-layer turn.
    #[error("rotation has no face-turn notation: {0}")]
    Unrepresentable(Rotation),
}
