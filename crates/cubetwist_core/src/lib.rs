//! Facelet-level N×N×N cube geometry and turn algebra.
//!
//! This crate owns the data model shared by the rest of the workspace: colored
//! squares grouped into physical pieces, the per-axis layer decomposition, and
//! the in-place color permutations that realize quarter turns, skewed 180°
//! turns, and whole-cube reorientations. It knows nothing about animation or
//! solving; see `cubetwist_sim` and `cubetwist_solver` for those.

mod axes;
mod color;
mod geometry;
mod moves;

pub use crate::axes::{Axis, Direction, Face};
pub use crate::color::{Color, ColorScheme};
pub use crate::geometry::{
    CubeGeometry, GeometryError, Piece, PieceId, PieceKind, Square, SquareId,
};
pub use crate::moves::{Algorithm, Rotation};

/// Number of side faces forming a ring around any axis.
pub const RING_SIDES: usize = 4;
/// Number of faces on a cube.
pub const FACE_COUNT: usize = 6;
