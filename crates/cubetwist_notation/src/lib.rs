//! Text representations of cube state and moves.
//!
//! Two formats live here, both interoperable with the wider cubing ecosystem
//! and in particular with external two-phase solvers:
//!
//! - **Facelet strings**: 54 characters describing a 3×3×3's sticker layout,
//!   faces concatenated in `U R F D L B` order, each face row-major.
//! - **Face-turn notation**: whitespace-separated tokens like `R U' F2`,
//!   describing outer-layer turns.

mod errors;
mod facelets;
mod moves;

pub use crate::errors::{FaceletError, MoveError};
pub use crate::facelets::{apply_facelets, to_facelets, FACELET_LEN};
pub use crate::moves::{format_moves, parse_moves};
