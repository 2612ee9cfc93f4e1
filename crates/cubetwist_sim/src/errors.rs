//! Engine error taxonomy.
//!
//! Errors cover rejected user requests only. Internal inconsistencies (a
//! queued rotation naming a missing layer, for instance) are bugs and panic
//! instead of surfacing here.

use cubetwist_core::GeometryError;
use thiserror::Error;

use crate::engine::EngineState;

/// A rejected engine request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The operation is only legal while the engine is idle.
    #[error("cannot {operation} while {state}")]
    NotIdle {
        /// Human-readable name of the rejected operation.
        operation: &'static str,
        /// State the engine was in.
        state: EngineState,
    },
    /// A turn is still animating.
    #[error("a rotation is already in progress")]
    RotationInProgress,
    /// An algorithm is already being played back.
    #[error("an algorithm is already running")]
    AlgorithmActive,
    /// [`TurnEngine::solve`](crate::TurnEngine::solve) without an attached
    /// solver.
    #[error("no solver strategy attached")]
    NoSolver,
    /// [`TurnEngine::assist`](crate::TurnEngine::assist) with no recorded
    /// scramble to unwind.
    #[error("no scramble recorded to assist with")]
    NothingToAssist,
    /// The request named a nonexistent layer.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
