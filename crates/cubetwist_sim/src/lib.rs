//! Tick-driven cube simulation.
//!
//! [`TurnEngine`] owns a [`cubetwist_core::CubeGeometry`] and animates turns
//! over successive [`TurnEngine::tick`] calls. On top of the animation loop
//! it layers bounded undo/redo history, scrambling (instant or animated),
//! algorithm playback, a guided "assist" that unwinds the recorded scramble,
//! and orchestration of a pluggable [`SolverStrategy`].
//!
//! The engine is deliberately renderer-agnostic: a frontend implements
//! [`CubeRenderer`] to receive per-square draw calls with the in-flight
//! rotation attached, and [`EventListener`] to hear about completed moves,
//! solves, and user-facing messages.

mod engine;
mod errors;
mod traits;

pub use crate::engine::{AngleSpeed, EngineState, RotateMode, TurnEngine, MAX_UNDO};
pub use crate::errors::EngineError;
pub use crate::traits::{CubeRenderer, EventListener, SolverAction, SolverStrategy};
