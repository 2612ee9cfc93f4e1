//! Seams between the engine and its surroundings: rendering, event
//! notification, and solving.

use cubetwist_core::{Algorithm, CubeGeometry, Rotation, SquareId};

/// Receiver for engine events. All methods default to no-ops so frontends
/// implement only what they care about.
pub trait EventListener {
    /// A rotation finished and was applied to the cube.
    fn rotation_completed(&mut self, rotation: &Rotation) {
        let _ = rotation;
    }

    /// A user-facing status message.
    fn message(&mut self, text: &str) {
        let _ = text;
    }

    /// The cube reached the solved state.
    fn cube_solved(&mut self) {}

    /// The current algorithm ran out of steps.
    fn algorithm_completed(&mut self) {}
}

/// Per-square draw callback.
///
/// The engine calls [`CubeRenderer::draw_square`] once per square each
/// [`draw`](crate::TurnEngine::draw). Squares belonging to the layers of an
/// in-flight rotation receive that rotation, whose `angle` field carries the
/// current partial angle in degrees; everything else receives `None`.
pub trait CubeRenderer {
    /// Draws one square, possibly mid-turn.
    fn draw_square(&mut self, cube: &CubeGeometry, square: SquareId, rotation: Option<&Rotation>);
}

/// What a solver wants the engine to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverAction {
    /// Animate these moves, then ask again.
    Run(Algorithm),
    /// The cube is solved; stop.
    Solved,
    /// The solver cannot make progress; stop and report why.
    Stuck(String),
}

/// A pluggable solving strategy.
///
/// The engine drives the strategy reactively: after every completed
/// algorithm it hands the strategy the *current* cube state and asks for the
/// next batch of moves. Strategies therefore never need to simulate ahead.
pub trait SolverStrategy {
    /// Called once when solving starts. Strategies validate the cube here
    /// (size, sticker sanity) and capture whatever anchors they need.
    fn start(&mut self, cube: &CubeGeometry) -> Result<(), String>;

    /// The next instruction for the engine.
    fn next(&mut self, cube: &CubeGeometry) -> SolverAction;
}
