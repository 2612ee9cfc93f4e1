//! Beginner's layer-by-layer solver for the 3×3×3 cube.
//!
//! [`LayerSolver`] implements [`cubetwist_sim::SolverStrategy`] as a reactive
//! planner: every time the engine finishes an algorithm it hands the solver
//! the current cube, and the solver re-scans the stickers and answers with the
//! next short corrective sequence. There is no lookahead and no saved plan, so
//! the solver is self-correcting against any legal scramble, at the cost of
//! being hard-wired to the 3×3×3 topology.

mod layer;

pub use crate::layer::LayerSolver;
