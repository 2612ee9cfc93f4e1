//! The turn engine: animation loop, history, scrambling, and solver
//! orchestration.

use std::collections::VecDeque;

use cubetwist_core::{
    Algorithm, Axis, Color, CubeGeometry, Direction, Face, GeometryError, Rotation, SquareId,
};
use rand::{Rng, RngCore};
use strum::Display;

use crate::errors::EngineError;
use crate::traits::{CubeRenderer, EventListener, SolverAction, SolverStrategy};

/// Maximum number of moves kept on the undo stack; the oldest move is
/// evicted beyond this.
pub const MAX_UNDO: usize = 40;

/// Finish a rotation once it is within this many degrees of its target, so
/// float accumulation can never stall a turn just short of done.
const ANGLE_EPSILON: f32 = 0.01;

/// What the engine is currently busy with.
#[derive(Debug, Display, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Accepting user requests.
    #[default]
    Idle,
    /// Animating an endless stream of random moves.
    Randomizing,
    /// Driving an attached solver strategy.
    Solving,
    /// Unwinding the recorded scramble for the user.
    Assisting,
    /// Playing back a caller-supplied algorithm.
    Testing,
}

/// Why the current rotation is happening; decides the bookkeeping when it
/// finishes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RotateMode {
    /// No rotation pending.
    #[default]
    None,
    /// Direct user request; feeds the undo stack and the move counter.
    Manual,
    /// Scramble move; counts and history are untouched.
    Random,
    /// Step of the current algorithm.
    Algorithm,
    /// Replay of an undo-stack entry.
    Undo,
    /// Replay of a redo-stack entry.
    Redo,
}

/// Animation speed, in degrees advanced per tick.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AngleSpeed {
    /// 2° per tick.
    Slow,
    /// 4° per tick.
    #[default]
    Normal,
    /// 10° per tick.
    Fast,
}

impl AngleSpeed {
    /// Degrees the animation advances each tick.
    pub fn degrees_per_tick(self) -> f32 {
        match self {
            AngleSpeed::Slow => 2.0,
            AngleSpeed::Normal => 4.0,
            AngleSpeed::Fast => 10.0,
        }
    }
}

/// A cube plus everything needed to animate and orchestrate turns on it.
///
/// The engine advances only inside [`TurnEngine::tick`]; all other methods
/// merely queue work or reject it, so a frontend can call them from input
/// handlers without re-entrancy concerns.
pub struct TurnEngine {
    geometry: CubeGeometry,
    state: EngineState,
    mode: RotateMode,
    current: Option<Rotation>,
    algorithm: Option<Algorithm>,
    undo_stack: VecDeque<Rotation>,
    redo_stack: Vec<Rotation>,
    scramble_log: Vec<Rotation>,
    move_count: isize,
    speed: AngleSpeed,
    listener: Option<Box<dyn EventListener>>,
    solver: Option<Box<dyn SolverStrategy>>,
    rng: Box<dyn RngCore>,
}

impl std::fmt::Debug for TurnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("sizes", &self.geometry.sizes())
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("move_count", &self.move_count)
            .finish_non_exhaustive()
    }
}

impl TurnEngine {
    /// Engine around an `n`×`n`×`n` cube with the default color scheme.
    pub fn cube(n: usize) -> Self {
        Self::new(CubeGeometry::cube(n))
    }

    /// Engine around an arbitrary prebuilt cube.
    pub fn new(geometry: CubeGeometry) -> Self {
        TurnEngine {
            geometry,
            state: EngineState::Idle,
            mode: RotateMode::None,
            current: None,
            algorithm: None,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            scramble_log: Vec::new(),
            move_count: 0,
            speed: AngleSpeed::default(),
            listener: None,
            solver: None,
            rng: Box::new(rand::rng()),
        }
    }

    /// Replaces the random source; pass a seeded RNG for reproducible
    /// scrambles.
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Attaches an event listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl EventListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Attaches a solver strategy, replacing any previous one.
    pub fn set_solver(&mut self, solver: impl SolverStrategy + 'static) {
        self.solver = Some(Box::new(solver));
    }

    /// Sets the animation speed.
    pub fn set_speed(&mut self, speed: AngleSpeed) {
        self.speed = speed;
    }

    /// The cube being simulated.
    pub fn geometry(&self) -> &CubeGeometry {
        &self.geometry
    }

    /// Current engine state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Net number of counted moves: manual moves and algorithm steps count
    /// up, undo counts down, whole-cube reorientations and scramble moves do
    /// not count at all.
    pub fn move_count(&self) -> isize {
        self.move_count
    }

    /// Whether a turn is animating right now.
    pub fn is_rotating(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the cube is solved.
    pub fn is_solved(&self) -> bool {
        self.geometry.is_solved()
    }

    /// Number of undoable moves currently held.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable moves currently held.
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    // ---------------------------------------------------------------------
    // User requests
    // ---------------------------------------------------------------------

    /// Requests a single-layer manual turn.
    pub fn rotate(
        &mut self,
        axis: Axis,
        direction: Direction,
        layer: usize,
    ) -> Result<(), EngineError> {
        self.check_idle("rotate")?;
        // Validate before queueing so a bad request never reaches the
        // animation path.
        let size = self.geometry.size(axis);
        if layer >= size {
            return Err(GeometryError::LayerOutOfRange { axis, layer, size }.into());
        }
        self.begin(Rotation::new(axis, direction, layer), RotateMode::Manual);
        Ok(())
    }

    /// Requests a manual reorientation of the whole cube. Does not affect
    /// the move counter.
    pub fn rotate_whole_cube(
        &mut self,
        axis: Axis,
        direction: Direction,
    ) -> Result<(), EngineError> {
        self.check_idle("rotate")?;
        let size = self.geometry.size(axis);
        self.begin(Rotation::whole_cube(axis, direction, size), RotateMode::Manual);
        Ok(())
    }

    /// Replays the most recent undoable move in reverse.
    ///
    /// Returns `Ok(false)` if the undo stack is empty.
    pub fn undo(&mut self) -> Result<bool, EngineError> {
        self.check_idle("undo")?;
        match self.undo_stack.pop_back() {
            None => Ok(false),
            Some(rotation) => {
                self.begin(rotation, RotateMode::Undo);
                Ok(true)
            }
        }
    }

    /// Replays the most recently undone move.
    ///
    /// Returns `Ok(false)` if the redo stack is empty.
    pub fn redo(&mut self) -> Result<bool, EngineError> {
        self.check_idle("redo")?;
        match self.redo_stack.pop() {
            None => Ok(false),
            Some(rotation) => {
                self.begin(rotation, RotateMode::Redo);
                Ok(true)
            }
        }
    }

    /// Applies `count` random moves instantly, with no animation. Resets the
    /// move counter and history; the moves are recorded for
    /// [`TurnEngine::assist`].
    pub fn scramble_instant(&mut self, count: usize) -> Result<(), EngineError> {
        self.check_idle("scramble")?;
        self.clear_history();
        self.scramble_log.clear();
        for _ in 0..count {
            let rotation = self.random_rotation();
            self.apply_now(&rotation);
            self.scramble_log.push(rotation);
        }
        Ok(())
    }

    /// Starts an animated scramble that runs until
    /// [`TurnEngine::stop_scramble`].
    pub fn start_scramble(&mut self) -> Result<(), EngineError> {
        self.check_idle("scramble")?;
        self.clear_history();
        self.scramble_log.clear();
        self.state = EngineState::Randomizing;
        let rotation = self.random_rotation();
        self.begin(rotation, RotateMode::Random);
        Ok(())
    }

    /// Stops an animated scramble. The in-flight move still completes.
    pub fn stop_scramble(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Randomizing {
            return Err(EngineError::NotIdle {
                operation: "stop scrambling",
                state: self.state,
            });
        }
        self.state = EngineState::Idle;
        Ok(())
    }

    /// Starts solving with the attached [`SolverStrategy`].
    pub fn solve(&mut self) -> Result<(), EngineError> {
        self.check_idle("solve")?;
        let mut solver = self.solver.take().ok_or(EngineError::NoSolver)?;
        let started = solver.start(&self.geometry);
        self.solver = Some(solver);
        if let Err(reason) = started {
            self.notify_message(&reason);
            return Ok(());
        }
        self.state = EngineState::Solving;
        self.clear_history();
        self.consult_solver();
        Ok(())
    }

    /// Abandons an in-progress solve. The in-flight move still completes,
    /// after which the engine is idle again.
    pub fn cancel_solving(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Solving | EngineState::Assisting => {
                self.algorithm = None;
                self.state = EngineState::Idle;
                self.mode = if self.current.is_some() {
                    RotateMode::Manual
                } else {
                    RotateMode::None
                };
                Ok(())
            }
            state => Err(EngineError::NotIdle {
                operation: "cancel solving",
                state,
            }),
        }
    }

    /// Rewinds the cube to its recorded scramble and animates the inverse
    /// moves back to solved, discarding any manual moves made since.
    pub fn assist(&mut self) -> Result<(), EngineError> {
        self.check_idle("assist")?;
        if self.scramble_log.is_empty() {
            return Err(EngineError::NothingToAssist);
        }
        self.geometry.reset_colors();
        let log = std::mem::take(&mut self.scramble_log);
        for rotation in &log {
            self.apply_now(rotation);
        }
        let unwind = Algorithm::from_steps(log.iter().rev().map(Rotation::reverse));
        self.clear_history();
        self.state = EngineState::Assisting;
        self.run(unwind);
        Ok(())
    }

    /// Plays back an arbitrary algorithm, animated.
    pub fn run_algorithm(&mut self, algorithm: Algorithm) -> Result<(), EngineError> {
        self.check_idle("run an algorithm")?;
        if algorithm.is_empty() {
            return Ok(());
        }
        self.state = EngineState::Testing;
        self.run(algorithm);
        Ok(())
    }

    /// Restores the pristine cube and forgets all history.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.check_idle("reset")?;
        self.geometry.reset_colors();
        self.clear_history();
        self.scramble_log.clear();
        self.mode = RotateMode::None;
        Ok(())
    }

    /// Repaints one whole face. Meant for cube-state entry; rejected while
    /// the engine is busy.
    pub fn paint_face(&mut self, face: Face, color: Color) -> Result<(), EngineError> {
        self.check_idle("repaint")?;
        self.geometry.paint_face(face, color);
        Ok(())
    }

    /// Repaints one square. Meant for cube-state entry; rejected while the
    /// engine is busy.
    pub fn paint_square(&mut self, square: SquareId, color: Color) -> Result<(), EngineError> {
        self.check_idle("repaint")?;
        self.geometry.set_square_color(square, color);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // The animation loop
    // ---------------------------------------------------------------------

    /// Advances the animation by one tick, applying and finishing the
    /// current rotation once it reaches its target angle.
    pub fn tick(&mut self) {
        let Some(rotation) = &mut self.current else {
            return;
        };
        let max_angle = max_angle(&self.geometry, rotation);
        rotation.advance(self.speed.degrees_per_tick(), max_angle);
        if rotation.angle.abs() > max_angle - ANGLE_EPSILON {
            self.finish_rotation();
        }
    }

    /// Draws every square through the renderer, tagging squares of the
    /// in-flight rotation's layers with the rotation itself.
    pub fn draw<R: CubeRenderer + ?Sized>(&self, renderer: &mut R) {
        let mut turning = vec![false; self.geometry.square_count()];
        if let Some(rotation) = &self.current {
            for layer in rotation.start_layer..rotation.start_layer + rotation.layer_count {
                for &pid in self.geometry.layer(rotation.axis, layer) {
                    for &sid in self.geometry.piece(pid).squares() {
                        turning[sid.index()] = true;
                    }
                }
            }
        }
        for id in self.geometry.square_ids() {
            let rotation = if turning[id.index()] {
                self.current.as_ref()
            } else {
                None
            };
            renderer.draw_square(&self.geometry, id, rotation);
        }
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn check_idle(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.state != EngineState::Idle {
            return Err(EngineError::NotIdle {
                operation,
                state: self.state,
            });
        }
        if self.current.is_some() {
            return Err(EngineError::RotationInProgress);
        }
        if self.algorithm.is_some() {
            return Err(EngineError::AlgorithmActive);
        }
        Ok(())
    }

    fn begin(&mut self, rotation: Rotation, mode: RotateMode) {
        debug_assert!(self.current.is_none());
        log::debug!("starting rotation ({rotation}) in mode {mode:?}");
        self.mode = mode;
        self.current = Some(rotation.template());
    }

    fn run(&mut self, mut algorithm: Algorithm) {
        match algorithm.next_step() {
            Some(step) => {
                self.algorithm = Some(algorithm);
                self.begin(step, RotateMode::Algorithm);
            }
            None => self.algorithm_finished(),
        }
    }

    fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.move_count = 0;
    }

    /// Applies a rotation to the geometry with no animation.
    fn apply_now(&mut self, rotation: &Rotation) {
        let size = self.geometry.size(rotation.axis);
        if rotation.layer_count >= size {
            self.geometry.rotate_whole(rotation.axis, rotation.direction);
        } else {
            for layer in rotation.start_layer..rotation.start_layer + rotation.layer_count {
                // Queued rotations are validated on entry.
                if let Err(err) = self
                    .geometry
                    .rotate_layer(rotation.axis, rotation.direction, layer)
                {
                    unreachable!("queued rotation invalid: {err}");
                }
            }
        }
    }

    fn finish_rotation(&mut self) {
        let Some(rotation) = self.current.take() else {
            return;
        };
        let rotation = rotation.template();
        self.apply_now(&rotation);
        let whole_cube = rotation.layer_count >= self.geometry.size(rotation.axis);

        match self.mode {
            RotateMode::None => {}
            RotateMode::Manual => {
                self.push_undo(rotation.reverse());
                self.redo_stack.clear();
                if !whole_cube {
                    self.move_count += 1;
                }
            }
            RotateMode::Undo => {
                self.redo_stack.push(rotation.reverse());
                if !whole_cube {
                    self.move_count -= 1;
                }
            }
            RotateMode::Redo => {
                self.push_undo(rotation.reverse());
                if !whole_cube {
                    self.move_count += 1;
                }
            }
            RotateMode::Random => {
                self.scramble_log.push(rotation);
            }
            RotateMode::Algorithm => {
                if !whole_cube {
                    self.move_count += 1;
                }
            }
        }
        self.notify_rotation(&rotation);

        match self.mode {
            RotateMode::Random => {
                if self.state == EngineState::Randomizing {
                    let next = self.random_rotation();
                    self.begin(next, RotateMode::Random);
                } else {
                    self.mode = RotateMode::None;
                }
            }
            RotateMode::Algorithm => self.advance_algorithm(),
            _ => {
                self.mode = RotateMode::None;
                if self.geometry.is_solved() {
                    self.notify_solved();
                }
            }
        }
    }

    fn advance_algorithm(&mut self) {
        let Some(algorithm) = &mut self.algorithm else {
            // Playback was cancelled mid-move.
            self.mode = RotateMode::None;
            return;
        };
        match algorithm.next_step() {
            Some(step) => self.begin(step, RotateMode::Algorithm),
            None => {
                self.algorithm = None;
                self.notify_algorithm_completed();
                self.algorithm_finished();
            }
        }
    }

    /// Called when the current algorithm has no more steps. Decides what
    /// happens next based on why the algorithm was running.
    fn algorithm_finished(&mut self) {
        self.algorithm = None;
        match self.state {
            EngineState::Solving => self.consult_solver(),
            EngineState::Assisting | EngineState::Testing => {
                self.state = EngineState::Idle;
                self.mode = RotateMode::None;
                if self.geometry.is_solved() {
                    self.notify_solved();
                }
            }
            _ => {
                self.mode = RotateMode::None;
            }
        }
    }

    /// Asks the solver for its next instruction and acts on it.
    fn consult_solver(&mut self) {
        let Some(mut solver) = self.solver.take() else {
            log::warn!("solving with no solver attached");
            self.state = EngineState::Idle;
            self.mode = RotateMode::None;
            return;
        };
        let action = solver.next(&self.geometry);
        self.solver = Some(solver);
        match action {
            SolverAction::Run(algorithm) => {
                log::debug!("solver queued {} moves", algorithm.len());
                self.run(algorithm);
            }
            SolverAction::Solved => {
                self.state = EngineState::Idle;
                self.mode = RotateMode::None;
                self.notify_solved();
            }
            SolverAction::Stuck(reason) => {
                log::warn!("solver stuck: {reason}");
                self.state = EngineState::Idle;
                self.mode = RotateMode::None;
                self.notify_message(&reason);
            }
        }
    }

    fn push_undo(&mut self, rotation: Rotation) {
        if self.undo_stack.len() >= MAX_UNDO {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(rotation);
    }

    /// A uniformly random single-layer move that does not directly cancel
    /// the previous scramble move.
    fn random_rotation(&mut self) -> Rotation {
        loop {
            let axis = Axis::ALL[self.rng.random_range(0..Axis::ALL.len())];
            let direction = if self.rng.random_bool(0.5) {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };
            let layer = self.rng.random_range(0..self.geometry.size(axis));
            let rotation = Rotation::new(axis, direction, layer);
            let cancels = self
                .scramble_log
                .last()
                .is_some_and(|prev| prev.template() == rotation.reverse());
            if !cancels {
                return rotation;
            }
        }
    }

    fn notify_rotation(&mut self, rotation: &Rotation) {
        if let Some(listener) = &mut self.listener {
            listener.rotation_completed(rotation);
        }
    }

    fn notify_message(&mut self, text: &str) {
        log::info!("{text}");
        if let Some(listener) = &mut self.listener {
            listener.message(text);
        }
    }

    fn notify_solved(&mut self) {
        log::info!("cube solved after {} moves", self.move_count);
        if let Some(listener) = &mut self.listener {
            listener.cube_solved();
        }
    }

    fn notify_algorithm_completed(&mut self) {
        if let Some(listener) = &mut self.listener {
            listener.algorithm_completed();
        }
    }
}

/// Target angle for a rotation: quarter turns for symmetric layers and
/// whole-cube reorientations, half turns for skewed layers.
fn max_angle(geometry: &CubeGeometry, rotation: &Rotation) -> f32 {
    if rotation.layer_count >= geometry.size(rotation.axis)
        || geometry.is_symmetric_around(rotation.axis)
    {
        90.0
    } else {
        180.0
    }
}

#[cfg(test)]
mod tests;
