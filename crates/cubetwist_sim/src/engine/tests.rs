use std::cell::RefCell;
use std::rc::Rc;

use cubetwist_core::{ColorScheme, CubeGeometry};
use cubetwist_notation::{parse_moves, to_facelets};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::*;

/// Ticks until the engine has nothing in flight and no queued algorithm.
fn settle(engine: &mut TurnEngine) {
    for _ in 0..100_000 {
        if !engine.is_rotating() {
            return;
        }
        engine.tick();
    }
    panic!("engine did not settle");
}

fn fast_engine(n: usize) -> TurnEngine {
    let mut engine = TurnEngine::cube(n);
    engine.set_speed(AngleSpeed::Fast);
    engine
}

#[derive(Debug, Default)]
struct Recorded {
    rotations: usize,
    messages: Vec<String>,
    solved: usize,
    algorithms: usize,
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Recorded>>);

impl EventListener for Recorder {
    fn rotation_completed(&mut self, _rotation: &Rotation) {
        self.0.borrow_mut().rotations += 1;
    }
    fn message(&mut self, text: &str) {
        self.0.borrow_mut().messages.push(text.to_owned());
    }
    fn cube_solved(&mut self) {
        self.0.borrow_mut().solved += 1;
    }
    fn algorithm_completed(&mut self) {
        self.0.borrow_mut().algorithms += 1;
    }
}

#[test]
fn manual_turn_applies_after_enough_ticks() {
    let mut engine = TurnEngine::cube(3);
    engine.rotate(Axis::X, Direction::Clockwise, 2).unwrap();
    assert!(engine.is_rotating());
    // Normal speed covers 90° in ceil(90/4) ticks.
    for _ in 0..22 {
        engine.tick();
        assert!(engine.is_solved(), "applied early");
    }
    engine.tick();
    assert!(!engine.is_rotating());
    assert!(!engine.is_solved());
    assert_eq!(engine.move_count(), 1);
    assert_eq!(engine.undo_len(), 1);
}

#[test]
fn undo_redo_round_trip() {
    let mut engine = fast_engine(3);
    engine.rotate(Axis::Y, Direction::Clockwise, 0).unwrap();
    settle(&mut engine);
    engine.rotate(Axis::Z, Direction::CounterClockwise, 1).unwrap();
    settle(&mut engine);
    assert_eq!(engine.move_count(), 2);

    assert_eq!(engine.undo().unwrap(), true);
    settle(&mut engine);
    assert_eq!(engine.undo().unwrap(), true);
    settle(&mut engine);
    assert!(engine.is_solved());
    assert_eq!(engine.move_count(), 0);
    assert_eq!(engine.redo_len(), 2);

    assert_eq!(engine.redo().unwrap(), true);
    settle(&mut engine);
    assert!(!engine.is_solved());
    assert_eq!(engine.move_count(), 1);
    assert_eq!(engine.undo_len(), 1);

    // A fresh manual move forgets the remaining redo entry.
    engine.rotate(Axis::X, Direction::Clockwise, 0).unwrap();
    settle(&mut engine);
    assert_eq!(engine.redo_len(), 0);
}

#[test]
fn undo_on_empty_stack_reports_false() {
    let mut engine = TurnEngine::cube(3);
    assert_eq!(engine.undo().unwrap(), false);
    assert_eq!(engine.redo().unwrap(), false);
}

#[test]
fn undo_stack_evicts_oldest() {
    let mut engine = fast_engine(3);
    for i in 0..MAX_UNDO + 5 {
        let direction = if i % 2 == 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        engine.rotate(Axis::ALL[i % 3], direction, i % 3).unwrap();
        settle(&mut engine);
    }
    assert_eq!(engine.undo_len(), MAX_UNDO);
}

#[test]
fn busy_engine_rejects_requests() {
    let mut engine = TurnEngine::cube(3);
    engine.rotate(Axis::X, Direction::Clockwise, 0).unwrap();
    assert_eq!(
        engine.rotate(Axis::X, Direction::Clockwise, 0),
        Err(EngineError::RotationInProgress)
    );
    assert_eq!(engine.undo(), Err(EngineError::RotationInProgress));
    assert_eq!(engine.reset(), Err(EngineError::RotationInProgress));
    settle(&mut engine);
    engine.reset().unwrap();
    assert!(engine.is_solved());
    assert_eq!(engine.undo_len(), 0);
}

#[test]
fn rotate_rejects_bad_layer() {
    let mut engine = TurnEngine::cube(3);
    assert!(matches!(
        engine.rotate(Axis::Z, Direction::Clockwise, 3),
        Err(EngineError::Geometry(_))
    ));
    assert!(!engine.is_rotating());
}

#[test]
fn seeded_scrambles_are_reproducible() {
    let mut a = TurnEngine::cube(3).with_rng(ChaCha8Rng::seed_from_u64(7));
    let mut b = TurnEngine::cube(3).with_rng(ChaCha8Rng::seed_from_u64(7));
    a.scramble_instant(25).unwrap();
    b.scramble_instant(25).unwrap();
    assert_eq!(
        to_facelets(a.geometry()).unwrap(),
        to_facelets(b.geometry()).unwrap()
    );
    assert!(!a.is_solved());
    assert_eq!(a.move_count(), 0);
}

#[test]
fn scramble_never_directly_cancels_itself() {
    let mut engine = TurnEngine::cube(3).with_rng(ChaCha8Rng::seed_from_u64(1234));
    engine.scramble_instant(200).unwrap();
    let log = &engine.scramble_log;
    for pair in log.windows(2) {
        assert_ne!(pair[1].template(), pair[0].reverse());
    }
}

#[test]
fn animated_scramble_runs_until_stopped() {
    let mut engine = fast_engine(3);
    engine.start_scramble().unwrap();
    assert_eq!(engine.state(), EngineState::Randomizing);
    assert_eq!(
        engine.rotate(Axis::X, Direction::Clockwise, 0),
        Err(EngineError::NotIdle {
            operation: "rotate",
            state: EngineState::Randomizing,
        })
    );
    for _ in 0..100 {
        engine.tick();
    }
    assert!(engine.is_rotating());
    engine.stop_scramble().unwrap();
    settle(&mut engine);
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(!engine.scramble_log.is_empty());
}

#[test]
fn assist_unwinds_the_scramble() {
    let recorder = Recorder::default();
    let mut engine = fast_engine(3).with_rng(ChaCha8Rng::seed_from_u64(99));
    engine.set_listener(recorder.clone());
    engine.scramble_instant(12).unwrap();
    assert!(!engine.is_solved());

    engine.assist().unwrap();
    assert_eq!(engine.state(), EngineState::Assisting);
    while engine.state() != EngineState::Idle || engine.is_rotating() {
        engine.tick();
    }
    assert!(engine.is_solved());
    assert_eq!(recorder.0.borrow().solved, 1);
    // The scramble was consumed; a second assist has nothing to do.
    assert_eq!(engine.assist(), Err(EngineError::NothingToAssist));
}

#[test]
fn run_algorithm_plays_all_steps() {
    let recorder = Recorder::default();
    let mut engine = fast_engine(3);
    engine.set_listener(recorder.clone());
    let mut sexy_six = Algorithm::new();
    for _ in 0..6 {
        sexy_six.append(&parse_moves("R U R' U'", 3).unwrap());
    }
    engine.run_algorithm(sexy_six).unwrap();
    assert_eq!(engine.state(), EngineState::Testing);
    while engine.state() != EngineState::Idle || engine.is_rotating() {
        engine.tick();
    }
    assert!(engine.is_solved());
    let recorded = recorder.0.borrow();
    assert_eq!(recorded.rotations, 24);
    assert_eq!(recorded.algorithms, 1);
    assert_eq!(recorded.solved, 1);
    assert_eq!(engine.move_count(), 24);
}

#[test]
fn whole_cube_turns_do_not_count() {
    let mut engine = fast_engine(3);
    engine.rotate_whole_cube(Axis::Y, Direction::Clockwise).unwrap();
    settle(&mut engine);
    assert_eq!(engine.move_count(), 0);
    assert!(engine.is_solved());
    // Still undoable.
    assert_eq!(engine.undo().unwrap(), true);
    settle(&mut engine);
    assert_eq!(
        engine.geometry().center_color(Face::Front),
        ColorScheme::default().front
    );
}

#[test]
fn skewed_layers_animate_to_half_turns() {
    let mut engine = TurnEngine::new(CubeGeometry::new(3, 3, 2, ColorScheme::default()));
    engine.set_speed(AngleSpeed::Fast);
    engine.rotate(Axis::X, Direction::Clockwise, 0).unwrap();
    // 90° worth of ticks is not enough for a skewed layer.
    for _ in 0..9 {
        engine.tick();
    }
    assert!(engine.is_rotating());
    settle(&mut engine);
    assert!(!engine.is_solved());
    engine.rotate(Axis::X, Direction::Clockwise, 0).unwrap();
    settle(&mut engine);
    assert!(engine.is_solved());
}

#[test]
fn solve_without_solver_is_rejected() {
    let mut engine = TurnEngine::cube(3);
    assert_eq!(engine.solve(), Err(EngineError::NoSolver));
}

/// Strategy stub that feeds a fixed algorithm once, then declares victory if
/// the cube really is solved.
struct OneShot {
    moves: Option<Algorithm>,
}

impl SolverStrategy for OneShot {
    fn start(&mut self, _cube: &CubeGeometry) -> Result<(), String> {
        Ok(())
    }
    fn next(&mut self, cube: &CubeGeometry) -> SolverAction {
        match self.moves.take() {
            Some(algorithm) => SolverAction::Run(algorithm),
            None if cube.is_solved() => SolverAction::Solved,
            None => SolverAction::Stuck("ran out of ideas".to_owned()),
        }
    }
}

#[test]
fn solving_drives_the_attached_strategy() {
    let recorder = Recorder::default();
    let mut engine = fast_engine(3);
    engine.set_listener(recorder.clone());

    let scramble = parse_moves("R U R' U'", 3).unwrap();
    engine.run_algorithm(scramble.clone()).unwrap();
    while engine.state() != EngineState::Idle || engine.is_rotating() {
        engine.tick();
    }

    let unwind = Algorithm::from_steps(scramble.steps().iter().rev().map(Rotation::reverse));
    engine.set_solver(OneShot {
        moves: Some(unwind),
    });
    engine.solve().unwrap();
    assert_eq!(engine.state(), EngineState::Solving);
    while engine.state() != EngineState::Idle || engine.is_rotating() {
        engine.tick();
    }
    assert!(engine.is_solved());
    assert_eq!(recorder.0.borrow().solved, 1);
    assert!(recorder.0.borrow().messages.is_empty());
}

#[test]
fn stuck_solver_reports_and_idles() {
    let recorder = Recorder::default();
    let mut engine = fast_engine(3);
    engine.set_listener(recorder.clone());
    engine.scramble_instant(5).unwrap();
    engine.set_solver(OneShot { moves: None });
    engine.solve().unwrap();
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(recorder.0.borrow().messages, ["ran out of ideas".to_owned()]);
}

#[test]
fn cancel_solving_returns_to_idle() {
    let mut engine = fast_engine(3);
    engine.scramble_instant(5).unwrap();
    let endless = Algorithm::from_steps(
        std::iter::repeat(Rotation::new(Axis::X, Direction::Clockwise, 0)).take(50),
    );
    engine.set_solver(OneShot {
        moves: Some(endless),
    });
    engine.solve().unwrap();
    for _ in 0..30 {
        engine.tick();
    }
    engine.cancel_solving().unwrap();
    settle(&mut engine);
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(!engine.is_rotating());
    // Back to normal operation.
    engine.rotate(Axis::Y, Direction::Clockwise, 1).unwrap();
    settle(&mut engine);
}

#[test]
fn draw_tags_only_turning_squares() {
    struct Tally {
        turning: usize,
        still: usize,
    }
    impl CubeRenderer for Tally {
        fn draw_square(
            &mut self,
            _cube: &CubeGeometry,
            _square: SquareId,
            rotation: Option<&Rotation>,
        ) {
            match rotation {
                Some(_) => self.turning += 1,
                None => self.still += 1,
            }
        }
    }

    let mut engine = TurnEngine::cube(3);
    let mut tally = Tally { turning: 0, still: 0 };
    engine.draw(&mut tally);
    assert_eq!((tally.turning, tally.still), (0, 54));

    engine.rotate(Axis::X, Direction::Clockwise, 2).unwrap();
    engine.tick();
    let mut tally = Tally { turning: 0, still: 0 };
    engine.draw(&mut tally);
    // The right face's 9 squares plus the 4×3 ring strips.
    assert_eq!((tally.turning, tally.still), (21, 33));
}
