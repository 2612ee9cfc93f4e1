use std::cell::RefCell;
use std::rc::Rc;

use cubetwist_sim::{AngleSpeed, EngineState, EventListener, TurnEngine};
use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;

/// Applies one rotation instantly, the way the engine commits a finished
/// animation.
fn apply(cube: &mut CubeGeometry, rotation: &Rotation) {
    if rotation.layer_count >= cube.size(rotation.axis) {
        cube.rotate_whole(rotation.axis, rotation.direction);
    } else {
        for layer in rotation.start_layer..rotation.start_layer + rotation.layer_count {
            cube.rotate_layer(rotation.axis, rotation.direction, layer)
                .expect("solver emitted an out-of-range layer");
        }
    }
}

/// Runs the solver to completion against `cube`, returning how many
/// algorithms it emitted.
fn drive(solver: &mut LayerSolver, cube: &mut CubeGeometry) -> usize {
    let mut emitted = 0;
    loop {
        match solver.next(cube) {
            SolverAction::Run(algo) => {
                emitted += 1;
                assert!(emitted < 500, "solver failed to converge");
                for step in algo.steps() {
                    apply(cube, step);
                }
            }
            SolverAction::Solved => return emitted,
            SolverAction::Stuck(reason) => panic!("solver stuck: {reason}"),
        }
    }
}

fn scramble(cube: &mut CubeGeometry, seed: u64, moves: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..moves {
        let axis = Axis::ALL[rng.random_range(0..3)];
        let direction = if rng.random_bool(0.5) {
            Clockwise
        } else {
            CounterClockwise
        };
        let layer = rng.random_range(0..SIZE);
        cube.rotate_layer(axis, direction, layer)
            .expect("valid layer");
    }
}

#[test]
fn solved_cube_needs_no_moves() {
    let mut cube = CubeGeometry::cube(SIZE);
    let mut solver = LayerSolver::new();
    solver.start(&cube).expect("3x3x3 accepted");
    assert_eq!(drive(&mut solver, &mut cube), 0);
    assert!(cube.is_solved());
}

#[test]
fn single_quarter_turn_is_solved() {
    let mut cube = CubeGeometry::cube(SIZE);
    cube.rotate_layer(Axis::X, Clockwise, 2).expect("valid layer");

    let mut solver = LayerSolver::new();
    solver.start(&cube).expect("3x3x3 accepted");
    let emitted = drive(&mut solver, &mut cube);
    assert!(emitted > 0);
    assert!(cube.is_solved());
}

#[test]
fn seeded_scrambles_are_solved() {
    for seed in 0..4 {
        let mut cube = CubeGeometry::cube(SIZE);
        scramble(&mut cube, seed, 20);
        assert!(!cube.is_solved());

        let mut solver = LayerSolver::new();
        solver.start(&cube).expect("3x3x3 accepted");
        drive(&mut solver, &mut cube);
        assert!(cube.is_solved(), "seed {seed} left the cube unsolved");
    }
}

#[test]
fn anchor_color_follows_the_starting_orientation() {
    let mut cube = CubeGeometry::cube(SIZE);
    // Roll the cube so an arbitrary side color is on top before scrambling.
    cube.rotate_whole(Axis::Z, Clockwise);
    let anchor = cube.center_color(Face::Top);
    scramble(&mut cube, 11, 15);

    let mut solver = LayerSolver::new();
    solver.start(&cube).expect("3x3x3 accepted");
    assert_eq!(solver.top_color, anchor);
    drive(&mut solver, &mut cube);
    assert!(cube.is_solved());
}

#[test]
fn wrong_cube_size_is_rejected() {
    let cube = CubeGeometry::cube(2);
    let mut solver = LayerSolver::new();
    assert!(solver.start(&cube).is_err());
}

#[test]
fn duplicate_center_colors_are_rejected() {
    let mut cube = CubeGeometry::cube(SIZE);
    cube.paint_face(Face::Top, Color::YELLOW);
    let mut solver = LayerSolver::new();
    assert!(solver.start(&cube).is_err());
}

#[test]
fn corner_slots_cover_both_horizontal_faces() {
    assert_eq!(corner_slot(Face::Top, LAST_ROW_RIGHT), Ok(CORNER_FRONT_RIGHT));
    assert_eq!(
        corner_slot(Face::Bottom, FIRST_ROW_RIGHT),
        Ok(CORNER_FRONT_RIGHT)
    );
    assert!(corner_slot(Face::Top, FIRST_ROW_CENTER).is_err());
    assert!(corner_slot(Face::Front, FIRST_ROW_LEFT).is_err());
}

#[test]
fn middle_edge_lift_rejects_absent_stickers() {
    assert!(middle_edge_to_top_edge(EDGE_MIDDLE_FRONT_LEFT, Face::Right).is_err());
    assert!(middle_edge_to_top_edge(EDGE_MIDDLE_FRONT_LEFT, Face::Left).is_ok());
    assert!(middle_edge_to_top_edge(FIRST_ROW_CENTER, Face::Front).is_err());
}

#[test]
fn aligning_over_the_home_face_is_a_no_op_when_already_there() {
    assert_eq!(align_over_home_face(Face::Front, Face::Front), Ok(None));
    let algo = align_over_home_face(Face::Left, Face::Front)
        .expect("side faces accepted")
        .expect("one spin needed");
    assert_eq!(algo.len(), 1);
    assert!(align_over_home_face(Face::Top, Face::Front).is_err());
}

#[derive(Clone, Default)]
struct Recorder {
    solved: Rc<RefCell<u32>>,
    messages: Rc<RefCell<Vec<String>>>,
}

impl EventListener for Recorder {
    fn message(&mut self, text: &str) {
        self.messages.borrow_mut().push(text.to_owned());
    }

    fn cube_solved(&mut self) {
        *self.solved.borrow_mut() += 1;
    }
}

#[test]
fn engine_drives_the_solver_to_completion() {
    let recorder = Recorder::default();
    let solved = Rc::clone(&recorder.solved);

    let mut engine = TurnEngine::cube(SIZE).with_rng(ChaCha8Rng::seed_from_u64(3));
    engine.set_speed(AngleSpeed::Fast);
    engine.set_listener(recorder);
    engine.set_solver(LayerSolver::new());
    engine.scramble_instant(15).expect("idle engine scrambles");
    engine.solve().expect("idle engine solves");

    for _ in 0..200_000 {
        engine.tick();
        if engine.state() == EngineState::Idle && !engine.is_rotating() {
            break;
        }
    }
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(engine.is_solved());
    assert!(*solved.borrow() >= 1);
}

#[test]
fn failed_solver_start_reports_through_the_listener() {
    let recorder = Recorder::default();
    let messages = Rc::clone(&recorder.messages);

    let mut engine = TurnEngine::cube(2);
    engine.set_listener(recorder);
    engine.set_solver(LayerSolver::new());
    engine.solve().expect("start failure is not an engine error");

    assert_eq!(engine.state(), EngineState::Idle);
    assert!(!messages.borrow().is_empty());
}
