//! Face-turn notation: `R U' F2 …`.
//!
//! Only the six outer-layer turns have spellings. Layer indices depend on the
//! cube size: `R` is the last X layer, `L` the first, and likewise for
//! `U`/`D` on Y and `F`/`B` on Z. The primed letters of visible
//! counter-clockwise face turns map to axis-relative directions per the table
//! in [`cubetwist_core::Direction`]'s docs.

use cubetwist_core::{Algorithm, Axis, Direction, Rotation};

use crate::errors::MoveError;

/// `(axis, layer is last, plain-token direction)` for each face letter.
fn face_turn(letter: char, size: usize) -> Option<(Axis, usize, Direction)> {
    match letter {
        'R' => Some((Axis::X, size - 1, Direction::Clockwise)),
        'L' => Some((Axis::X, 0, Direction::CounterClockwise)),
        'U' => Some((Axis::Y, size - 1, Direction::Clockwise)),
        'D' => Some((Axis::Y, 0, Direction::CounterClockwise)),
        'F' => Some((Axis::Z, size - 1, Direction::Clockwise)),
        'B' => Some((Axis::Z, 0, Direction::CounterClockwise)),
        _ => None,
    }
}

/// Parses whitespace-separated face-turn tokens into an [`Algorithm`] for an
/// `size`×`size`×`size` cube. `X'` inverts, `X2` becomes two successive
/// quarter turns.
pub fn parse_moves(input: &str, size: usize) -> Result<Algorithm, MoveError> {
    let mut algo = Algorithm::new();
    for token in input.split_whitespace() {
        let bad = || MoveError::BadToken(token.to_owned());
        let mut chars = token.chars();
        let letter = chars.next().ok_or_else(bad)?;
        let (axis, layer, mut direction) = face_turn(letter, size).ok_or_else(bad)?;
        let mut count = 1;
        match chars.next() {
            None => {}
            Some('\'') => direction = direction.rev(),
            Some('2') => count = 2,
            Some(_) => return Err(bad()),
        }
        if chars.next().is_some() {
            return Err(bad());
        }
        for _ in 0..count {
            algo.add(axis, direction, layer);
        }
    }
    Ok(algo)
}

fn token_for(rotation: &Rotation, size: usize) -> Result<(char, bool), MoveError> {
    if rotation.layer_count != 1 {
        return Err(MoveError::Unrepresentable(rotation.template()));
    }
    let letter = match (rotation.axis, rotation.start_layer) {
        (Axis::X, 0) => 'L',
        (Axis::Y, 0) => 'D',
        (Axis::Z, 0) => 'B',
        (Axis::X, l) if l == size - 1 => 'R',
        (Axis::Y, l) if l == size - 1 => 'U',
        (Axis::Z, l) if l == size - 1 => 'F',
        _ => return Err(MoveError::Unrepresentable(rotation.template())),
    };
    // `face_turn` is total for the six letters above.
    let plain = face_turn(letter, size)
        .map(|(_, _, dir)| dir == rotation.direction)
        .unwrap_or(false);
    Ok((letter, !plain))
}

/// Formats an algorithm as face-turn tokens, collapsing immediate repeats of
/// the same turn into `X2`. Inner-layer and multi-layer rotations have no
/// spelling and are reported as [`MoveError::Unrepresentable`].
pub fn format_moves(algo: &Algorithm, size: usize) -> Result<String, MoveError> {
    let mut out = String::new();
    let mut steps = algo.steps().iter().peekable();
    while let Some(step) = steps.next() {
        let (letter, primed) = token_for(step, size)?;
        let mut doubled = false;
        if !primed {
            if let Some(&next) = steps.peek() {
                if next.template() == step.template() {
                    steps.next();
                    doubled = true;
                }
            }
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push(letter);
        if doubled {
            out.push('2');
        } else if primed {
            out.push('\'');
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use cubetwist_core::CubeGeometry;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_plain_primed_and_double_turns() {
        let algo = parse_moves("R U' F2", 3).unwrap();
        let steps = algo.steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(
            (steps[0].axis, steps[0].start_layer, steps[0].direction),
            (Axis::X, 2, Direction::Clockwise)
        );
        assert_eq!(
            (steps[1].axis, steps[1].start_layer, steps[1].direction),
            (Axis::Y, 2, Direction::CounterClockwise)
        );
        for step in &steps[2..] {
            assert_eq!(
                (step.axis, step.start_layer, step.direction),
                (Axis::Z, 2, Direction::Clockwise)
            );
        }
    }

    #[test]
    fn layer_indices_follow_cube_size() {
        let algo = parse_moves("L D B", 5).unwrap();
        for step in algo.steps() {
            assert_eq!(step.start_layer, 0);
            assert_eq!(step.direction, Direction::CounterClockwise);
        }
        let algo = parse_moves("R", 5).unwrap();
        assert_eq!(algo.steps()[0].start_layer, 4);
    }

    #[test]
    fn rejects_junk_tokens() {
        for junk in ["M", "R3", "R''", "2R", "r"] {
            assert_eq!(
                parse_moves(junk, 3),
                Err(MoveError::BadToken(junk.to_owned())),
                "{junk}"
            );
        }
        assert!(parse_moves("", 3).unwrap().is_empty());
    }

    #[test]
    fn formats_back_to_tokens() {
        let text = "R U' F2 L D' B";
        let algo = parse_moves(text, 3).unwrap();
        assert_eq!(format_moves(&algo, 3).unwrap(), text);
    }

    #[test]
    fn inner_layer_turns_have_no_spelling() {
        let mut algo = Algorithm::new();
        algo.add(Axis::X, Direction::Clockwise, 1);
        assert!(matches!(
            format_moves(&algo, 3),
            Err(MoveError::Unrepresentable(_))
        ));
    }

    #[test]
    fn sexy_move_times_six_is_identity() {
        let mut cube = CubeGeometry::cube(3);
        let algo = parse_moves("R U R' U'", 3).unwrap();
        for _ in 0..6 {
            for step in algo.steps() {
                cube.rotate_layer(step.axis, step.direction, step.start_layer)
                    .unwrap();
            }
        }
        assert!(cube.is_solved());
    }

    proptest! {
        #[test]
        fn parse_format_round_trip(tokens in prop::collection::vec("[URFDLB]('|2)?", 0..12)) {
            let text = tokens.join(" ");
            let algo = parse_moves(&text, 3).unwrap();
            let formatted = format_moves(&algo, 3).unwrap();
            let reparsed = parse_moves(&formatted, 3).unwrap();
            prop_assert_eq!(reparsed.steps(), algo.steps());
        }
    }
}
