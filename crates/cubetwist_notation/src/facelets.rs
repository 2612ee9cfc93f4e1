//! 54-character facelet strings for 3×3×3 cubes.

use cubetwist_core::{CubeGeometry, Face};

use crate::errors::FaceletError;

/// Length of a facelet string.
pub const FACELET_LEN: usize = 54;

/// Face order within a facelet string.
const FACELET_FACES: [Face; 6] = [
    Face::Top,
    Face::Right,
    Face::Front,
    Face::Bottom,
    Face::Left,
    Face::Back,
];

fn facelet_char(face: Face) -> char {
    match face {
        Face::Top => 'U',
        Face::Right => 'R',
        Face::Front => 'F',
        Face::Bottom => 'D',
        Face::Left => 'L',
        Face::Back => 'B',
    }
}

fn face_of_char(c: char) -> Option<Face> {
    match c {
        'U' => Some(Face::Top),
        'R' => Some(Face::Right),
        'F' => Some(Face::Front),
        'D' => Some(Face::Bottom),
        'L' => Some(Face::Left),
        'B' => Some(Face::Back),
        _ => None,
    }
}

fn check_cube_size(cube: &CubeGeometry) -> Result<(), FaceletError> {
    let (x, y, z) = cube.sizes();
    if (x, y, z) == (3, 3, 3) {
        Ok(())
    } else {
        Err(FaceletError::WrongCubeSize { x, y, z })
    }
}

/// Serializes the cube's sticker layout as a facelet string.
///
/// Each sticker is written as the letter of the face its color belongs to
/// under the cube's color scheme, so a solved cube yields
/// `UUUUUUUUURRRRRRRRR…`.
pub fn to_facelets(cube: &CubeGeometry) -> Result<String, FaceletError> {
    check_cube_size(cube)?;
    let mut out = String::with_capacity(FACELET_LEN);
    for face in FACELET_FACES {
        for &id in cube.face_squares(face) {
            let color = cube.square(id).color();
            let home = cube
                .scheme()
                .face_of(color)
                .ok_or(FaceletError::UnknownColor(color))?;
            out.push(facelet_char(home));
        }
    }
    Ok(out)
}

/// Repaints the cube's stickers from a facelet string.
///
/// The string is fully validated before any sticker is touched, so a failed
/// call leaves the cube unchanged.
pub fn apply_facelets(cube: &mut CubeGeometry, facelets: &str) -> Result<(), FaceletError> {
    check_cube_size(cube)?;
    let chars: Vec<char> = facelets.chars().collect();
    if chars.len() != FACELET_LEN {
        return Err(FaceletError::BadLength(chars.len()));
    }
    let homes = chars
        .iter()
        .map(|&c| face_of_char(c).ok_or(FaceletError::BadCharacter(c)))
        .collect::<Result<Vec<Face>, _>>()?;

    let mut next = homes.iter();
    for face in FACELET_FACES {
        let ids = cube.face_squares(face).to_vec();
        for id in ids {
            // Validation above guarantees one home face per square.
            if let Some(&home) = next.next() {
                let color = cube.scheme().color(home);
                cube.set_square_color(id, color);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cubetwist_core::{Axis, ColorScheme, Direction};
    use pretty_assertions::assert_eq;

    use super::*;

    const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

    #[test]
    fn solved_cube_serializes_to_home_letters() {
        let cube = CubeGeometry::cube(3);
        assert_eq!(to_facelets(&cube).unwrap(), SOLVED);
    }

    #[test]
    fn round_trip_after_scrambling() {
        let mut cube = CubeGeometry::cube(3);
        cube.rotate_layer(Axis::X, Direction::Clockwise, 2).unwrap();
        cube.rotate_layer(Axis::Y, Direction::CounterClockwise, 0).unwrap();
        cube.rotate_layer(Axis::Z, Direction::Clockwise, 1).unwrap();
        let facelets = to_facelets(&cube).unwrap();
        assert_ne!(facelets, SOLVED);

        let mut other = CubeGeometry::cube(3);
        apply_facelets(&mut other, &facelets).unwrap();
        assert_eq!(to_facelets(&other).unwrap(), facelets);
        for id in cube.square_ids() {
            assert_eq!(other.square(id).color(), cube.square(id).color());
        }
    }

    #[test]
    fn rejects_bad_input() {
        let mut cube = CubeGeometry::cube(3);
        assert_eq!(
            apply_facelets(&mut cube, "UUU"),
            Err(FaceletError::BadLength(3))
        );
        let junk = SOLVED.replace('B', "X");
        assert_eq!(
            apply_facelets(&mut cube, &junk),
            Err(FaceletError::BadCharacter('X'))
        );
        assert!(cube.is_solved());
    }

    #[test]
    fn rejects_wrong_cube_size() {
        let big = CubeGeometry::new(4, 4, 4, ColorScheme::default());
        assert_eq!(
            to_facelets(&big),
            Err(FaceletError::WrongCubeSize { x: 4, y: 4, z: 4 })
        );
    }
}
