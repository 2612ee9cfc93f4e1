//! Sticker colors and the per-cube color scheme.

use std::fmt;

use crate::axes::Face;

/// RGBA sticker color.
///
/// The engine never interprets the channels; colors are only compared for
/// equality and forwarded to whatever renderer is attached.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(pub u32);

impl Color {
    /// Classic red.
    pub const RED: Color = Color(0xDD2211FF);
    /// Classic green.
    pub const GREEN: Color = Color(0x22DD11FF);
    /// Classic orange.
    pub const ORANGE: Color = Color(0xFF7F10FF);
    /// Classic white.
    pub const WHITE: Color = Color(0xFFFFFFFF);
    /// Classic yellow.
    pub const YELLOW: Color = Color(0xFFFF00FF);
    /// Classic blue.
    pub const BLUE: Color = Color(0x0000FFFF);
    /// Placeholder for unpainted stickers.
    pub const GRAY: Color = Color(0x7F7F7FFF);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Assignment of a color to each face of a freshly built cube.
///
/// This is an explicit per-cube value rather than process-wide state, so two
/// cubes with different schemes can coexist (and tests can run in parallel).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ColorScheme {
    /// Front face color.
    pub front: Color,
    /// Right face color.
    pub right: Color,
    /// Back face color.
    pub back: Color,
    /// Left face color.
    pub left: Color,
    /// Top face color.
    pub top: Color,
    /// Bottom face color.
    pub bottom: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            front: Color::BLUE,
            right: Color::RED,
            back: Color::GREEN,
            left: Color::ORANGE,
            top: Color::WHITE,
            bottom: Color::YELLOW,
        }
    }
}

impl ColorScheme {
    /// The color this scheme paints on `face`.
    pub fn color(&self, face: Face) -> Color {
        match face {
            Face::Front => self.front,
            Face::Right => self.right,
            Face::Back => self.back,
            Face::Left => self.left,
            Face::Top => self.top,
            Face::Bottom => self.bottom,
        }
    }

    /// The face this scheme paints with `color`, or `None` if the color is
    /// not part of the scheme.
    pub fn face_of(&self, color: Color) -> Option<Face> {
        Face::ALL.into_iter().find(|&f| self.color(f) == color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_is_a_bijection() {
        let scheme = ColorScheme::default();
        for face in Face::ALL {
            assert_eq!(scheme.face_of(scheme.color(face)), Some(face));
        }
        assert_eq!(scheme.face_of(Color::GRAY), None);
    }
}
