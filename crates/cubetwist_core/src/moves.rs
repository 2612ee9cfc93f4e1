//! Turn commands and replayable move sequences.

use std::fmt;

use crate::axes::{Axis, Direction};

/// A single layer-turn command.
///
/// `start_layer` counts from the negative end of the axis; `layer_count`
/// layers starting there turn together. A rotation spanning every layer of
/// its axis reorients the whole cube instead of permuting colors.
///
/// The `angle` field is transient animation state owned by whoever is
/// executing the rotation; queued copies always carry `angle == 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    /// Axis to turn around.
    pub axis: Axis,
    /// Turn direction, relative to the axis's positive direction.
    pub direction: Direction,
    /// First layer to turn.
    pub start_layer: usize,
    /// Number of contiguous layers to turn.
    pub layer_count: usize,
    /// Current animation angle in degrees; negative for clockwise turns.
    pub angle: f32,
}

impl Rotation {
    /// Single-layer turn.
    pub fn new(axis: Axis, direction: Direction, layer: usize) -> Self {
        Self::spanning(axis, direction, layer, 1)
    }

    /// Turn of `layer_count` contiguous layers starting at `start_layer`.
    pub fn spanning(axis: Axis, direction: Direction, start_layer: usize, layer_count: usize) -> Self {
        Self {
            axis,
            direction,
            start_layer,
            layer_count,
            angle: 0.0,
        }
    }

    /// Whole-cube reorientation around `axis` for a cube of `size` layers.
    pub fn whole_cube(axis: Axis, direction: Direction, size: usize) -> Self {
        Self::spanning(axis, direction, 0, size)
    }

    /// The inverse move: same layers, opposite direction, angle reset.
    #[must_use]
    pub fn reverse(&self) -> Rotation {
        Rotation {
            direction: self.direction.rev(),
            ..self.template()
        }
    }

    /// A copy with the animation angle reset, suitable for queueing.
    #[must_use]
    pub fn template(&self) -> Rotation {
        Rotation {
            angle: 0.0,
            ..*self
        }
    }

    /// Advances the animation angle by `delta` degrees, clamping its
    /// magnitude to `max_angle`. Clockwise turns use negative angles.
    pub fn advance(&mut self, delta: f32, max_angle: f32) {
        match self.direction {
            Direction::Clockwise => {
                self.angle = (self.angle - delta).max(-max_angle);
            }
            Direction::CounterClockwise => {
                self.angle = (self.angle + delta).min(max_angle);
            }
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "axis {}, {}, layer {}",
            self.axis, self.direction, self.start_layer
        )?;
        if self.layer_count > 1 {
            write!(f, " ({} layers)", self.layer_count)?;
        }
        Ok(())
    }
}

/// An ordered, replayable sequence of rotations with a read cursor.
///
/// Steps are handed out as fresh copies so an in-flight animation can never
/// mutate the queued template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Algorithm {
    steps: Vec<Rotation>,
    cursor: usize,
}

impl Algorithm {
    /// An empty algorithm.
    pub fn new() -> Self {
        Self::default()
    }

    /// An algorithm consisting of the given steps.
    pub fn from_steps(steps: impl IntoIterator<Item = Rotation>) -> Self {
        Self {
            steps: steps.into_iter().map(|r| r.template()).collect(),
            cursor: 0,
        }
    }

    /// `count` repetitions of a whole-cube reorientation.
    pub fn rotate_whole(axis: Axis, direction: Direction, size: usize, count: usize) -> Self {
        Self::from_steps((0..count).map(|_| Rotation::whole_cube(axis, direction, size)))
    }

    /// Appends one step.
    pub fn add_step(&mut self, rotation: Rotation) {
        self.steps.push(rotation.template());
    }

    /// Appends a single-layer turn.
    pub fn add(&mut self, axis: Axis, direction: Direction, layer: usize) {
        self.add_step(Rotation::new(axis, direction, layer));
    }

    /// Appends a multi-layer turn.
    pub fn add_spanning(&mut self, axis: Axis, direction: Direction, start: usize, count: usize) {
        self.add_step(Rotation::spanning(axis, direction, start, count));
    }

    /// Appends every step of `other`.
    pub fn append(&mut self, other: &Algorithm) {
        for step in &other.steps {
            self.add_step(*step);
        }
    }

    /// Duplicates the final step, if any. Used to express "do that twice".
    pub fn repeat_last_step(&mut self) {
        if let Some(&last) = self.steps.last() {
            self.add_step(last);
        }
    }

    /// Whether the cursor has consumed every step.
    pub fn is_done(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Returns a copy of the next step and advances the cursor, or `None`
    /// once the algorithm is exhausted.
    pub fn next_step(&mut self) -> Option<Rotation> {
        let step = self.steps.get(self.cursor)?.template();
        self.cursor += 1;
        Some(step)
    }

    /// Total number of steps, consumed or not.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the algorithm contains no steps at all.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps, regardless of cursor position.
    pub fn steps(&self) -> &[Rotation] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reverse_flips_direction_only() {
        let r = Rotation::spanning(Axis::Z, Direction::Clockwise, 1, 2);
        let rev = r.reverse();
        assert_eq!(rev.axis, Axis::Z);
        assert_eq!(rev.direction, Direction::CounterClockwise);
        assert_eq!(rev.start_layer, 1);
        assert_eq!(rev.layer_count, 2);
        assert_eq!(rev.reverse(), r);
    }

    #[test]
    fn advance_clamps_at_max() {
        let mut r = Rotation::new(Axis::X, Direction::Clockwise, 0);
        for _ in 0..100 {
            r.advance(4.0, 90.0);
        }
        assert_eq!(r.angle, -90.0);

        let mut r = Rotation::new(Axis::X, Direction::CounterClockwise, 0);
        r.advance(4.0, 90.0);
        assert_eq!(r.angle, 4.0);
    }

    #[test]
    fn cursor_yields_template_copies() {
        let mut algo = Algorithm::new();
        algo.add(Axis::Y, Direction::Clockwise, 2);
        algo.repeat_last_step();
        assert_eq!(algo.len(), 2);

        let mut first = algo.next_step().expect("first step");
        first.angle = -45.0;
        let second = algo.next_step().expect("second step");
        assert_eq!(second.angle, 0.0);
        assert!(algo.is_done());
        assert_eq!(algo.next_step(), None);
    }

    #[test]
    fn repeat_on_empty_is_a_no_op() {
        let mut algo = Algorithm::new();
        algo.repeat_last_step();
        assert!(algo.is_empty());
    }
}
