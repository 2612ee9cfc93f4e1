//! The layer-by-layer strategy and its per-stage scan functions.

#[cfg(test)]
mod tests;

use cubetwist_core::Direction::{Clockwise, CounterClockwise};
use cubetwist_core::{
    Algorithm, Axis, Color, CubeGeometry, Direction, Face, Piece, PieceId, PieceKind, Rotation,
    Square,
};
use cubetwist_sim::{SolverAction, SolverStrategy};

/// The only cube size this strategy understands.
const SIZE: usize = 3;

/// Layer rows along the Y axis.
const INNER: usize = 0;
const MIDDLE: usize = 1;
const OUTER: usize = 2;

/// Cell positions within a 3×3 face, row-major from the top-left.
const FIRST_ROW_LEFT: usize = 0;
const FIRST_ROW_CENTER: usize = 1;
const FIRST_ROW_RIGHT: usize = 2;
const MID_ROW_LEFT: usize = 3;
const MID_ROW_RIGHT: usize = 5;
const LAST_ROW_LEFT: usize = 6;
const LAST_ROW_MIDDLE: usize = 7;
const LAST_ROW_RIGHT: usize = 8;

/// Edge cells of the top face. "Far" borders the back face, "near" the front.
const EDGE_TOP_FAR: usize = 1;
const EDGE_TOP_LEFT: usize = 3;
const EDGE_TOP_RIGHT: usize = 5;
const EDGE_TOP_NEAR: usize = 7;

/// Edge cells of the bottom face, whose first row borders the front.
const EDGE_BOTTOM_NEAR: usize = 1;
const EDGE_BOTTOM_LEFT: usize = 3;
const EDGE_BOTTOM_FAR: usize = 7;

/// Edge slots of the middle layer, in its piece-list order.
const EDGE_MIDDLE_FRONT_LEFT: usize = 0;
const EDGE_MIDDLE_FRONT_RIGHT: usize = 2;
const EDGE_MIDDLE_RIGHT_BACK: usize = 4;
const EDGE_MIDDLE_LEFT_BACK: usize = 6;

/// Corner slots counted clockwise around the Y axis, starting between the
/// front and right faces. The numbering lines up with [`Face`] indices so a
/// slot can be compared against the side face it touches.
const CORNER_FRONT_RIGHT: usize = 0;
const CORNER_RIGHT_BACK: usize = 1;
const CORNER_BACK_LEFT: usize = 2;
const CORNER_LEFT_FRONT: usize = 3;

/// Stages of the beginner's method, in solve order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Stage {
    FirstFaceCross,
    FirstFaceCorners,
    MiddleLayer,
    LastFaceCross,
    LastFaceCrossAlign,
    LastFaceCorners,
    LastFaceCornerAlign,
    Done,
}

/// A reactive beginner's-method solver for the 3×3×3 cube.
///
/// The first face is built around whatever color the top center shows when
/// solving starts. Once its cross and corners are in place the cube is flipped
/// so that face rides on the bottom, and the remaining stages work the top
/// layer in the usual way.
#[derive(Debug, Clone)]
pub struct LayerSolver {
    stage: Stage,
    top_color: Color,
    bottom_color: Color,
}

impl Default for LayerSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerSolver {
    /// A solver ready to be attached to an engine.
    pub fn new() -> Self {
        Self {
            stage: Stage::FirstFaceCross,
            top_color: Color::GRAY,
            bottom_color: Color::GRAY,
        }
    }
}

impl SolverStrategy for LayerSolver {
    fn start(&mut self, cube: &CubeGeometry) -> Result<(), String> {
        if cube.sizes() != (SIZE, SIZE, SIZE) {
            return Err(format!(
                "layer-by-layer solving needs a 3x3x3 cube, this one is {:?}",
                cube.sizes()
            ));
        }
        let mut centers: Vec<Color> = Face::ALL.iter().map(|&f| cube.center_color(f)).collect();
        centers.sort();
        centers.dedup();
        if centers.len() != Face::ALL.len() {
            return Err("face centers do not show six distinct colors".into());
        }
        self.stage = Stage::FirstFaceCross;
        self.top_color = cube.center_color(Face::Top);
        self.bottom_color = cube.center_color(Face::Bottom);
        log::info!(
            "solving: first face {}, last face {}",
            self.top_color,
            self.bottom_color
        );
        Ok(())
    }

    fn next(&mut self, cube: &CubeGeometry) -> SolverAction {
        loop {
            let step = match self.stage {
                Stage::FirstFaceCross => self.first_face_cross(cube),
                Stage::FirstFaceCorners => self.first_face_corners(cube),
                Stage::MiddleLayer => self.middle_layer(cube),
                Stage::LastFaceCross => self.last_face_cross(cube),
                Stage::LastFaceCrossAlign => self.last_face_cross_align(cube),
                Stage::LastFaceCorners => self.last_face_corners(cube),
                Stage::LastFaceCornerAlign => self.last_face_corner_align(cube),
                Stage::Done => return SolverAction::Solved,
            };
            match step {
                Ok(Some(algo)) => return SolverAction::Run(algo),
                // The stage finished without needing moves; re-scan under the
                // next one.
                Ok(None) => {}
                Err(reason) => return SolverAction::Stuck(reason),
            }
        }
    }
}

/// Each stage function re-scans the cube and either emits the next corrective
/// sequence (`Ok(Some(_))`), advances `self.stage` because the stage's
/// predicate already holds (`Ok(None)`), or gives up on a sticker pattern no
/// legal cube can show (`Err`).
impl LayerSolver {
    fn first_face_cross(&mut self, cube: &CubeGeometry) -> Result<Option<Algorithm>, String> {
        let side_faces = [Face::Back, Face::Left, Face::Right, Face::Front];
        for i in [EDGE_TOP_NEAR, EDGE_TOP_RIGHT, EDGE_TOP_LEFT, EDGE_TOP_FAR] {
            let side_face = side_faces[i / 2];
            if cell_color(cube, Face::Top, i) == self.top_color
                && cell_color(cube, side_face, FIRST_ROW_CENTER) == cube.center_color(side_face)
            {
                continue;
            }
            if i != EDGE_TOP_NEAR {
                // Yaw the offending edge around to the near slot first.
                let dir = if i == EDGE_TOP_LEFT {
                    CounterClockwise
                } else {
                    Clockwise
                };
                let count = if i == EDGE_TOP_FAR { 2 } else { 1 };
                return Ok(Some(Algorithm::rotate_whole(Axis::Y, dir, SIZE, count)));
            }
            return self
                .fix_first_face_edge(cube, cube.center_color(side_face))
                .map(Some);
        }
        log::info!("first face cross in place");
        self.stage = Stage::FirstFaceCorners;
        Ok(None)
    }

    /// Locates the cross edge showing `side_color` and routes to the fix for
    /// its current layer.
    fn fix_first_face_edge(
        &self,
        cube: &CubeGeometry,
        side_color: Color,
    ) -> Result<Algorithm, String> {
        let colors = [self.top_color, side_color];
        let mut found = None;
        for row in 0..SIZE {
            if let Some(pos) = find_piece(cube, cube.layer(Axis::Y, row), &colors) {
                found = Some((row, pos));
                break;
            }
        }
        let Some((row, pos)) = found else {
            return Err(format!(
                "no edge piece shows {} and {}",
                self.top_color, side_color
            ));
        };
        log::debug!("cross edge {}-{} at row {row} pos {pos}", colors[0], colors[1]);

        if row == INNER && cell_color(cube, Face::Bottom, pos) == self.top_color {
            Ok(self.cross_edge_from_bottom_face(pos))
        } else if row == INNER {
            Ok(self.cross_edge_from_lower_layer(cube, pos))
        } else if row == MIDDLE {
            self.cross_edge_from_middle_layer(cube, pos)
        } else {
            self.cross_edge_from_top_layer(cube, pos)
        }
    }

    /// The edge sits in the top layer but flipped or in the wrong slot: drop
    /// it into the middle layer, then bring it back up oriented.
    fn cross_edge_from_top_layer(
        &self,
        cube: &CubeGeometry,
        pos: usize,
    ) -> Result<Algorithm, String> {
        let top_sq = square_by_color(cube, OUTER, pos, self.top_color)?;
        let mut algo = Algorithm::new();
        let middle = if pos == EDGE_TOP_FAR || pos == EDGE_TOP_NEAR {
            let face = if top_sq.face() == Face::Top {
                Face::Right
            } else {
                top_sq.face()
            };
            algo.add(
                Axis::Z,
                Clockwise,
                if pos == EDGE_TOP_FAR { INNER } else { OUTER },
            );
            let slot = if pos == EDGE_TOP_FAR {
                EDGE_MIDDLE_RIGHT_BACK
            } else {
                EDGE_MIDDLE_FRONT_RIGHT
            };
            middle_edge_to_top_edge(slot, face)?
        } else {
            let face = if top_sq.face() == Face::Top {
                Face::Front
            } else {
                top_sq.face()
            };
            algo.add(
                Axis::X,
                CounterClockwise,
                if pos == EDGE_TOP_LEFT { INNER } else { OUTER },
            );
            let slot = if pos == EDGE_TOP_LEFT {
                EDGE_MIDDLE_FRONT_LEFT
            } else {
                EDGE_MIDDLE_FRONT_RIGHT
            };
            middle_edge_to_top_edge(slot, face)?
        };
        for rotation in middle {
            algo.add_step(rotation);
        }
        Ok(algo)
    }

    fn cross_edge_from_middle_layer(
        &self,
        cube: &CubeGeometry,
        pos: usize,
    ) -> Result<Algorithm, String> {
        let top_sq = square_by_color(cube, MIDDLE, pos, self.top_color)?;
        Ok(Algorithm::from_steps(middle_edge_to_top_edge(
            pos,
            top_sq.face(),
        )?))
    }

    /// The edge is in the bottom layer with its anchor sticker on a side
    /// face.
    fn cross_edge_from_lower_layer(&self, cube: &CubeGeometry, pos: usize) -> Algorithm {
        let mut algo = Algorithm::new();
        if pos == EDGE_BOTTOM_NEAR || pos == EDGE_BOTTOM_FAR {
            algo.add(Axis::Y, Clockwise, INNER);
        }
        if pos <= EDGE_BOTTOM_LEFT {
            algo.add(Axis::X, Clockwise, INNER);
            algo.add(Axis::Z, Clockwise, OUTER);
            // Undo the side turn if it displaced a finished cross edge.
            if cell_color(cube, Face::Top, EDGE_TOP_LEFT) == self.top_color
                && cell_color(cube, Face::Left, FIRST_ROW_CENTER) == cube.center_color(Face::Left)
            {
                algo.add(Axis::X, CounterClockwise, INNER);
            }
        } else {
            algo.add(Axis::X, Clockwise, OUTER);
            algo.add(Axis::Z, CounterClockwise, OUTER);
            if cell_color(cube, Face::Top, EDGE_TOP_RIGHT) == self.top_color
                && cell_color(cube, Face::Right, FIRST_ROW_CENTER) == cube.center_color(Face::Right)
            {
                algo.add(Axis::X, CounterClockwise, OUTER);
            }
        }
        algo
    }

    /// The edge is on the bottom face with its anchor sticker facing down:
    /// spin it under its slot and bring it straight up.
    fn cross_edge_from_bottom_face(&self, pos: usize) -> Algorithm {
        let mut algo = Algorithm::new();
        if pos != EDGE_BOTTOM_NEAR {
            let dir = if pos == EDGE_BOTTOM_LEFT {
                CounterClockwise
            } else {
                Clockwise
            };
            algo.add(Axis::Y, dir, INNER);
            if pos == EDGE_BOTTOM_FAR {
                algo.repeat_last_step();
            }
        }
        algo.add(Axis::Z, CounterClockwise, OUTER);
        algo.repeat_last_step();
        algo
    }

    fn first_face_corners(&mut self, cube: &CubeGeometry) -> Result<Option<Algorithm>, String> {
        let corners = [
            LAST_ROW_RIGHT,
            LAST_ROW_LEFT,
            FIRST_ROW_LEFT,
            FIRST_ROW_RIGHT,
        ];
        for &c in &corners {
            let piece = cube.layer(Axis::Y, INNER)[c];
            let Some(sq) = cube.piece_square_of_color(piece, self.top_color) else {
                continue;
            };
            if cube.square(sq).face() == Face::Bottom {
                continue;
            }
            log::debug!("first face corner side-out at {c}");
            return self.corner_from_side_sticker(cube, c).map(Some);
        }
        for &c in &corners {
            let piece = cube.layer(Axis::Y, INNER)[c];
            let Some(sq) = cube.piece_square_of_color(piece, self.top_color) else {
                continue;
            };
            if cube.square(sq).face() != Face::Bottom {
                return Err("corner sticker neither on a side face nor on the bottom".into());
            }
            log::debug!("first face corner facing down at {c}");
            return self.corner_from_bottom_sticker(cube, c).map(Some);
        }
        for &c in &corners {
            let piece = cube.layer(Axis::Y, OUTER)[c];
            if !is_corner_aligned(cube, cube.piece(piece)) {
                log::debug!("first face corner misplaced in top layer at {c}");
                return self.corner_from_top_layer(cube, c).map(Some);
            }
        }
        log::info!("first face complete, turning it to the bottom");
        self.stage = Stage::MiddleLayer;
        if cube.is_solved() {
            return Ok(None);
        }
        // The remaining stages work the top layer, so the finished face gets
        // out of the way first.
        Ok(Some(Algorithm::rotate_whole(Axis::X, Clockwise, SIZE, 2)))
    }

    /// Bottom-layer corner with the anchor sticker on a side face: park it
    /// under its slot and hook it up.
    fn corner_from_side_sticker(
        &self,
        cube: &CubeGeometry,
        corner: usize,
    ) -> Result<Algorithm, String> {
        let piece = cube.piece(cube.layer(Axis::Y, INNER)[corner]);
        if piece.kind() != PieceKind::Corner {
            return Err(format!("piece at bottom slot {corner} is not a corner"));
        }
        let mut anchor_face = None;
        let mut side = None;
        for &id in piece.squares() {
            let sq = cube.square(id);
            if sq.color() == self.top_color {
                anchor_face = Some(sq.face());
            } else if sq.face() != Face::Bottom {
                side = Some((sq.color(), sq.face()));
            }
        }
        let Some(anchor_face) = anchor_face else {
            return Err("corner lost its anchor sticker mid-scan".into());
        };
        let Some((side_color, side_face)) = side else {
            return Err("corner shows no side sticker".into());
        };
        let home = self.color_face(cube, side_color)?;

        let mut rotations = bring_color_to_front(cube, side_color);
        let mut count = (home.index() as isize - side_face.index() as isize).abs();
        let mut dir = if home.index() > side_face.index() {
            CounterClockwise
        } else {
            Clockwise
        };
        if count == 3 {
            count = 1;
            dir = dir.rev();
        }
        for _ in 0..count {
            rotations.push(Rotation::new(Axis::Y, dir, INNER));
        }

        let relative = (anchor_face.index() as isize - side_face.index() as isize).rem_euclid(4);
        if relative == Face::Right.index() as isize {
            rotations.push(Rotation::new(Axis::X, CounterClockwise, OUTER));
            rotations.push(Rotation::new(Axis::Y, Clockwise, INNER));
            rotations.push(Rotation::new(Axis::X, Clockwise, OUTER));
        } else if relative == Face::Left.index() as isize {
            rotations.push(Rotation::new(Axis::X, CounterClockwise, INNER));
            rotations.push(Rotation::new(Axis::Y, CounterClockwise, INNER));
            rotations.push(Rotation::new(Axis::X, Clockwise, INNER));
        } else {
            return Err(format!("corner sticker at unexpected offset {relative}"));
        }
        Ok(Algorithm::from_steps(rotations))
    }

    /// Bottom-layer corner with the anchor sticker facing straight down:
    /// kick it sideways first, the side-sticker fix picks it up on re-scan.
    fn corner_from_bottom_sticker(
        &self,
        cube: &CubeGeometry,
        corner: usize,
    ) -> Result<Algorithm, String> {
        let piece = cube.piece(cube.layer(Axis::Y, INNER)[corner]);
        if piece.kind() != PieceKind::Corner {
            return Err(format!("piece at bottom slot {corner} is not a corner"));
        }
        let mut side1 = None;
        let mut side2 = None;
        for &id in piece.squares() {
            let sq = cube.square(id);
            if sq.color() == self.top_color {
                if sq.face() != Face::Bottom {
                    return Err("anchor sticker moved off the bottom face mid-scan".into());
                }
            } else if side1.is_none() {
                side1 = Some(sq.color());
            } else {
                side2 = Some(sq.color());
            }
        }
        let (Some(side1), Some(side2)) = (side1, side2) else {
            return Err("corner shows fewer than two side stickers".into());
        };
        let face1 = self.color_face(cube, side1)?;
        let face2 = self.color_face(cube, side2)?;

        let mut desired_cell = FIRST_ROW_LEFT;
        if face1 == Face::Back || face2 == Face::Back {
            desired_cell = LAST_ROW_LEFT;
        }
        if face1 == Face::Right || face2 == Face::Right {
            desired_cell += 2;
        }

        let current = corner_slot(Face::Bottom, corner)?;
        let mut algo = Algorithm::new();
        if current != CORNER_FRONT_RIGHT {
            let dir = if desired_cell == FIRST_ROW_LEFT {
                CounterClockwise
            } else {
                Clockwise
            };
            algo.add_spanning(Axis::Y, dir, 0, SIZE);
            if desired_cell == LAST_ROW_LEFT {
                algo.add_spanning(Axis::Y, dir, 0, SIZE);
            }
        }
        let mut delta = current as isize - CORNER_FRONT_RIGHT as isize;
        let mut dir = if delta > 0 {
            Clockwise
        } else {
            CounterClockwise
        };
        delta = delta.abs();
        if delta == 3 {
            delta = 1;
            dir = dir.rev();
        }
        for _ in 0..delta {
            algo.add(Axis::Y, dir, INNER);
        }

        algo.add(Axis::X, CounterClockwise, OUTER);
        algo.add(Axis::Y, Clockwise, INNER);
        algo.repeat_last_step();
        algo.add(Axis::X, Clockwise, OUTER);
        Ok(algo)
    }

    /// Corner in the top layer but twisted or in the wrong slot: pull it down
    /// through the front-right column.
    fn corner_from_top_layer(
        &self,
        cube: &CubeGeometry,
        corner: usize,
    ) -> Result<Algorithm, String> {
        let piece_id = cube.layer(Axis::Y, OUTER)[corner];
        if cube.piece(piece_id).kind() != PieceKind::Corner {
            return Err(format!("piece at top slot {corner} is not a corner"));
        }
        let Some(sq) = cube.piece_square_of_color(piece_id, self.top_color) else {
            return Err("misplaced top-layer corner without the anchor color".into());
        };
        let mut anchor_face = cube.square(sq).face().index() as isize;
        let top = Face::Top.index() as isize;

        let mut algo = Algorithm::new();
        let current = corner_slot(Face::Top, corner)?;
        if current != CORNER_FRONT_RIGHT {
            let dir = if current == CORNER_LEFT_FRONT {
                CounterClockwise
            } else {
                Clockwise
            };
            algo.add_spanning(Axis::Y, dir, 0, SIZE);
            if anchor_face != top {
                anchor_face += if dir == CounterClockwise { 1 } else { -1 };
            }
            if current == CORNER_BACK_LEFT {
                algo.add_spanning(Axis::Y, dir, 0, SIZE);
                if anchor_face != top {
                    anchor_face += if dir == CounterClockwise { 1 } else { -1 };
                }
            }
        }
        // A sticker facing up falls to the front case after the mod.
        let corrected = anchor_face.rem_euclid(4) as usize;
        if corrected == Face::Front.index() {
            algo.add(Axis::Z, Clockwise, OUTER);
            algo.add(Axis::Y, CounterClockwise, INNER);
            algo.add(Axis::Z, CounterClockwise, OUTER);
        } else if corrected == Face::Right.index() {
            algo.add(Axis::X, CounterClockwise, OUTER);
            algo.add(Axis::Y, Clockwise, INNER);
            algo.add(Axis::X, Clockwise, OUTER);
        } else {
            return Err(format!("corner sticker toward face {corrected} after yaw"));
        }
        Ok(algo)
    }

    fn middle_layer(&mut self, cube: &CubeGeometry) -> Result<Option<Algorithm>, String> {
        // Edges waiting in the top layer go straight into their slots.
        for e in [LAST_ROW_MIDDLE, MID_ROW_RIGHT, FIRST_ROW_CENTER, MID_ROW_LEFT] {
            let piece = cube.layer(Axis::Y, OUTER)[e];
            if cube.piece_has_color(piece, self.bottom_color)
                || cube.piece_has_color(piece, self.top_color)
            {
                continue;
            }
            log::debug!("inserting top-layer edge at {e}");
            return self.insert_middle_edge(cube, e).map(Some);
        }

        // Anything still stuck sideways in a middle slot gets ejected upward
        // and handled on the next scan.
        for e in [
            EDGE_MIDDLE_FRONT_LEFT,
            EDGE_MIDDLE_FRONT_RIGHT,
            EDGE_MIDDLE_RIGHT_BACK,
            EDGE_MIDDLE_LEFT_BACK,
        ] {
            let piece = cube.layer(Axis::Y, MIDDLE)[e];
            if !cube.piece_has_color(piece, self.bottom_color)
                && !cube.piece_has_color(piece, self.top_color)
                && !is_edge_aligned(cube, cube.piece(piece))
            {
                log::debug!("ejecting unaligned middle edge at {e}");
                return Ok(Some(bring_up_middle_edge(e)));
            }
        }

        log::info!("middle layer complete");
        self.stage = Stage::LastFaceCross;
        Ok(None)
    }

    /// Inserts the top-layer edge at `edge` into its middle slot, yawing and
    /// spinning the top layer as needed so one of the two canned insertions
    /// applies.
    fn insert_middle_edge(&self, cube: &CubeGeometry, edge: usize) -> Result<Algorithm, String> {
        let piece = cube.piece(cube.layer(Axis::Y, OUTER)[edge]);
        if piece.kind() != PieceKind::Edge {
            return Err(format!("piece at top slot {edge} is not an edge"));
        }

        let mut color1 = None;
        let mut color2 = None;
        let mut outer = None;
        for &id in piece.squares() {
            let sq = cube.square(id);
            if sq.color() == self.bottom_color {
                return Err("middle-layer edge carries the last face color".into());
            }
            if sq.face() != Face::Top {
                outer = Some((sq.color(), sq.face()));
            }
            if color1.is_none() {
                color1 = Some(sq.color());
            } else if color2.is_none() {
                color2 = Some(sq.color());
            }
        }
        let (Some(color1), Some(color2)) = (color1, color2) else {
            return Err("middle-layer edge shows fewer than two stickers".into());
        };
        let Some((outer_color, outer_face)) = outer else {
            return Err("top-layer edge with no side sticker".into());
        };

        if outer_face == Face::Right && cube.center_color(Face::Right) == outer_color {
            return Ok(insert_from_right_face());
        }
        if outer_face == Face::Front && cube.center_color(Face::Front) == outer_color {
            return Ok(insert_from_front_face());
        }

        let face1 = self.color_face(cube, color1)?;
        let face2 = self.color_face(cube, color2)?;
        let align = align_over_home_face(
            outer_face,
            if color1 == outer_color { face1 } else { face2 },
        )?;

        // Yaw so the target slot sits at front-right before the spin.
        let mut cell = FIRST_ROW_LEFT;
        if face1 == Face::Back || face2 == Face::Back {
            cell = LAST_ROW_LEFT;
        }
        if face1 == Face::Right || face2 == Face::Right {
            cell += 2;
        }
        let current = corner_slot(Face::Top, cell)?;

        let mut algo = Algorithm::new();
        if current != CORNER_FRONT_RIGHT {
            let dir = if current == CORNER_LEFT_FRONT {
                CounterClockwise
            } else {
                Clockwise
            };
            algo.add_spanning(Axis::Y, dir, 0, SIZE);
            if current == CORNER_BACK_LEFT {
                algo.repeat_last_step();
            }
        }
        if let Some(align) = align {
            algo.append(&align);
        }
        Ok(algo)
    }

    fn last_face_cross(&mut self, cube: &CubeGeometry) -> Result<Option<Algorithm>, String> {
        let last_color = cube.center_color(Face::Top);
        // Indexed so that position i borders side face i.
        let cells = [EDGE_TOP_NEAR, EDGE_TOP_RIGHT, EDGE_TOP_FAR, EDGE_TOP_LEFT];
        let colors = cells.map(|c| cell_color(cube, Face::Top, c));
        let shown = colors.iter().filter(|&&c| c == last_color).count();

        if shown == colors.len() {
            log::info!("last face cross in place");
            self.stage = Stage::LastFaceCrossAlign;
            return Ok(None);
        }

        let mut algo = Algorithm::new();
        if shown != 2 {
            algo.append(&last_face_cross_algo(1));
            return Ok(Some(algo));
        }

        let front = Face::Front.index();
        let right = Face::Right.index();
        let back = Face::Back.index();
        let left = Face::Left.index();
        if colors[front] == colors[back] || colors[left] == colors[right] {
            // A line through the center; stand it horizontal first.
            if colors[front] == colors[back] {
                algo.add_spanning(Axis::Y, Clockwise, 0, SIZE);
            }
            algo.append(&last_face_cross_algo(1));
            return Ok(Some(algo));
        }

        // An angle; yaw it into the front-left corner.
        let mut count = 0;
        let mut dir = Clockwise;
        if colors[front] == last_color {
            if colors[right] == last_color {
                count = 2;
            } else if colors[left] == last_color {
                count = 1;
            } else {
                return Err("two matching cross edges form neither a line nor an angle".into());
            }
        } else if colors[back] == last_color && colors[right] == last_color {
            count = 1;
            dir = CounterClockwise;
        }
        for _ in 0..count {
            algo.add(Axis::Y, dir, OUTER);
        }
        algo.append(&last_face_cross_algo(2));
        Ok(Some(algo))
    }

    fn last_face_cross_align(&mut self, cube: &CubeGeometry) -> Result<Option<Algorithm>, String> {
        let cells = [LAST_ROW_MIDDLE, MID_ROW_RIGHT, FIRST_ROW_CENTER, MID_ROW_LEFT];
        let mut offsets = [0usize; 4];
        for (i, &cell) in cells.iter().enumerate() {
            let piece = cube.piece(cube.layer(Axis::Y, OUTER)[cell]);
            let side = piece
                .squares()
                .iter()
                .map(|&id| cube.square(id))
                .find(|sq| sq.face() != Face::Top)
                .ok_or("top edge piece with no side sticker")?;
            let home = self.color_face(cube, side.color())?;
            if home == Face::Top || home == Face::Bottom {
                return Err("cross edge side color belongs to the top or bottom".into());
            }
            offsets[i] = (home.index() as isize - i as isize).rem_euclid(4) as usize;
        }
        log::debug!("cross edge offsets {offsets:?}");

        if offsets.windows(2).any(|pair| pair[0] != pair[1]) {
            return self.fix_cross_alignment(offsets).map(Some);
        }
        if offsets[0] != 0 {
            // Every edge is off by the same amount; one top spin fixes all.
            let mut algo = Algorithm::new();
            let dir = if offsets[0] == 3 {
                Clockwise
            } else {
                CounterClockwise
            };
            algo.add(Axis::Y, dir, OUTER);
            if offsets[0] == 2 {
                algo.repeat_last_step();
            }
            return Ok(Some(algo));
        }
        log::info!("last face cross aligned");
        self.stage = Stage::LastFaceCorners;
        Ok(None)
    }

    fn fix_cross_alignment(&self, offsets: [usize; 4]) -> Result<Algorithm, String> {
        let mut aligned = 0;
        let mut first_aligned = None;
        for (i, &offset) in offsets.iter().enumerate() {
            if offset == 0 {
                aligned += 1;
                first_aligned.get_or_insert(i);
            }
        }

        let mut algo = Algorithm::new();
        match (aligned, first_aligned) {
            (0, _) => {
                algo.add(Axis::Y, Clockwise, OUTER);
            }
            (2, Some(first)) => {
                let next = (first + 1) % offsets.len();
                let prev = (first + offsets.len() - 1) % offsets.len();
                if offsets[next] == 0 || offsets[prev] == 0 {
                    // Adjacent pair aligned: spin and retry.
                    algo.add(Axis::Y, Clockwise, OUTER);
                } else {
                    algo.append(&cross_align_algo(Clockwise));
                }
            }
            (1, Some(first)) => {
                if first != Face::Front.index() {
                    let dir = if first == Face::Left.index() {
                        CounterClockwise
                    } else {
                        Clockwise
                    };
                    algo.add_spanning(Axis::Y, dir, 0, SIZE);
                    if first == Face::Back.index() {
                        algo.repeat_last_step();
                    }
                }
                let next = offsets[(first + 1) % offsets.len()];
                let dir = if next == 1 { CounterClockwise } else { Clockwise };
                algo.append(&cross_align_algo(dir));
            }
            _ => return Err(format!("impossible cross alignment pattern {offsets:?}")),
        }
        Ok(algo)
    }

    fn last_face_corners(&mut self, cube: &CubeGeometry) -> Result<Option<Algorithm>, String> {
        let cells = [
            LAST_ROW_RIGHT,
            FIRST_ROW_RIGHT,
            FIRST_ROW_LEFT,
            LAST_ROW_LEFT,
        ];
        let mut positioned = 0;
        let mut first_positioned = None;
        for &cell in &cells {
            let piece = cube.piece(cube.layer(Axis::Y, OUTER)[cell]);
            if is_corner_aligned(cube, piece) {
                positioned += 1;
                if first_positioned.is_none() {
                    first_positioned = Some(corner_slot(Face::Top, cell)?);
                }
            }
        }

        if positioned == cells.len() {
            log::info!("last face corners positioned");
            self.stage = Stage::LastFaceCornerAlign;
            return Ok(None);
        }
        let mut algo = Algorithm::new();
        if positioned == 0 {
            algo.append(&corner_cycle_algo());
            return Ok(Some(algo));
        }
        let (1, Some(first)) = (positioned, first_positioned) else {
            return Err(format!("{positioned} positioned top corners, expected 0 or 1"));
        };
        if first != CORNER_FRONT_RIGHT {
            let dir = if first == CORNER_LEFT_FRONT {
                CounterClockwise
            } else {
                Clockwise
            };
            algo.add_spanning(Axis::Y, dir, 0, SIZE);
            if first == CORNER_BACK_LEFT {
                algo.repeat_last_step();
            }
        }
        algo.append(&corner_cycle_algo());
        Ok(Some(algo))
    }

    fn last_face_corner_align(&mut self, cube: &CubeGeometry) -> Result<Option<Algorithm>, String> {
        let last_color = cube.center_color(Face::Top);
        if cell_color(cube, Face::Top, LAST_ROW_RIGHT) == last_color {
            if check_top_corners(cube) {
                log::info!("solved");
                self.stage = Stage::Done;
                return Ok(None);
            }
            // This corner is done; spin the next one into the work slot.
            let mut algo = Algorithm::new();
            algo.add(Axis::Y, Clockwise, OUTER);
            return Ok(Some(algo));
        }
        Ok(Some(corner_twist_algo()))
    }

    /// The face whose center currently shows `color`.
    fn color_face(&self, cube: &CubeGeometry, color: Color) -> Result<Face, String> {
        Face::ALL
            .into_iter()
            .find(|&face| cube.center_color(face) == color)
            .ok_or_else(|| format!("color {color} is on no face center"))
    }
}

/// Color of one cell of a face.
fn cell_color(cube: &CubeGeometry, face: Face, cell: usize) -> Color {
    cube.square(cube.face_squares(face)[cell]).color()
}

/// Position within `pieces` of the piece showing exactly `colors`, in any
/// order, or `None`.
fn find_piece(cube: &CubeGeometry, pieces: &[PieceId], colors: &[Color]) -> Option<usize> {
    let mut wanted = colors.to_vec();
    wanted.sort();
    pieces.iter().position(|&id| {
        let piece = cube.piece(id);
        if piece.squares().len() != wanted.len() {
            return false;
        }
        let mut shown: Vec<Color> = piece
            .squares()
            .iter()
            .map(|&sq| cube.square(sq).color())
            .collect();
        shown.sort();
        shown == wanted
    })
}

/// The square of the piece at `(row, pos)` in the Y-layer decomposition that
/// shows `color`.
fn square_by_color(
    cube: &CubeGeometry,
    row: usize,
    pos: usize,
    color: Color,
) -> Result<&Square, String> {
    let piece = cube.layer(Axis::Y, row)[pos];
    cube.piece_square_of_color(piece, color)
        .map(|id| cube.square(id))
        .ok_or_else(|| format!("no {color} sticker on piece at row {row} pos {pos}"))
}

/// Whether every sticker of a corner piece matches its face's center.
fn is_corner_aligned(cube: &CubeGeometry, piece: &Piece) -> bool {
    piece.squares().len() == 3
        && piece.squares().iter().all(|&id| {
            let sq = cube.square(id);
            sq.color() == cube.center_color(sq.face())
        })
}

/// Whether every sticker of an edge piece matches its face's center.
fn is_edge_aligned(cube: &CubeGeometry, piece: &Piece) -> bool {
    piece.squares().iter().all(|&id| {
        let sq = cube.square(id);
        sq.color() == cube.center_color(sq.face())
    })
}

/// Maps a corner cell of the top or bottom face to its slot index around the
/// Y axis.
fn corner_slot(face: Face, cell: usize) -> Result<usize, String> {
    let slot = match face {
        Face::Bottom => match cell {
            FIRST_ROW_RIGHT => CORNER_FRONT_RIGHT,
            LAST_ROW_RIGHT => CORNER_RIGHT_BACK,
            LAST_ROW_LEFT => CORNER_BACK_LEFT,
            FIRST_ROW_LEFT => CORNER_LEFT_FRONT,
            _ => return Err(format!("cell {cell} is not a bottom face corner")),
        },
        Face::Top => match cell {
            FIRST_ROW_LEFT => CORNER_BACK_LEFT,
            FIRST_ROW_RIGHT => CORNER_RIGHT_BACK,
            LAST_ROW_LEFT => CORNER_LEFT_FRONT,
            LAST_ROW_RIGHT => CORNER_FRONT_RIGHT,
            _ => return Err(format!("cell {cell} is not a top face corner")),
        },
        _ => return Err(format!("no corner slots on face {face}")),
    };
    Ok(slot)
}

/// Moves that lift the edge in middle slot `slot` into the top layer with the
/// sticker currently on `sticker_face` ending up on top.
fn middle_edge_to_top_edge(slot: usize, sticker_face: Face) -> Result<Vec<Rotation>, String> {
    let mut rotations = Vec::new();
    match slot {
        EDGE_MIDDLE_FRONT_LEFT => match sticker_face {
            Face::Front => {
                rotations.push(Rotation::new(Axis::Y, Clockwise, OUTER));
                rotations.push(Rotation::new(Axis::X, Clockwise, INNER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
            }
            Face::Left => {
                rotations.push(Rotation::new(Axis::Z, Clockwise, OUTER));
            }
            face => return Err(unreachable_sticker(slot, face)),
        },
        EDGE_MIDDLE_FRONT_RIGHT => match sticker_face {
            Face::Front => {
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::X, Clockwise, OUTER));
                rotations.push(Rotation::new(Axis::Y, Clockwise, OUTER));
            }
            Face::Right => {
                rotations.push(Rotation::new(Axis::Z, CounterClockwise, OUTER));
            }
            face => return Err(unreachable_sticker(slot, face)),
        },
        EDGE_MIDDLE_RIGHT_BACK => match sticker_face {
            Face::Back => {
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::X, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::Y, Clockwise, OUTER));
            }
            Face::Right => {
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::Z, CounterClockwise, INNER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
            }
            face => return Err(unreachable_sticker(slot, face)),
        },
        EDGE_MIDDLE_LEFT_BACK => match sticker_face {
            Face::Back => {
                rotations.push(Rotation::new(Axis::Y, Clockwise, OUTER));
                rotations.push(Rotation::new(Axis::X, CounterClockwise, INNER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
            }
            Face::Left => {
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::Z, Clockwise, INNER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
                rotations.push(Rotation::new(Axis::Y, CounterClockwise, OUTER));
            }
            face => return Err(unreachable_sticker(slot, face)),
        },
        _ => return Err(format!("{slot} is not a middle edge slot")),
    }
    Ok(rotations)
}

fn unreachable_sticker(slot: usize, face: Face) -> String {
    format!("edge in middle slot {slot} cannot show a sticker on {face}")
}

/// Whole-cube rotations that bring the face whose center shows `color` to
/// the front.
fn bring_color_to_front(cube: &CubeGeometry, color: Color) -> Vec<Rotation> {
    let mut rotations = Vec::new();
    if color == cube.center_color(Face::Front) {
        return rotations;
    }
    let mut axis = Axis::Y;
    let mut dir = Clockwise;
    if color == cube.center_color(Face::Top) {
        axis = Axis::X;
        dir = CounterClockwise;
    } else if color == cube.center_color(Face::Bottom) {
        axis = Axis::X;
        dir = Clockwise;
    } else if color == cube.center_color(Face::Left) {
        dir = CounterClockwise;
    }
    rotations.push(Rotation::whole_cube(axis, dir, SIZE));
    if color == cube.center_color(Face::Back) {
        rotations.push(Rotation::whole_cube(axis, dir, SIZE));
    }
    rotations
}

/// Ejects the edge in middle slot `slot` into the top layer: yaw the slot to
/// front-right, then run the front insertion, which swaps slot and top edge.
fn bring_up_middle_edge(slot: usize) -> Algorithm {
    let mut algo = Algorithm::new();
    if slot != EDGE_MIDDLE_FRONT_RIGHT {
        let dir = if slot == EDGE_MIDDLE_FRONT_LEFT {
            CounterClockwise
        } else {
            Clockwise
        };
        let count = if slot == EDGE_MIDDLE_LEFT_BACK { 2 } else { 1 };
        for _ in 0..count {
            algo.add_spanning(Axis::Y, dir, 0, SIZE);
        }
    }
    algo.append(&insert_from_front_face());
    algo
}

/// Top spins that park a top-layer edge over the side face it belongs to.
fn align_over_home_face(start: Face, dest: Face) -> Result<Option<Algorithm>, String> {
    let (start, dest) = (start.index() as isize, dest.index() as isize);
    if start > 3 || dest > 3 {
        return Err(format!(
            "cannot slide a top edge from face {start} to face {dest}"
        ));
    }
    let mut delta = (start - dest).abs();
    if delta == 0 {
        return Ok(None);
    }
    let mut dir = if start > dest {
        Clockwise
    } else {
        CounterClockwise
    };
    if delta == 3 {
        delta = 1;
        dir = dir.rev();
    }
    let mut algo = Algorithm::new();
    for _ in 0..delta {
        algo.add(Axis::Y, dir, OUTER);
    }
    Ok(Some(algo))
}

/// Drops the top-front edge into the front-right slot, ejecting whatever was
/// there.
fn insert_from_front_face() -> Algorithm {
    let mut algo = Algorithm::new();
    algo.add(Axis::Y, Clockwise, OUTER);
    algo.add(Axis::X, Clockwise, OUTER);
    algo.add(Axis::Y, CounterClockwise, OUTER);
    algo.add(Axis::X, CounterClockwise, OUTER);
    algo.add(Axis::Y, CounterClockwise, OUTER);
    algo.add(Axis::Z, CounterClockwise, OUTER);
    algo.add(Axis::Y, Clockwise, OUTER);
    algo.add(Axis::Z, Clockwise, OUTER);
    algo
}

/// Drops the top-right edge into the front-right slot.
fn insert_from_right_face() -> Algorithm {
    let mut algo = Algorithm::new();
    algo.add(Axis::Y, CounterClockwise, OUTER);
    algo.add(Axis::Z, CounterClockwise, OUTER);
    algo.add(Axis::Y, Clockwise, OUTER);
    algo.add(Axis::Z, Clockwise, OUTER);
    algo.add(Axis::Y, Clockwise, OUTER);
    algo.add(Axis::X, Clockwise, OUTER);
    algo.add(Axis::Y, CounterClockwise, OUTER);
    algo.add(Axis::X, CounterClockwise, OUTER);
    algo
}

/// `count` sexy-move repetitions under a front-face conjugate; flips top
/// cross edges.
fn last_face_cross_algo(count: usize) -> Algorithm {
    let mut algo = Algorithm::new();
    algo.add(Axis::Z, Clockwise, OUTER);
    for _ in 0..count {
        algo.add(Axis::X, Clockwise, OUTER);
        algo.add(Axis::Y, Clockwise, OUTER);
        algo.add(Axis::X, CounterClockwise, OUTER);
        algo.add(Axis::Y, CounterClockwise, OUTER);
    }
    algo.add(Axis::Z, CounterClockwise, OUTER);
    algo
}

/// Three-cycle of top cross edges, keeping the front one fixed.
fn cross_align_algo(direction: Direction) -> Algorithm {
    let mut algo = Algorithm::new();
    if direction == Clockwise {
        algo.add(Axis::X, Clockwise, INNER);
        algo.add(Axis::Y, CounterClockwise, OUTER);
        algo.add(Axis::X, CounterClockwise, INNER);
        algo.add(Axis::Y, CounterClockwise, OUTER);
        algo.add(Axis::X, Clockwise, INNER);
        algo.add(Axis::Y, CounterClockwise, OUTER);
        algo.repeat_last_step();
        algo.add(Axis::X, CounterClockwise, INNER);
    } else {
        algo.add(Axis::X, Clockwise, OUTER);
        algo.add(Axis::Y, Clockwise, OUTER);
        algo.add(Axis::X, CounterClockwise, OUTER);
        algo.add(Axis::Y, Clockwise, OUTER);
        algo.add(Axis::X, Clockwise, OUTER);
        algo.add(Axis::Y, CounterClockwise, OUTER);
        algo.repeat_last_step();
        algo.add(Axis::X, CounterClockwise, OUTER);
    }
    algo
}

/// Three-cycle of top corners, keeping the front-right one fixed.
fn corner_cycle_algo() -> Algorithm {
    let mut algo = Algorithm::new();
    algo.add(Axis::X, CounterClockwise, INNER);
    algo.add(Axis::Y, Clockwise, OUTER);
    algo.add(Axis::X, Clockwise, OUTER);
    algo.add(Axis::Y, CounterClockwise, OUTER);
    algo.add(Axis::X, Clockwise, INNER);
    algo.add(Axis::Y, Clockwise, OUTER);
    algo.add(Axis::X, CounterClockwise, OUTER);
    algo.add(Axis::Y, CounterClockwise, OUTER);
    algo
}

/// Twists the top front-right corner in place; repeated runs cycle through
/// its three orientations while churning the rest of the cube, which the
/// final top spins restore.
fn corner_twist_algo() -> Algorithm {
    let mut algo = Algorithm::new();
    algo.add(Axis::X, CounterClockwise, OUTER);
    algo.add(Axis::Y, Clockwise, INNER);
    algo.add(Axis::X, Clockwise, OUTER);
    algo.add(Axis::Y, CounterClockwise, INNER);
    algo
}

/// Whether all four top-layer corners sit aligned.
fn check_top_corners(cube: &CubeGeometry) -> bool {
    [
        LAST_ROW_RIGHT,
        FIRST_ROW_RIGHT,
        FIRST_ROW_LEFT,
        LAST_ROW_LEFT,
    ]
    .into_iter()
    .all(|cell| is_corner_aligned(cube, cube.piece(cube.layer(Axis::Y, OUTER)[cell])))
}
