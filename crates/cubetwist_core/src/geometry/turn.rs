//! Turn algebra: layer turns, non-symmetric 180° turns, and whole-cube
//! reorientations.
//!
//! Turns move colors across fixed square ids. A layer turn touches the four
//! square strips ringing the layer plus, for boundary layers, the
//! perpendicular face itself. A whole-cube reorientation instead permutes
//! the face lists and rebuilds pieces and layers from scratch.

use std::mem;

use super::{CubeGeometry, GeometryError, SquareId};
use crate::axes::{Axis, Direction, Face};
use crate::RING_SIDES;

impl CubeGeometry {
    /// Turns one depth slice of the cube a quarter turn (symmetric axis) or
    /// half turn (non-symmetric axis).
    ///
    /// Layer indices count Left→Right along X, Bottom→Top along Y and
    /// Back→Front along Z. Boundary layers also rotate the perpendicular
    /// face; layer 0 faces away from the viewer along its axis, so its face
    /// rotation runs opposite to the requested direction.
    pub fn rotate_layer(
        &mut self,
        axis: Axis,
        direction: Direction,
        layer: usize,
    ) -> Result<(), GeometryError> {
        let (sx, sy, sz) = self.sizes();
        let axis_size = self.size(axis);
        if layer >= axis_size {
            return Err(GeometryError::LayerOutOfRange {
                axis,
                layer,
                size: axis_size,
            });
        }

        let front = &self.faces[Face::Front.index()];
        let back = &self.faces[Face::Back.index()];
        let left = &self.faces[Face::Left.index()];
        let right = &self.faces[Face::Right.index()];
        let top = &self.faces[Face::Top.index()];
        let bottom = &self.faces[Face::Bottom.index()];

        // Strips run in the ring's cyclic order: 0 and 2 oppose each other,
        // as do 1 and 3.
        let mut strips: [Vec<SquareId>; RING_SIDES] = Default::default();
        let (bounding, opposite, w, h, ring_size);
        match axis {
            Axis::X => {
                strips[0] = (0..sy).map(|i| front[sx * i + layer]).collect();
                strips[2] = (0..sy)
                    .map(|i| back[(sy - 1 - i) * sx + (sx - 1 - layer)])
                    .collect();
                strips[1] = (0..sz).map(|i| top[sx * i + layer]).collect();
                strips[3] = (0..sz).map(|i| bottom[sx * i + layer]).collect();
                bounding = match layer {
                    0 => Some(Face::Left),
                    l if l == sx - 1 => Some(Face::Right),
                    _ => None,
                };
                opposite = (sx == 1).then_some(Face::Right);
                w = sz;
                h = sy;
                ring_size = sy;
            }
            Axis::Y => {
                strips[0] = (0..sx).map(|i| front[(sy - 1 - layer) * sx + i]).collect();
                strips[2] = (0..sx).map(|i| back[(sy - 1 - layer) * sx + i]).collect();
                strips[1] = (0..sz).map(|i| left[(sy - 1 - layer) * sz + i]).collect();
                strips[3] = (0..sz).map(|i| right[(sy - 1 - layer) * sz + i]).collect();
                bounding = match layer {
                    0 => Some(Face::Bottom),
                    l if l == sy - 1 => Some(Face::Top),
                    _ => None,
                };
                opposite = (sy == 1).then_some(Face::Top);
                w = sx;
                h = sz;
                ring_size = sx;
            }
            Axis::Z => {
                strips[0] = (0..sx).map(|i| top[sx * layer + i]).collect();
                strips[2] = (0..sx)
                    .map(|i| bottom[sx * (sz - 1 - layer) + (sx - 1 - i)])
                    .collect();
                strips[1] = (0..sy).map(|i| right[sz * i + (sz - 1 - layer)]).collect();
                strips[3] = (0..sy).map(|i| left[sz * (sy - 1 - i) + layer]).collect();
                bounding = match layer {
                    0 => Some(Face::Back),
                    l if l == sz - 1 => Some(Face::Front),
                    _ => None,
                };
                opposite = (sz == 1).then_some(Face::Front);
                w = sx;
                h = sy;
                ring_size = sx;
            }
        }

        if self.is_symmetric_around(axis) {
            self.rotate_ring_colors(&strips, direction, ring_size);
            if let Some(face) = bounding {
                let face_dir = if layer == 0 { direction.rev() } else { direction };
                let ids = self.faces[face.index()].clone();
                self.rotate_face_colors(&ids, face_dir, ring_size);
                if let Some(face) = opposite {
                    let ids = self.faces[face.index()].clone();
                    self.rotate_face_colors(&ids, direction, ring_size);
                }
            }
        } else {
            // A quarter turn of a skewed layer would not map the cube onto
            // itself, so both directions degrade to a half turn.
            self.skewed_rotate_ring_colors(&strips);
            if let Some(face) = bounding {
                let ids = self.faces[face.index()].clone();
                self.skewed_rotate_face_colors(&ids, w, h);
                if let Some(face) = opposite {
                    let ids = self.faces[face.index()].clone();
                    self.skewed_rotate_face_colors(&ids, w, h);
                }
            }
        }
        Ok(())
    }

    /// Cyclically shifts colors around the four strips of a ring. Strip
    /// order as gathered is the counterclockwise sense; a clockwise turn
    /// walks them in reverse.
    fn rotate_ring_colors(
        &mut self,
        strips: &[Vec<SquareId>; RING_SIDES],
        direction: Direction,
        size: usize,
    ) {
        let order: [usize; RING_SIDES] = match direction {
            Direction::CounterClockwise => [0, 1, 2, 3],
            Direction::Clockwise => [3, 2, 1, 0],
        };
        let saved: Vec<_> = (0..size)
            .map(|i| self.square(strips[order[0]][i]).color)
            .collect();
        for k in 0..RING_SIDES - 1 {
            for i in 0..size {
                let color = self.square(strips[order[k + 1]][i]).color;
                self.set_square_color(strips[order[k]][i], color);
            }
        }
        for i in 0..size {
            self.set_square_color(strips[order[RING_SIDES - 1]][i], saved[i]);
        }
    }

    /// Rotates an `n`×`n` face in place by cycling the four co-rotating
    /// positions of its border ring, then recursing on the interior.
    fn rotate_face_colors(&mut self, ids: &[SquareId], direction: Direction, size: usize) {
        let n = size;
        match direction {
            Direction::CounterClockwise => {
                let saved: Vec<_> = (0..n - 1).map(|i| self.square(ids[i]).color).collect();
                for i in 0..n - 1 {
                    self.copy_color(ids[i * n + (n - 1)], ids[i]);
                }
                for i in 0..n - 1 {
                    self.copy_color(ids[n * n - 1 - i], ids[i * n + (n - 1)]);
                }
                for i in 0..n - 1 {
                    self.copy_color(ids[n * (n - 1 - i)], ids[n * n - 1 - i]);
                }
                for i in 0..n - 1 {
                    self.set_square_color(ids[n * (n - 1 - i)], saved[i]);
                }
            }
            Direction::Clockwise => {
                let saved: Vec<_> = (0..n - 1).map(|i| self.square(ids[i]).color).collect();
                for i in 0..n - 1 {
                    self.copy_color(ids[n * (n - 1 - i)], ids[i]);
                }
                for i in 0..n - 1 {
                    self.copy_color(ids[n * n - 1 - i], ids[n * (n - 1 - i)]);
                }
                for i in 0..n - 1 {
                    self.copy_color(ids[i * n + (n - 1)], ids[n * n - 1 - i]);
                }
                for i in 0..n - 1 {
                    self.set_square_color(ids[i * n + (n - 1)], saved[i]);
                }
            }
        }
        if n > 3 {
            let mut interior = Vec::with_capacity((n - 2) * (n - 2));
            for i in 1..n - 1 {
                for j in 1..n - 1 {
                    interior.push(ids[i * n + j]);
                }
            }
            self.rotate_face_colors(&interior, direction, n - 2);
        }
    }

    /// Half-turn color shuffle for a skewed layer's ring: opposing strips
    /// swap wholesale.
    fn skewed_rotate_ring_colors(&mut self, strips: &[Vec<SquareId>; RING_SIDES]) {
        for i in 0..strips[0].len() {
            self.swap_colors(strips[0][i], strips[2][i]);
        }
        for i in 0..strips[1].len() {
            self.swap_colors(strips[1][i], strips[3][i]);
        }
    }

    /// Half-turn of a `w`×`h` face: reverse along both diagonals, then
    /// recurse on the interior while it stays two-dimensional.
    fn skewed_rotate_face_colors(&mut self, ids: &[SquareId], w: usize, h: usize) {
        if w == 1 || h == 1 {
            let len = ids.len();
            for i in 0..len / 2 {
                self.swap_colors(ids[i], ids[len - 1 - i]);
            }
            return;
        }
        for i in 0..w - 1 {
            self.swap_colors(ids[i], ids[w * h - 1 - i]);
        }
        for i in 1..h {
            self.swap_colors(ids[i * w], ids[w * (h - i) - 1]);
        }
        if w + h <= 6 || w < 3 || h < 3 {
            return;
        }
        let mut interior = Vec::with_capacity((w - 2) * (h - 2));
        for i in 1..w - 1 {
            for j in 1..h - 1 {
                interior.push(ids[j * w + i]);
            }
        }
        self.skewed_rotate_face_colors(&interior, w - 2, h - 2);
    }

    /// Reorients the whole cube a quarter turn around `axis`, then rebuilds
    /// pieces, layers and face labels. Unlike layer turns this permutes the
    /// face square lists themselves.
    pub fn rotate_whole(&mut self, axis: Axis, direction: Direction) {
        // Three clockwise quarter turns equal one counterclockwise turn.
        let count = match direction {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => 3,
        };
        for _ in 0..count {
            match axis {
                Axis::X => self.reorient_x(),
                Axis::Y => self.reorient_y(),
                Axis::Z => self.reorient_z(),
            }
        }
        self.rebuild();
        self.relabel_faces();
    }

    /// Clockwise quarter turn of the whole cube around X, as seen from the
    /// right face.
    fn reorient_x(&mut self) {
        let (sx, sy, sz) = self.sizes();
        let temp = self.faces[Face::Top.index()].clone();
        self.faces[Face::Top.index()] = mem::take(&mut self.faces[Face::Front.index()]);
        self.faces[Face::Front.index()] = mem::take(&mut self.faces[Face::Bottom.index()]);
        let back = mem::take(&mut self.faces[Face::Back.index()]);
        let mut bottom = Vec::with_capacity(back.len());
        for i in (0..sy).rev() {
            for j in (0..sx).rev() {
                bottom.push(back[i * sx + j]);
            }
        }
        self.faces[Face::Bottom.index()] = bottom;
        let mut new_back = Vec::with_capacity(temp.len());
        for i in (0..sz).rev() {
            for j in (0..sx).rev() {
                new_back.push(temp[i * sx + j]);
            }
        }
        self.faces[Face::Back.index()] = new_back;
        self.faces[Face::Right.index()] =
            rotate_matrix(&self.faces[Face::Right.index()], sz, sy);
        self.faces[Face::Left.index()] =
            rotate_matrix_ccw(&self.faces[Face::Left.index()], sz, sy);
        self.size.swap(Axis::Y as usize, Axis::Z as usize);
    }

    /// Clockwise quarter turn of the whole cube around Y, as seen from the
    /// top face.
    fn reorient_y(&mut self) {
        let (sx, _sy, sz) = self.sizes();
        let temp = mem::take(&mut self.faces[Face::Front.index()]);
        self.faces[Face::Front.index()] = mem::take(&mut self.faces[Face::Right.index()]);
        self.faces[Face::Right.index()] = mem::take(&mut self.faces[Face::Back.index()]);
        self.faces[Face::Back.index()] = mem::take(&mut self.faces[Face::Left.index()]);
        self.faces[Face::Left.index()] = temp;
        self.faces[Face::Top.index()] = rotate_matrix(&self.faces[Face::Top.index()], sx, sz);
        self.faces[Face::Bottom.index()] =
            rotate_matrix_ccw(&self.faces[Face::Bottom.index()], sx, sz);
        self.size.swap(Axis::X as usize, Axis::Z as usize);
    }

    /// Clockwise quarter turn of the whole cube around Z, as seen from the
    /// front face.
    fn reorient_z(&mut self) {
        let (sx, sy, sz) = self.sizes();
        let temp = self.faces[Face::Top.index()].clone();
        self.faces[Face::Top.index()] = rotate_matrix(&self.faces[Face::Left.index()], sz, sy);
        self.faces[Face::Left.index()] =
            rotate_matrix(&self.faces[Face::Bottom.index()], sx, sz);
        self.faces[Face::Bottom.index()] =
            rotate_matrix(&self.faces[Face::Right.index()], sz, sy);
        self.faces[Face::Right.index()] = rotate_matrix(&temp, sx, sz);
        self.faces[Face::Front.index()] =
            rotate_matrix(&self.faces[Face::Front.index()], sx, sy);
        self.faces[Face::Back.index()] =
            rotate_matrix_ccw(&self.faces[Face::Back.index()], sx, sy);
        self.size.swap(Axis::X as usize, Axis::Y as usize);
    }

    fn relabel_faces(&mut self) {
        for face in Face::ALL {
            let ids = self.faces[face.index()].clone();
            for id in ids {
                self.squares[id.0 as usize].face = face;
            }
        }
    }

    fn copy_color(&mut self, from: SquareId, to: SquareId) {
        let color = self.square(from).color;
        self.set_square_color(to, color);
    }

    fn swap_colors(&mut self, a: SquareId, b: SquareId) {
        let ca = self.square(a).color;
        let cb = self.square(b).color;
        self.set_square_color(a, cb);
        self.set_square_color(b, ca);
    }
}

/// Clockwise rotation of a `w`×`h` row-major matrix; the result is `h`×`w`.
fn rotate_matrix(m: &[SquareId], w: usize, h: usize) -> Vec<SquareId> {
    let mut out = Vec::with_capacity(m.len());
    for i in 0..w {
        for j in (0..h).rev() {
            out.push(m[j * w + i]);
        }
    }
    out
}

/// Counterclockwise rotation of a `w`×`h` row-major matrix.
fn rotate_matrix_ccw(m: &[SquareId], w: usize, h: usize) -> Vec<SquareId> {
    let mut out = Vec::with_capacity(m.len());
    for i in (0..w).rev() {
        for j in 0..h {
            out.push(m[j * w + i]);
        }
    }
    out
}
