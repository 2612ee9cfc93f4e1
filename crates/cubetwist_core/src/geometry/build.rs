//! Construction: square arenas, piece discovery, and layer decomposition.

use smallvec::SmallVec;

use super::{CubeGeometry, Piece, PieceId, PieceKind, Square, SquareId};
use crate::axes::{Axis, Face};
use crate::color::ColorScheme;

impl CubeGeometry {
    /// Builds a pristine `size_x`×`size_y`×`size_z` cube colored by `scheme`.
    ///
    /// Face square lists are row-major from the top-left looking straight at
    /// the face: Front and Back span `size_y`×`size_x`, Left and Right span
    /// `size_y`×`size_z`, Top and Bottom span `size_z`×`size_x`.
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero.
    pub fn new(size_x: usize, size_y: usize, size_z: usize, scheme: ColorScheme) -> Self {
        assert!(
            size_x > 0 && size_y > 0 && size_z > 0,
            "cube dimensions must be positive"
        );
        let mut geom = CubeGeometry {
            size: [size_x, size_y, size_z],
            scheme,
            squares: Vec::new(),
            faces: Default::default(),
            pieces: Vec::new(),
            piece_of: Vec::new(),
            layers: Default::default(),
        };
        geom.create_face(Face::Front, size_y, size_x);
        geom.create_face(Face::Back, size_y, size_x);
        geom.create_face(Face::Left, size_y, size_z);
        geom.create_face(Face::Right, size_y, size_z);
        geom.create_face(Face::Top, size_z, size_x);
        geom.create_face(Face::Bottom, size_z, size_x);
        geom.rebuild();
        geom
    }

    /// Builds an `n`×`n`×`n` cube with the default color scheme.
    pub fn cube(n: usize) -> Self {
        Self::new(n, n, n, ColorScheme::default())
    }

    fn create_face(&mut self, face: Face, rows: usize, cols: usize) {
        let color = self.scheme.color(face);
        let mut ids = Vec::with_capacity(rows * cols);
        for _ in 0..rows * cols {
            let id = SquareId(self.squares.len() as u32);
            self.squares.push(Square { face, color });
            ids.push(id);
        }
        self.faces[face.index()] = ids;
    }

    /// Rediscovers pieces and layers from the current face lists. Called at
    /// construction and again after whole-cube reorientations, which permute
    /// the face lists wholesale.
    pub(crate) fn rebuild(&mut self) {
        self.build_pieces();
        self.build_layers();
    }

    /// Groups touching squares into pieces. Each face contributes, for every
    /// one of its squares, the squares of adjacent faces that share the same
    /// physical cubie; groups overlapping an already-assigned square merge
    /// into that square's piece.
    fn build_pieces(&mut self) {
        let (sx, sy, sz) = self.sizes();
        let front = self.faces[Face::Front.index()].clone();
        let back = self.faces[Face::Back.index()].clone();
        let left = self.faces[Face::Left.index()].clone();
        let right = self.faces[Face::Right.index()].clone();
        let top = self.faces[Face::Top.index()].clone();
        let bottom = self.faces[Face::Bottom.index()].clone();

        self.pieces.clear();
        let mut assigned: Vec<Option<PieceId>> = vec![None; self.squares.len()];
        let mut group: SmallVec<[SquareId; 6]> = SmallVec::new();

        for i in 0..sy {
            for j in 0..sx {
                group.clear();
                group.push(front[i * sx + j]);
                if i == 0 {
                    group.push(top[(sz - 1) * sx + j]);
                }
                if i == sy - 1 {
                    group.push(bottom[j]);
                }
                if j == 0 {
                    group.push(left[sz * (i + 1) - 1]);
                }
                if j == sx - 1 {
                    group.push(right[sz * i]);
                }
                self.merge_group(&mut assigned, &group, piece_kind(i, j, sy, sx));
            }
        }

        for i in 0..sy {
            for j in 0..sz {
                group.clear();
                if j == 0 {
                    group.push(front[(i + 1) * sx - 1]);
                }
                group.push(right[i * sz + j]);
                if i == 0 {
                    group.push(top[(sz - j) * sx - 1]);
                }
                if i == sy - 1 {
                    group.push(bottom[(j + 1) * sx - 1]);
                }
                if j == sz - 1 {
                    group.push(back[i * sx]);
                }
                self.merge_group(&mut assigned, &group, piece_kind(i, j, sy, sz));
            }
        }

        for i in 0..sy {
            for j in 0..sz {
                group.clear();
                if j == sz - 1 {
                    group.push(front[i * sx]);
                }
                group.push(left[i * sz + j]);
                if i == 0 {
                    group.push(top[j * sx]);
                }
                if i == sy - 1 {
                    group.push(bottom[sx * (sz - j - 1)]);
                }
                if j == 0 {
                    group.push(back[sx * (i + 1) - 1]);
                }
                if sx == 1 {
                    group.push(right[(i + 1) * sz - 1 - j]);
                }
                self.merge_group(&mut assigned, &group, piece_kind(i, j, sy, sz));
            }
        }

        for i in 0..sz {
            for j in 0..sx {
                group.clear();
                if j == 0 {
                    group.push(left[i]);
                }
                if j == sx - 1 {
                    group.push(right[sz - 1 - i]);
                }
                if i == sz - 1 {
                    group.push(front[j]);
                }
                group.push(top[i * sx + j]);
                if i == 0 {
                    group.push(back[sx - 1 - j]);
                }
                self.merge_group(&mut assigned, &group, piece_kind(i, j, sz, sx));
            }
        }

        for i in 0..sz {
            for j in 0..sx {
                group.clear();
                if i == 0 {
                    group.push(front[sx * (sy - 1) + j]);
                }
                if j == 0 {
                    group.push(left[sz * sy - 1 - i]);
                }
                if j == sx - 1 {
                    group.push(right[sz * (sy - 1) + i]);
                }
                group.push(bottom[i * sx + j]);
                if i == sz - 1 {
                    group.push(back[sx * (sy - 1) + sx - 1 - j]);
                }
                if sy == 1 {
                    group.push(top[(sz - 1 - i) * sx + j]);
                }
                self.merge_group(&mut assigned, &group, piece_kind(i, j, sz, sx));
            }
        }

        for i in 0..sy {
            for j in 0..sx {
                group.clear();
                if i == 0 {
                    group.push(top[sx - 1 - j]);
                }
                if i == sy - 1 {
                    group.push(bottom[sx * (sz - 1) + sx - 1 - j]);
                }
                if j == 0 {
                    group.push(right[sz * (i + 1) - 1]);
                }
                if j == sx - 1 {
                    group.push(left[i * sz]);
                }
                group.push(back[i * sx + j]);
                if sz == 1 {
                    group.push(front[(i + 1) * sx - 1 - j]);
                }
                self.merge_group(&mut assigned, &group, piece_kind(i, j, sy, sx));
            }
        }

        self.piece_of = assigned
            .into_iter()
            .map(|p| p.unwrap_or_else(|| unreachable!("square not assigned to a piece")))
            .collect();
    }

    fn merge_group(
        &mut self,
        assigned: &mut [Option<PieceId>],
        group: &[SquareId],
        kind: PieceKind,
    ) {
        let pid = group
            .iter()
            .find_map(|&id| assigned[id.0 as usize])
            .unwrap_or_else(|| {
                let pid = PieceId(self.pieces.len() as u32);
                self.pieces.push(Piece {
                    kind,
                    squares: SmallVec::new(),
                });
                pid
            });
        for &id in group {
            self.pieces[pid.0 as usize].add_square(id);
            assigned[id.0 as usize] = Some(pid);
        }
    }

    /// Decomposes the cube into depth slices along each axis. Layer 0 and
    /// layer `size-1` are exactly the pieces of the two faces perpendicular
    /// to the axis; interior layers collect the pieces of one square strip
    /// from each of the four surrounding faces.
    fn build_layers(&mut self) {
        let (sx, sy, sz) = self.sizes();
        let front = self.faces[Face::Front.index()].clone();
        let back = self.faces[Face::Back.index()].clone();
        let left = self.faces[Face::Left.index()].clone();
        let right = self.faces[Face::Right.index()].clone();
        let top = self.faces[Face::Top.index()].clone();
        let bottom = self.faces[Face::Bottom.index()].clone();

        let mut x_layers = Vec::with_capacity(sx);
        for l in 0..sx {
            if l == 0 {
                x_layers.push(self.face_piece_list(Face::Left));
            } else if l == sx - 1 {
                x_layers.push(self.face_piece_list(Face::Right));
            } else {
                let mut pieces = Vec::new();
                for j in 0..sz {
                    self.push_piece(&mut pieces, top[j * sx + l]);
                }
                for j in 0..sy {
                    self.push_piece(&mut pieces, front[j * sx + l]);
                }
                for j in 0..sz {
                    self.push_piece(&mut pieces, bottom[j * sx + l]);
                }
                for j in 0..sy {
                    self.push_piece(&mut pieces, back[sx * (sy - 1 - j) + (sx - 1 - l)]);
                }
                x_layers.push(pieces);
            }
        }

        let mut y_layers = Vec::with_capacity(sy);
        for l in 0..sy {
            if l == 0 {
                y_layers.push(self.face_piece_list(Face::Bottom));
            } else if l == sy - 1 {
                y_layers.push(self.face_piece_list(Face::Top));
            } else {
                let mut pieces = Vec::new();
                for j in 0..sx {
                    self.push_piece(&mut pieces, front[(sy - 1 - l) * sx + j]);
                }
                for j in 0..sz {
                    self.push_piece(&mut pieces, right[(sy - 1 - l) * sz + j]);
                }
                for j in 0..sx {
                    self.push_piece(&mut pieces, back[(sy - 1 - l) * sx + j]);
                }
                for j in 0..sz {
                    self.push_piece(&mut pieces, left[(sy - 1 - l) * sz + j]);
                }
                y_layers.push(pieces);
            }
        }

        let mut z_layers = Vec::with_capacity(sz);
        for l in 0..sz {
            if l == 0 {
                z_layers.push(self.face_piece_list(Face::Back));
            } else if l == sz - 1 {
                z_layers.push(self.face_piece_list(Face::Front));
            } else {
                let mut pieces = Vec::new();
                for j in 0..sx {
                    self.push_piece(&mut pieces, top[l * sx + j]);
                }
                for j in 0..sy {
                    self.push_piece(&mut pieces, right[sz * j + (sz - 1 - l)]);
                }
                for j in 0..sx {
                    self.push_piece(&mut pieces, bottom[(sz - 1 - l) * sx + (sx - 1 - j)]);
                }
                for j in 0..sy {
                    self.push_piece(&mut pieces, left[(sy - 1 - j) * sz + l]);
                }
                z_layers.push(pieces);
            }
        }

        self.layers[Axis::X as usize] = x_layers;
        self.layers[Axis::Y as usize] = y_layers;
        self.layers[Axis::Z as usize] = z_layers;
    }

    /// Distinct pieces showing a sticker on `face`, in row-major square
    /// order.
    fn face_piece_list(&self, face: Face) -> Vec<PieceId> {
        let mut pieces = Vec::new();
        for &id in self.face_squares(face) {
            self.push_piece(&mut pieces, id);
        }
        pieces
    }

    fn push_piece(&self, pieces: &mut Vec<PieceId>, square: SquareId) {
        let pid = self.piece_of(square);
        if !pieces.contains(&pid) {
            pieces.push(pid);
        }
    }
}

/// Classifies a face position by whether it sits on the face's border rows
/// and columns.
fn piece_kind(row: usize, col: usize, rows: usize, cols: usize) -> PieceKind {
    let row_edge = row == 0 || row == rows - 1;
    let col_edge = col == 0 || col == cols - 1;
    match (row_edge, col_edge) {
        (true, true) => PieceKind::Corner,
        (false, false) => PieceKind::Center,
        _ => PieceKind::Edge,
    }
}
