//! Cube geometry: squares, pieces, faces, and per-axis layers.
//!
//! All squares live in one arena and are addressed by [`SquareId`]; faces and
//! pieces store ids rather than owning squares. Square identity is fixed at
//! construction — turning the cube only permutes colors (and, for whole-cube
//! reorientations, relabels which face each square belongs to).

mod build;
mod turn;

use smallvec::SmallVec;
use thiserror::Error;

use crate::axes::{Axis, Face};
use crate::color::{Color, ColorScheme};
use crate::FACE_COUNT;

/// Index of a square in the geometry's arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SquareId(pub(crate) u32);

impl SquareId {
    /// Position in the arena; dense in `0..square_count`, usable as a map
    /// key.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a piece in the geometry's piece list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) u32);

/// One colored sticker on the cube's surface.
///
/// Squares never change identity; only the color mutates during turns, and
/// the face label during whole-cube reorientations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Square {
    pub(crate) face: Face,
    pub(crate) color: Color,
}

impl Square {
    /// The face this square currently belongs to.
    pub fn face(&self) -> Face {
        self.face
    }

    /// The square's current color.
    pub fn color(&self) -> Color {
        self.color
    }
}

/// Physical piece classification, decided by position within a face.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Piece at a face corner; carries up to 3 stickers on a normal cube.
    Corner,
    /// Piece on a face edge.
    Edge,
    /// Interior face piece.
    Center,
}

impl PieceKind {
    /// Most stickers a piece of this kind may carry. The bounds are loose
    /// enough to admit degenerate 1×N×M cubes.
    fn max_squares(self) -> usize {
        match self {
            PieceKind::Corner => 6,
            PieceKind::Edge => 3,
            PieceKind::Center => 2,
        }
    }
}

/// A physical piece: the set of squares that move together.
///
/// Membership is discovered once at construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub(crate) kind: PieceKind,
    pub(crate) squares: SmallVec<[SquareId; 6]>,
}

impl Piece {
    /// The piece's classification.
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Ids of the squares belonging to this piece.
    pub fn squares(&self) -> &[SquareId] {
        &self.squares
    }

    pub(crate) fn add_square(&mut self, id: SquareId) {
        if self.squares.contains(&id) {
            return;
        }
        if self.squares.len() >= self.kind.max_squares() {
            log::warn!(
                "too many squares for {:?} piece: already {}",
                self.kind,
                self.squares.len()
            );
        }
        self.squares.push(id);
    }
}

/// Error for requests that name a nonexistent layer.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Layer index at or beyond the axis size.
    #[error("layer {layer} out of range for axis {axis} of size {size}")]
    LayerOutOfRange {
        /// Axis of the rejected request.
        axis: Axis,
        /// Requested layer index.
        layer: usize,
        /// Size of the cube along that axis.
        size: usize,
    },
}

/// The full facelet-level geometry of one cube.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeGeometry {
    /// Dimensions indexed by [`Axis`].
    pub(crate) size: [usize; 3],
    pub(crate) scheme: ColorScheme,
    pub(crate) squares: Vec<Square>,
    /// Per-face square lists, row-major from the top-left looking at the
    /// face. This ordering is load-bearing: rotation algebra and the solver
    /// index into it positionally.
    pub(crate) faces: [Vec<SquareId>; FACE_COUNT],
    pub(crate) pieces: Vec<Piece>,
    /// Square → owning piece, built once at construction.
    pub(crate) piece_of: Vec<PieceId>,
    /// Per-axis layer decomposition: `layers[axis][0]` and
    /// `layers[axis][size-1]` are the two faces perpendicular to the axis.
    pub(crate) layers: [Vec<Vec<PieceId>>; 3],
}

impl CubeGeometry {
    /// Size of the cube along `axis`.
    pub fn size(&self, axis: Axis) -> usize {
        self.size[axis as usize]
    }

    /// `(x, y, z)` dimensions.
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.size[0], self.size[1], self.size[2])
    }

    /// Whether the two dimensions perpendicular to `axis` are equal. Only
    /// symmetric axes support true 90° layer turns.
    pub fn is_symmetric_around(&self, axis: Axis) -> bool {
        let (x, y, z) = self.sizes();
        match axis {
            Axis::X => y == z,
            Axis::Y => x == z,
            Axis::Z => x == y,
        }
    }

    /// The color scheme this cube was built with.
    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    /// The square with the given id.
    pub fn square(&self, id: SquareId) -> &Square {
        &self.squares[id.0 as usize]
    }

    /// Repaints a single square.
    pub fn set_square_color(&mut self, id: SquareId, color: Color) {
        self.squares[id.0 as usize].color = color;
    }

    /// Total number of squares.
    pub fn square_count(&self) -> usize {
        self.squares.len()
    }

    /// Ids of every square, in construction order.
    pub fn square_ids(&self) -> impl Iterator<Item = SquareId> + '_ {
        (0..self.squares.len() as u32).map(SquareId)
    }

    /// The squares of `face`, row-major from the top-left looking at the
    /// face.
    pub fn face_squares(&self, face: Face) -> &[SquareId] {
        &self.faces[face.index()]
    }

    /// The piece with the given id.
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0 as usize]
    }

    /// The piece owning the given square.
    pub fn piece_of(&self, id: SquareId) -> PieceId {
        self.piece_of[id.0 as usize]
    }

    /// Number of distinct pieces.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// The pieces of one depth slice along `axis`, or an error if `layer` is
    /// out of range.
    pub fn try_layer(&self, axis: Axis, layer: usize) -> Result<&[PieceId], GeometryError> {
        self.layers[axis as usize]
            .get(layer)
            .map(Vec::as_slice)
            .ok_or(GeometryError::LayerOutOfRange {
                axis,
                layer,
                size: self.size(axis),
            })
    }

    /// The pieces of one depth slice along `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `layer >= self.size(axis)`; callers with unvalidated input
    /// should use [`CubeGeometry::try_layer`].
    pub fn layer(&self, axis: Axis, layer: usize) -> &[PieceId] {
        &self.layers[axis as usize][layer]
    }

    /// Whether the piece contains a square of the given color.
    pub fn piece_has_color(&self, piece: PieceId, color: Color) -> bool {
        self.piece_square_of_color(piece, color).is_some()
    }

    /// The piece's square of the given color, if any.
    pub fn piece_square_of_color(&self, piece: PieceId, color: Color) -> Option<SquareId> {
        self.piece(piece)
            .squares
            .iter()
            .copied()
            .find(|&id| self.square(id).color == color)
    }

    /// The center color of `face`.
    pub fn center_color(&self, face: Face) -> Color {
        let ids = self.face_squares(face);
        self.square(ids[ids.len() / 2]).color
    }

    /// Whether every face is monochrome with respect to its center square.
    pub fn is_solved(&self) -> bool {
        Face::ALL.iter().all(|&face| {
            let center = self.center_color(face);
            self.face_squares(face)
                .iter()
                .all(|&id| self.square(id).color == center)
        })
    }

    /// Repaints every square of `face` with one color.
    pub fn paint_face(&mut self, face: Face, color: Color) {
        let ids = self.faces[face.index()].clone();
        for id in ids {
            self.set_square_color(id, color);
        }
    }

    /// Restores the pristine coloring given by the cube's scheme.
    pub fn reset_colors(&mut self) {
        for face in Face::ALL {
            self.paint_face(face, self.scheme.color(face));
        }
    }

    /// Number of squares currently showing `color`.
    pub fn color_count(&self, color: Color) -> usize {
        self.squares.iter().filter(|sq| sq.color == color).count()
    }
}
