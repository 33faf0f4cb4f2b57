use crate::planes::HistoryPlanes;

/// One element of the dihedral group of the square: an optional mirror
/// (left-right) followed by a number of clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symmetry {
    rotations: u8,
    reflected: bool,
}

impl Symmetry {
    pub const IDENTITY: Symmetry = Symmetry {
        rotations: 0,
        reflected: false,
    };

    pub const ALL: [Symmetry; 8] = [
        Symmetry { rotations: 0, reflected: false },
        Symmetry { rotations: 1, reflected: false },
        Symmetry { rotations: 2, reflected: false },
        Symmetry { rotations: 3, reflected: false },
        Symmetry { rotations: 0, reflected: true },
        Symmetry { rotations: 1, reflected: true },
        Symmetry { rotations: 2, reflected: true },
        Symmetry { rotations: 3, reflected: true },
    ];

    pub fn new(rotations: u8, reflected: bool) -> Self {
        Self {
            rotations: rotations % 4,
            reflected,
        }
    }

    /// `index` is taken modulo 8, in the order of [`Symmetry::ALL`].
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    fn map_cell(&self, row: usize, col: usize, size: usize) -> (usize, usize) {
        let (mut r, mut c) = if self.reflected {
            (row, size - 1 - col)
        } else {
            (row, col)
        };
        for _ in 0..self.rotations {
            (r, c) = (c, size - 1 - r);
        }
        (r, c)
    }

    /// Move every board cell of `data` to its image under this symmetry.
    ///
    /// Entries past the first `size * size` (e.g. a pass action) are copied
    /// unchanged. Panics if `data` is shorter than the board.
    pub fn transform_cells(&self, data: &[f32], size: usize) -> Vec<f32> {
        assert!(data.len() >= size * size, "vector shorter than the board");
        let mut out = data.to_vec();
        for row in 0..size {
            for col in 0..size {
                let (r, c) = self.map_cell(row, col, size);
                out[r * size + c] = data[row * size + col];
            }
        }
        out
    }

    /// Exact inverse of [`Symmetry::transform_cells`].
    pub fn invert_cells(&self, data: &[f32], size: usize) -> Vec<f32> {
        assert!(data.len() >= size * size, "vector shorter than the board");
        let mut out = data.to_vec();
        for row in 0..size {
            for col in 0..size {
                let (r, c) = self.map_cell(row, col, size);
                out[row * size + col] = data[r * size + c];
            }
        }
        out
    }

    pub fn transform_planes(&self, history: &HistoryPlanes) -> HistoryPlanes {
        let size = history.size();
        let mut out = HistoryPlanes::zeros(history.planes(), size);
        for p in 0..history.planes() {
            let moved = self.transform_cells(history.plane(p), size);
            out.plane_mut(p).copy_from_slice(&moved);
        }
        out
    }

    pub fn transform_policy(&self, policy: &[f32], size: usize) -> Vec<f32> {
        self.transform_cells(policy, size)
    }

    /// Map a policy produced for transformed planes back onto the original board.
    pub fn invert_policy(&self, policy: &[f32], size: usize) -> Vec<f32> {
        self.invert_cells(policy, size)
    }
}

impl Default for Symmetry {
    fn default() -> Self {
        Self::IDENTITY
    }
}
