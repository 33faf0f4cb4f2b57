/// Stack of square feature planes describing a position and its recent
/// history, as fed to the policy/value oracle.
///
/// Layout is plane-major: `data[plane * size * size + row * size + col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPlanes {
    planes: usize,
    size: usize,
    data: Vec<f32>,
}

impl HistoryPlanes {
    /// Panics if `data.len() != planes * size * size`.
    pub fn new(planes: usize, size: usize, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            planes * size * size,
            "plane data does not match shape ({planes}, {size}, {size})"
        );
        Self { planes, size, data }
    }

    pub fn zeros(planes: usize, size: usize) -> Self {
        Self {
            planes,
            size,
            data: vec![0.0; planes * size * size],
        }
    }

    pub fn planes(&self) -> usize {
        self.planes
    }

    /// Side length of the square board
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> usize {
        self.size * self.size
    }

    pub fn plane(&self, p: usize) -> &[f32] {
        let n = self.cells();
        &self.data[p * n..(p + 1) * n]
    }

    pub fn plane_mut(&mut self, p: usize) -> &mut [f32] {
        let n = self.cells();
        &mut self.data[p * n..(p + 1) * n]
    }

    pub fn get(&self, plane: usize, row: usize, col: usize) -> f32 {
        self.data[plane * self.cells() + row * self.size + col]
    }

    pub fn set(&mut self, plane: usize, row: usize, col: usize, value: f32) {
        let idx = plane * self.cells() + row * self.size + col;
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
