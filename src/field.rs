// src/field.rs

/// Dense 2D scalar field (e.g. a heightfield).
///
/// Values are stored row-major: `index = row * nx + col`, with `nx` columns
/// and `ny` rows. `values.len() == nx * ny` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField2D {
    nx: usize,
    ny: usize,
    values: Vec<f32>,
}

impl ScalarField2D {
    /// Create a zero-filled field with `nx` columns and `ny` rows.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self::filled(nx, ny, 0.0)
    }

    /// Create a field with every cell set to `value`.
    pub fn filled(nx: usize, ny: usize, value: f32) -> Self {
        Self {
            nx,
            ny,
            values: vec![value; nx * ny],
        }
    }

    /// Wrap an existing flat row-major buffer.
    pub fn from_values(nx: usize, ny: usize, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            nx * ny,
            "flat buffer length must equal nx*ny"
        );
        Self { nx, ny, values }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert (row, col) indices to a flat index.
    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.ny && col < self.nx);
        row * self.nx + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: f32) {
        let id = self.idx(row, col);
        self.values[id] = v;
    }

    pub fn fill(&mut self, v: f32) {
        self.values.fill(v);
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Minimum value of the field (0 for an empty field).
    pub fn min(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Maximum value of the field (0 for an empty field).
    pub fn max(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Rescale the field in place so it spans [0, 1].
    ///
    /// A constant field is left unchanged.
    pub fn normalize(&mut self) {
        let min = self.min();
        let max = self.max();
        let range = max - min;
        if range <= 0.0 {
            return;
        }
        for v in &mut self.values {
            *v = (*v - min) / range;
        }
    }

    /// Affine transform in place: `v' = a * v + b`.
    pub fn affine(&mut self, a: f32, b: f32) {
        for v in &mut self.values {
            *v = a * *v + b;
        }
    }
}
