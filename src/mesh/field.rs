//! Column-major storage for per-cell vertical profiles.
//!
//! Each cell owns one contiguous column of `n_levels` values, level 0 at the
//! top. Keeping columns contiguous lets the hydrostatic integrator, the grid
//! builder and the remapper work on plain `&[f64]` slices.

/// A per-cell vertical field (`n_cells × n_levels`).
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnField {
    n_cells: usize,
    n_levels: usize,
    data: Vec<f64>,
}

impl ColumnField {
    /// Zero-initialized field.
    pub fn new(n_cells: usize, n_levels: usize) -> Self {
        Self::filled(n_cells, n_levels, 0.0)
    }

    /// Field with every entry set to `value`.
    pub fn filled(n_cells: usize, n_levels: usize, value: f64) -> Self {
        Self {
            n_cells,
            n_levels,
            data: vec![value; n_cells * n_levels],
        }
    }

    /// Build a field from one profile per cell.
    ///
    /// Returns `None` if the profiles do not all have length `n_levels`.
    pub fn from_columns(n_levels: usize, columns: &[Vec<f64>]) -> Option<Self> {
        if columns.iter().any(|c| c.len() != n_levels) {
            return None;
        }
        Some(Self {
            n_cells: columns.len(),
            n_levels,
            data: columns.concat(),
        })
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    #[inline]
    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    /// Column of `cell`, level 0 first.
    #[inline]
    pub fn column(&self, cell: usize) -> &[f64] {
        let start = cell * self.n_levels;
        &self.data[start..start + self.n_levels]
    }

    /// Mutable column of `cell`.
    #[inline]
    pub fn column_mut(&mut self, cell: usize) -> &mut [f64] {
        let start = cell * self.n_levels;
        &mut self.data[start..start + self.n_levels]
    }

    /// Iterate over all columns in cell order.
    pub fn columns(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.n_levels.max(1))
    }

    /// Iterate mutably over all columns in cell order.
    pub fn columns_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        self.data.chunks_exact_mut(self.n_levels.max(1))
    }

    /// Value at (`cell`, `level`).
    #[inline]
    pub fn get(&self, cell: usize, level: usize) -> f64 {
        self.data[cell * self.n_levels + level]
    }

    /// Set the value at (`cell`, `level`).
    #[inline]
    pub fn set(&mut self, cell: usize, level: usize, value: f64) {
        self.data[cell * self.n_levels + level] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

/// Active tracers (temperature, salinity, ...) of a partition.
///
/// Conceptually indexed by (tracer, level, cell); stored as one
/// [`ColumnField`] per tracer so that each tracer column is contiguous.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveTracers {
    names: Vec<String>,
    fields: Vec<ColumnField>,
}

impl ActiveTracers {
    /// Zero-initialized tracers with the given names.
    pub fn new<S: AsRef<str>>(names: &[S], n_cells: usize, n_levels: usize) -> Self {
        Self {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            fields: names
                .iter()
                .map(|_| ColumnField::new(n_cells, n_levels))
                .collect(),
        }
    }

    #[inline]
    pub fn n_tracers(&self) -> usize {
        self.fields.len()
    }

    /// Tracer names in storage order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of the tracer called `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Field of tracer `tracer`.
    pub fn field(&self, tracer: usize) -> &ColumnField {
        &self.fields[tracer]
    }

    /// Mutable field of tracer `tracer`.
    pub fn field_mut(&mut self, tracer: usize) -> &mut ColumnField {
        &mut self.fields[tracer]
    }

    /// All tracer fields, in storage order.
    pub fn fields(&self) -> &[ColumnField] {
        &self.fields
    }

    /// All tracer fields, mutably.
    pub fn fields_mut(&mut self) -> &mut [ColumnField] {
        &mut self.fields
    }

    /// Column of tracer `tracer` in `cell`.
    #[inline]
    pub fn column(&self, tracer: usize, cell: usize) -> &[f64] {
        self.fields[tracer].column(cell)
    }

    /// Mutable column of tracer `tracer` in `cell`.
    #[inline]
    pub fn column_mut(&mut self, tracer: usize, cell: usize) -> &mut [f64] {
        self.fields[tracer].column_mut(cell)
    }
}
