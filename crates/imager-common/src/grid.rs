//! Row-major 2-D sample grids.

use serde::{Deserialize, Serialize};

use crate::error::{ImagerError, ImagerResult};

/// A 2-D grid of samples stored in row-major order.
///
/// Line 0 is the first scan line of the image (northernmost for a
/// north-to-south scan), column 0 the westernmost pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridParts<T>")]
pub struct Grid<T> {
    n_lines: usize,
    n_columns: usize,
    data: Vec<T>,
}

/// Unchecked serialized form; deserialization goes through `from_vec`.
#[derive(Deserialize)]
struct GridParts<T> {
    n_lines: usize,
    n_columns: usize,
    data: Vec<T>,
}

impl<T> TryFrom<GridParts<T>> for Grid<T> {
    type Error = ImagerError;

    fn try_from(parts: GridParts<T>) -> Result<Self, Self::Error> {
        Grid::from_vec(parts.n_lines, parts.n_columns, parts.data)
    }
}

impl<T> Grid<T> {
    /// Wrap a row-major buffer, checking that it matches the shape.
    pub fn from_vec(n_lines: usize, n_columns: usize, data: Vec<T>) -> ImagerResult<Self> {
        if data.len() != n_lines * n_columns {
            return Err(ImagerError::malformed(
                "grid",
                format!(
                    "buffer holds {} samples but shape is {}x{}",
                    data.len(),
                    n_lines,
                    n_columns
                ),
            ));
        }
        Ok(Self {
            n_lines,
            n_columns,
            data,
        })
    }

    /// Build a grid by evaluating `f(line, column)` for every cell.
    pub fn from_fn(n_lines: usize, n_columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(n_lines * n_columns);
        for line in 0..n_lines {
            for column in 0..n_columns {
                data.push(f(line, column));
            }
        }
        Self {
            n_lines,
            n_columns,
            data,
        }
    }

    /// Number of scan lines.
    pub fn n_lines(&self) -> usize {
        self.n_lines
    }

    /// Number of columns per line.
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Shape as `(n_lines, n_columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_lines, self.n_columns)
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(line, column)`, or `None` when out of bounds.
    pub fn get(&self, line: usize, column: usize) -> Option<&T> {
        if line >= self.n_lines || column >= self.n_columns {
            return None;
        }
        self.data.get(line * self.n_columns + column)
    }

    /// Mutable sample at `(line, column)`.
    pub fn get_mut(&mut self, line: usize, column: usize) -> Option<&mut T> {
        if line >= self.n_lines || column >= self.n_columns {
            return None;
        }
        self.data.get_mut(line * self.n_columns + column)
    }

    /// The row-major sample buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over lines as slices.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.n_columns.max(1))
    }

    /// Consume the grid and return its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Apply `f` to every sample, producing a new grid of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            n_lines: self.n_lines,
            n_columns: self.n_columns,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Grid<f32> {
    /// Count of samples carrying the missing sentinel (NaN).
    pub fn missing_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }
}
