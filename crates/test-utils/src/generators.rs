//! Generators for synthetic raw-count grids.
//!
//! These produce predictable, verifiable count patterns so calibration
//! results can be checked cell by cell. All grids are row-major, line 0
//! first.

/// Creates a count grid where each cell is `line * 100 + column`.
///
/// # Example
///
/// ```
/// use test_utils::create_count_grid;
///
/// let counts = create_count_grid(3, 4);
/// assert_eq!(counts.len(), 12);
/// assert_eq!(counts[1], 1);    // line 0, column 1
/// assert_eq!(counts[4], 100);  // line 1, column 0
/// ```
pub fn create_count_grid(n_lines: usize, n_columns: usize) -> Vec<u16> {
    let mut data = Vec::with_capacity(n_lines * n_columns);
    for line in 0..n_lines {
        for column in 0..n_columns {
            data.push((line * 100 + column) as u16);
        }
    }
    data
}

/// Creates a count ramp that walks `0..=max_count` across the grid and wraps.
pub fn create_count_ramp(n_lines: usize, n_columns: usize, max_count: u16) -> Vec<u16> {
    let period = max_count as usize + 1;
    (0..n_lines * n_columns)
        .map(|i| (i % period) as u16)
        .collect()
}

/// Creates a grid filled with one count.
pub fn create_constant_counts(n_lines: usize, n_columns: usize, count: u16) -> Vec<u16> {
    vec![count; n_lines * n_columns]
}

/// Creates a count grid with the fill value at the given `(line, column)`
/// positions and `base` elsewhere.
pub fn create_counts_with_fill(
    n_lines: usize,
    n_columns: usize,
    base: u16,
    fill_value: u16,
    fill_positions: &[(usize, usize)],
) -> Vec<u16> {
    let mut data = vec![base; n_lines * n_columns];
    for &(line, column) in fill_positions {
        if line < n_lines && column < n_columns {
            data[line * n_columns + column] = fill_value;
        }
    }
    data
}

/// Creates a brightness temperature table with `n` entries, linear from
/// `start_k` in steps of `step_k`.
pub fn create_bt_table(n: usize, start_k: f64, step_k: f64) -> Vec<f64> {
    (0..n).map(|i| start_k + i as f64 * step_k).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_count_grid() {
        let grid = create_count_grid(5, 10);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0);
        assert_eq!(grid[1], 1);
        assert_eq!(grid[10], 100);
        assert_eq!(grid[11], 101);
    }

    #[test]
    fn test_count_ramp_wraps() {
        let ramp = create_count_ramp(2, 5, 3);
        assert_eq!(ramp, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn test_counts_with_fill() {
        let grid = create_counts_with_fill(4, 4, 7, 65535, &[(0, 0), (2, 3), (9, 9)]);
        assert_eq!(grid[0], 65535);
        assert_eq!(grid[2 * 4 + 3], 65535);
        assert_eq!(grid.iter().filter(|&&c| c == 65535).count(), 2);
        assert_eq!(grid[1], 7);
    }

    #[test]
    fn test_bt_table() {
        let table = create_bt_table(4, 200.0, 0.5);
        assert_eq!(table, vec![200.0, 200.5, 201.0, 201.5]);
    }
}
