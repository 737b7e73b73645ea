//! Dense counter matrix for heatmap rendering.
//!
//! Materializes the sparse table into a square row-major matrix indexed by
//! the lexicographically sorted source names. Only top-level source keys
//! become axis labels; a handler that appears solely as a destination is
//! excluded from both axes.

use crate::table::DispatchTable;

/// Dense square matrix of dispatch counts with its axis labels.
///
/// Built ascending on both axes, then the row axis is flipped and the row
/// labels reversed to match the heatmap's display orientation. Row `i`
/// holds the outgoing counts of source `row_labels[i]`; column `j` is the
/// destination `column_labels[j]`. Absent entries are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterMatrix {
    /// Row-major counts, `size * size` entries.
    values: Vec<u64>,
    /// Axis length.
    size: usize,
    /// Column labels, ascending lexicographic.
    column_labels: Vec<String>,
    /// Row labels: `column_labels` reversed.
    row_labels: Vec<String>,
}

impl CounterMatrix {
    /// Build the dense matrix from a dispatch table.
    #[must_use]
    pub fn from_table(table: &DispatchTable) -> Self {
        let mut labels: Vec<String> = table.sources().map(str::to_owned).collect();
        labels.sort_unstable();

        let size = labels.len();
        let mut values = vec![0u64; size * size];
        for (from_index, from_name) in labels.iter().enumerate() {
            let current_row = table.outgoing(from_name);
            for (to_index, to_name) in labels.iter().enumerate() {
                values[from_index * size + to_index] = current_row
                    .and_then(|counters| counters.get(to_name))
                    .copied()
                    .unwrap_or(0);
            }
        }

        // Flip the row axis for display orientation
        for from_index in 0..size / 2 {
            let opposite = size - 1 - from_index;
            for to_index in 0..size {
                values.swap(from_index * size + to_index, opposite * size + to_index);
            }
        }
        let row_labels: Vec<String> = labels.iter().rev().cloned().collect();

        Self { values, size, column_labels: labels, row_labels }
    }

    /// Axis length (number of labels on each side).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether the matrix has no labels at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Count at `(row, col)` in display orientation.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u64 {
        assert!(row < self.size && col < self.size, "matrix index out of bounds");
        self.values[row * self.size + col]
    }

    /// Column labels, ascending lexicographic.
    #[must_use]
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    /// Row labels, reversed column labels.
    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Largest count in the matrix (0 for an empty matrix).
    #[must_use]
    pub fn max_value(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Smallest nonzero count, if any. Lower bound of the log color domain.
    #[must_use]
    pub fn min_positive(&self) -> Option<u64> {
        self.values.iter().copied().filter(|&v| v > 0).min()
    }
}
