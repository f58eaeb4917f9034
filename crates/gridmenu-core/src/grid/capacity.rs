use serde::{Deserialize, Serialize};

use super::GRID_WIDTH;
use crate::error::GridError;

/// Most rows a capacity can have without its slot count overflowing
pub const MAX_ROWS: usize = usize::MAX / GRID_WIDTH;

/// Fixed grid shape
///
/// `rows * columns == total_size` holds for every constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capacity {
    total_size: usize,
    rows: usize,
    columns: usize,
}

impl Capacity {
    /// Capacity from a total slot count, using full rows of [`GRID_WIDTH`].
    ///
    /// A total that is not a multiple of the row width is rounded down to
    /// whole rows.
    pub const fn new(total_size: usize) -> Self {
        let rows = total_size / GRID_WIDTH;
        Self {
            total_size: rows * GRID_WIDTH,
            rows,
            columns: GRID_WIDTH,
        }
    }

    /// Capacity with an explicit row x column shape.
    ///
    /// Slot addressing assumes rows of [`GRID_WIDTH`], so any other column
    /// count is rejected, as is a shape whose slot count overflows.
    pub fn with_grid(rows: usize, columns: usize) -> Result<Self, GridError> {
        if columns != GRID_WIDTH {
            return Err(GridError::UnsupportedColumns {
                columns,
                expected: GRID_WIDTH,
            });
        }
        let total_size = rows
            .checked_mul(columns)
            .ok_or(GridError::CapacityOverflow { rows })?;
        Ok(Self {
            total_size,
            rows,
            columns,
        })
    }

    /// Capacity of `rows` full-width rows, clamped to [`MAX_ROWS`]
    pub const fn of_rows(rows: usize) -> Self {
        let rows = if rows > MAX_ROWS { MAX_ROWS } else { rows };
        Self {
            total_size: rows * GRID_WIDTH,
            rows,
            columns: GRID_WIDTH,
        }
    }

    /// Smallest whole-row capacity fitting `buttons` cells, limited to `max_size`
    pub fn flexible(buttons: usize, max_size: usize) -> Self {
        let required = buttons.div_ceil(GRID_WIDTH) * GRID_WIDTH;
        Self::new(required.min(max_size))
    }

    pub const fn total_size(&self) -> usize {
        self.total_size
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Whether a linear index addresses a cell of this capacity
    pub const fn contains_index(&self, index: usize) -> bool {
        index < self.total_size
    }

    pub const fn contains_row(&self, row: usize) -> bool {
        row < self.rows
    }

    pub const fn contains_column(&self, column: usize) -> bool {
        column < self.columns
    }
}
