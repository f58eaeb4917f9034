use serde::{Deserialize, Serialize};
use std::fmt;

use super::Capacity;

/// Width of every row addressed by a [`Slot`]
pub const GRID_WIDTH: usize = 9;

/// Address of one grid cell.
///
/// A slot is a plain linear index; row and column are derived from it for a
/// grid that is always [`GRID_WIDTH`] cells wide. Slots carry no bounds of
/// their own: any index can be constructed, and it is the content store that
/// rejects indices past its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(usize);

impl Slot {
    /// Slot at a linear index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Slot at a row/column coordinate
    pub const fn at(row: usize, column: usize) -> Self {
        Self(row * GRID_WIDTH + column)
    }

    /// Last slot of a capacity (slot 0 for an empty capacity)
    pub const fn last(capacity: Capacity) -> Self {
        Self(capacity.total_size().saturating_sub(1))
    }

    pub const fn index(&self) -> usize {
        self.0
    }

    pub const fn row(&self) -> usize {
        self.0 / GRID_WIDTH
    }

    pub const fn column(&self) -> usize {
        self.0 % GRID_WIDTH
    }

    /// Slot `n` positions before this one, clamped at slot 0
    pub const fn subtract_by(&self, n: usize) -> Self {
        Self(self.0.saturating_sub(n))
    }

    /// Slot `n` positions after this one
    pub const fn add_by(&self, n: usize) -> Self {
        Self(self.0 + n)
    }
}

impl From<usize> for Slot {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({},{})", self.0, self.row(), self.column())
    }
}
