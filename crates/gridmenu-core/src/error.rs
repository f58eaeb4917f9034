use thiserror::Error;

/// Errors raised by grid geometry and content writes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("slot {slot} is outside a grid of {size} slots")]
    SlotOutOfBounds { slot: usize, size: usize },

    #[error("row {row} is outside a grid of {rows} rows")]
    RowOutOfBounds { row: usize, rows: usize },

    #[error("column {column} is outside a grid of {columns} columns")]
    ColumnOutOfBounds { column: usize, columns: usize },

    #[error("grids are {expected} columns wide, not {columns}")]
    UnsupportedColumns { columns: usize, expected: usize },

    #[error("{rows} rows overflow the slot count")]
    CapacityOverflow { rows: usize },

    #[error("invalid slot range {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    #[error("cannot repeat {cells} cells over {slots} slots")]
    RepeatOverflow { cells: usize, slots: usize },

    #[error("nothing to repeat")]
    EmptyRepeat,

    #[error("fill range {start}..{end} has no usable slots ({forbidden} forbidden)")]
    EmptyFillRange {
        start: usize,
        end: usize,
        forbidden: usize,
    },

    #[error("pattern row {row} has {found} characters, expected {expected}")]
    PatternRowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("pattern has {rows} rows but the grid only has {max}")]
    PatternTooTall { rows: usize, max: usize },
}
