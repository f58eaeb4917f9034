use gridmenu_core::{Capacity, GridError, Slot, SlotIterator, Slots};

use super::{Content, Pane};
use crate::cell::Cell;

/// Incremental builder for [`Content`].
///
/// Methods chain; the first failing step is remembered, later steps are
/// skipped, and [`ContentBuilder::build`] returns that error.
pub struct ContentBuilder {
    content: Content,
    error: Option<GridError>,
}

impl ContentBuilder {
    pub fn new(capacity: Capacity) -> Self {
        Self {
            content: Content::empty(capacity),
            error: None,
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.content.capacity()
    }

    /// Run any content operation as one builder step
    pub fn apply(mut self, f: impl FnOnce(&Content) -> Result<(), GridError>) -> Self {
        if self.error.is_none() {
            if let Err(e) = f(&self.content) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn set(self, slot: Slot, cell: Cell) -> Self {
        self.apply(|c| c.set(slot, cell))
    }

    pub fn set_at(self, row: usize, column: usize, cell: Cell) -> Self {
        self.apply(|c| c.set_at(row, column, cell))
    }

    /// Same cell in every slot of `slots`
    pub fn set_all(self, slots: &Slots, cell: Cell) -> Self {
        self.apply(|c| slots.iter().try_for_each(|slot| c.set(slot, cell.clone())))
    }

    pub fn fill(self, cell: Cell) -> Self {
        self.apply(|c| c.fill(cell))
    }

    pub fn fill_row(self, row: usize, cell: Cell) -> Self {
        self.apply(|c| c.fill_row(row, cell))
    }

    pub fn fill_column(self, column: usize, cell: Cell) -> Self {
        self.apply(|c| c.fill_column(column, cell))
    }

    pub fn fill_border(self, cell: Cell) -> Self {
        self.apply(|c| c.fill_border(cell))
    }

    pub fn fill_rectangle(self, corners: [Slot; 4], cell: Cell) -> Self {
        let [top_left, top_right, bottom_left, bottom_right] = corners;
        self.apply(|c| c.fill_rectangle(top_left, top_right, bottom_left, bottom_right, cell))
    }

    pub fn repeat(self, slots: &Slots, cells: &[Cell]) -> Self {
        self.apply(|c| c.repeat(slots, cells))
    }

    pub fn repeat_range(self, start: Slot, end: Slot, cells: &[Cell]) -> Self {
        self.apply(|c| c.repeat_range(start, end, cells))
    }

    pub fn draw(self, iterator: SlotIterator, cell: Cell) -> Self {
        self.apply(|c| c.draw(iterator, cell).map(|_| ()))
    }

    /// Draw whatever `f` returns at each slot the iterator visits
    pub fn iterate(self, iterator: SlotIterator, f: impl FnMut(Slot) -> Option<Cell>) -> Self {
        self.apply(|c| c.draw_with(iterator, f).map(|_| ()))
    }

    pub fn apply_pane(self, pane: &dyn Pane) -> Self {
        self.apply(|c| pane.apply_on(c))
    }

    /// Bulk copy from a loaded map
    pub fn extend(self, cells: impl IntoIterator<Item = (Slot, Cell)>) -> Self {
        self.apply(|c| c.write_all(cells).map(|_| ()))
    }

    pub fn build(self) -> Result<Content, GridError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.content),
        }
    }
}
