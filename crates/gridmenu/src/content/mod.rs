mod builder;
mod pane;

pub use builder::ContentBuilder;
pub use pane::{Pane, TextLayout, TextLayoutPane};

use std::collections::BTreeMap;
use std::fmt;

use gridmenu_core::{Capacity, GridError, Item, Slot, SlotIterator, Slots};
use parking_lot::RwLock;

use crate::cell::{AnimationTiming, Cell};

/// Slot -> cell map of one grid.
///
/// Every write is checked against the capacity and rejected with
/// [`GridError`] when it names a slot, row or column outside the grid; bulk
/// writes are validated in full before anything is stored. Reads and removals
/// of out-of-range slots simply find nothing.
///
/// The map sits behind a lock so a view's content can be read and updated
/// from the click path and the animation scheduler at the same time.
pub struct Content {
    capacity: Capacity,
    cells: RwLock<BTreeMap<Slot, Cell>>,
}

impl Content {
    pub fn empty(capacity: Capacity) -> Self {
        Self {
            capacity,
            cells: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn builder(capacity: Capacity) -> ContentBuilder {
        ContentBuilder::new(capacity)
    }

    /// Content holding the given entries
    pub fn from_cells(
        capacity: Capacity,
        cells: impl IntoIterator<Item = (Slot, Cell)>,
    ) -> Result<Self, GridError> {
        let content = Self::empty(capacity);
        content.write_all(cells)?;
        Ok(content)
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }

    fn check(&self, slot: Slot) -> Result<(), GridError> {
        if self.capacity.contains_index(slot.index()) {
            Ok(())
        } else {
            Err(GridError::SlotOutOfBounds {
                slot: slot.index(),
                size: self.capacity.total_size(),
            })
        }
    }

    fn check_row(&self, row: usize) -> Result<(), GridError> {
        if self.capacity.contains_row(row) {
            Ok(())
        } else {
            Err(GridError::RowOutOfBounds {
                row,
                rows: self.capacity.rows(),
            })
        }
    }

    fn check_column(&self, column: usize) -> Result<(), GridError> {
        if self.capacity.contains_column(column) {
            Ok(())
        } else {
            Err(GridError::ColumnOutOfBounds {
                column,
                columns: self.capacity.columns(),
            })
        }
    }

    /// Validate every entry, then store them all under one lock
    fn write_all(&self, entries: impl IntoIterator<Item = (Slot, Cell)>) -> Result<usize, GridError> {
        let entries: Vec<(Slot, Cell)> = entries.into_iter().collect();
        for (slot, _) in &entries {
            self.check(*slot)?;
        }
        let count = entries.len();
        self.cells.write().extend(entries);
        Ok(count)
    }

    fn fill_slots(&self, slots: impl IntoIterator<Item = Slot>, cell: &Cell) -> Result<(), GridError> {
        self.write_all(slots.into_iter().map(|slot| (slot, cell.clone())))
            .map(|_| ())
    }

    fn cycle_slots(&self, slots: &[Slot], cells: &[Cell]) -> Result<(), GridError> {
        if cells.is_empty() {
            return Err(GridError::EmptyRepeat);
        }
        if cells.len() > slots.len() {
            return Err(GridError::RepeatOverflow {
                cells: cells.len(),
                slots: slots.len(),
            });
        }
        self.write_all(
            slots
                .iter()
                .zip(cells.iter().cycle())
                .map(|(slot, cell)| (*slot, cell.clone())),
        )
        .map(|_| ())
    }

    fn row_slots(&self, row: usize, from: usize, to: usize) -> Result<Vec<Slot>, GridError> {
        let (from, to) = (from.min(to), from.max(to));
        self.check_row(row)?;
        self.check_column(to)?;
        Ok((from..=to).map(|column| Slot::at(row, column)).collect())
    }

    fn column_slots(&self, column: usize, from: usize, to: usize) -> Result<Vec<Slot>, GridError> {
        let (from, to) = (from.min(to), from.max(to));
        self.check_column(column)?;
        self.check_row(to)?;
        Ok((from..=to).map(|row| Slot::at(row, column)).collect())
    }

    // ---- single slot ----

    /// Copy of the cell at `slot`
    pub fn get(&self, slot: Slot) -> Option<Cell> {
        self.cells.read().get(&slot).cloned()
    }

    /// Run `f` on the cell at `slot` without cloning it
    pub fn with_cell<R>(&self, slot: Slot, f: impl FnOnce(&Cell) -> R) -> Option<R> {
        self.cells.read().get(&slot).map(f)
    }

    pub fn item(&self, slot: Slot) -> Option<Item> {
        self.with_cell(slot, |cell| cell.item().cloned()).flatten()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.cells.read().contains_key(&slot)
    }

    pub fn set(&self, slot: Slot, cell: Cell) -> Result<(), GridError> {
        self.check(slot)?;
        self.cells.write().insert(slot, cell);
        Ok(())
    }

    pub fn set_at(&self, row: usize, column: usize, cell: Cell) -> Result<(), GridError> {
        self.check_row(row)?;
        self.check_column(column)?;
        self.set(Slot::at(row, column), cell)
    }

    pub fn remove(&self, slot: Slot) -> Option<Cell> {
        self.cells.write().remove(&slot)
    }

    /// Replace the cell at `slot` in place, returning the updated copy.
    ///
    /// The read-modify-write happens under a single write lock, so a
    /// concurrent update of the same slot cannot be lost. `f` runs with that
    /// lock held and must not touch this content.
    pub fn update(&self, slot: Slot, f: impl FnOnce(&mut Cell)) -> Option<Cell> {
        let mut cells = self.cells.write();
        let cell = cells.get_mut(&slot)?;
        f(cell);
        Some(cell.clone())
    }

    /// First unoccupied slot at or after `from`
    pub fn next_empty_slot(&self, from: Slot) -> Option<Slot> {
        let cells = self.cells.read();
        (from.index()..self.capacity.total_size())
            .map(Slot::new)
            .find(|slot| !cells.contains_key(slot))
    }

    /// Place each cell at the next empty slot, stopping once the grid is full.
    ///
    /// Returns the slots that were filled.
    pub fn add(&self, cells: impl IntoIterator<Item = Cell>) -> Vec<Slot> {
        let mut map = self.cells.write();
        let mut placed = Vec::new();
        let mut cursor = 0;
        for cell in cells {
            let Some(index) = (cursor..self.capacity.total_size())
                .find(|&index| !map.contains_key(&Slot::new(index)))
            else {
                break;
            };
            map.insert(Slot::new(index), cell);
            placed.push(Slot::new(index));
            cursor = index + 1;
        }
        placed
    }

    /// Slots whose cell shows an item similar to `item`
    pub fn slots_of(&self, item: &Item) -> Slots {
        self.cells
            .read()
            .iter()
            .filter(|(_, cell)| cell.shows(item))
            .map(|(slot, _)| *slot)
            .collect()
    }

    // ---- geometry ----

    /// Every slot of the grid
    pub fn fill(&self, cell: Cell) -> Result<(), GridError> {
        self.fill_slots((0..self.capacity.total_size()).map(Slot::new), &cell)
    }

    pub fn fill_row(&self, row: usize, cell: Cell) -> Result<(), GridError> {
        self.fill_row_until(row, self.capacity.columns().saturating_sub(1), cell)
    }

    /// Columns `0..=end_column` of `row`
    pub fn fill_row_until(&self, row: usize, end_column: usize, cell: Cell) -> Result<(), GridError> {
        let slots = self.row_slots(row, 0, end_column)?;
        self.fill_slots(slots, &cell)
    }

    pub fn fill_row_except(&self, row: usize, cell: Cell, except_columns: &[usize]) -> Result<(), GridError> {
        let slots = self.row_slots(row, 0, self.capacity.columns().saturating_sub(1))?;
        self.fill_slots(
            slots
                .into_iter()
                .filter(|slot| !except_columns.contains(&slot.column())),
            &cell,
        )
    }

    /// Cycle through `cells` across the whole row
    pub fn fill_row_repeatedly(&self, row: usize, cells: &[Cell]) -> Result<(), GridError> {
        let slots = self.row_slots(row, 0, self.capacity.columns().saturating_sub(1))?;
        self.cycle_slots(&slots, cells)
    }

    pub fn fill_column(&self, column: usize, cell: Cell) -> Result<(), GridError> {
        self.fill_column_until(column, self.capacity.rows().saturating_sub(1), cell)
    }

    /// Rows `0..=end_row` of `column`
    pub fn fill_column_until(&self, column: usize, end_row: usize, cell: Cell) -> Result<(), GridError> {
        let slots = self.column_slots(column, 0, end_row)?;
        self.fill_slots(slots, &cell)
    }

    pub fn fill_column_except(&self, column: usize, cell: Cell, except_rows: &[usize]) -> Result<(), GridError> {
        let slots = self.column_slots(column, 0, self.capacity.rows().saturating_sub(1))?;
        self.fill_slots(
            slots.into_iter().filter(|slot| !except_rows.contains(&slot.row())),
            &cell,
        )
    }

    pub fn fill_column_repeatedly(&self, column: usize, cells: &[Cell]) -> Result<(), GridError> {
        let slots = self.column_slots(column, 0, self.capacity.rows().saturating_sub(1))?;
        self.cycle_slots(&slots, cells)
    }

    /// First and last rows plus first and last columns
    pub fn fill_border(&self, cell: Cell) -> Result<(), GridError> {
        let last_row = self.capacity.rows().saturating_sub(1);
        let last_column = self.capacity.columns().saturating_sub(1);
        let mut slots = self.row_slots(0, 0, last_column)?;
        slots.extend(self.column_slots(0, 0, last_row)?);
        slots.extend(self.row_slots(last_row, 0, last_column)?);
        slots.extend(self.column_slots(last_column, 0, last_row)?);
        self.fill_slots(slots, &cell)
    }

    /// Border runs that each restart the cycle of `cells`
    pub fn fill_border_repeatedly(&self, cells: &[Cell]) -> Result<(), GridError> {
        let last_row = self.capacity.rows().saturating_sub(1);
        let last_column = self.capacity.columns().saturating_sub(1);
        let runs = [
            self.row_slots(0, 0, last_column)?,
            self.column_slots(0, 0, last_row)?,
            self.row_slots(last_row, 0, last_column)?,
            self.column_slots(last_column, 0, last_row)?,
        ];
        for run in &runs {
            if cells.len() > run.len() {
                return Err(GridError::RepeatOverflow {
                    cells: cells.len(),
                    slots: run.len(),
                });
            }
        }
        for run in &runs {
            self.cycle_slots(run, cells)?;
        }
        Ok(())
    }

    /// Outline of the rectangle with corners `top_left`, `top_right`,
    /// `bottom_left` and `bottom_right`.
    ///
    /// Each side runs between the two corners that bound it; the interior is
    /// left untouched. Use [`Content::fill_area`] for a solid rectangle.
    pub fn fill_rectangle(
        &self,
        top_left: Slot,
        top_right: Slot,
        bottom_left: Slot,
        bottom_right: Slot,
        cell: Cell,
    ) -> Result<(), GridError> {
        let mut slots = self.row_slots(top_left.row(), top_left.column(), top_right.column())?;
        slots.extend(self.column_slots(top_left.column(), top_left.row(), bottom_left.row())?);
        slots.extend(self.row_slots(bottom_left.row(), bottom_left.column(), bottom_right.column())?);
        slots.extend(self.column_slots(top_right.column(), top_right.row(), bottom_right.row())?);
        self.fill_slots(slots, &cell)
    }

    /// Every slot of the rectangle spanned by two opposite corners
    pub fn fill_area(&self, corner: Slot, opposite: Slot, cell: Cell) -> Result<(), GridError> {
        let (top, bottom) = (corner.row().min(opposite.row()), corner.row().max(opposite.row()));
        let mut slots = Vec::new();
        for row in top..=bottom {
            slots.extend(self.row_slots(row, corner.column(), opposite.column())?);
        }
        self.fill_slots(slots, &cell)
    }

    /// Cycle through `cells` over an explicit slot set
    pub fn repeat(&self, slots: &Slots, cells: &[Cell]) -> Result<(), GridError> {
        let slots: Vec<Slot> = slots.iter().collect();
        self.cycle_slots(&slots, cells)
    }

    /// Cycle through `cells` over the linear range `start..=end`
    pub fn repeat_range(&self, start: Slot, end: Slot, cells: &[Cell]) -> Result<(), GridError> {
        if end < start {
            return Err(GridError::InvalidRange {
                start: start.index(),
                end: end.index(),
            });
        }
        self.check(end)?;
        let slots: Vec<Slot> = (start.index()..=end.index()).map(Slot::new).collect();
        self.cycle_slots(&slots, cells)
    }

    /// Place `cell` at every slot the iterator visits, returning how many
    pub fn draw(&self, iterator: SlotIterator, cell: Cell) -> Result<usize, GridError> {
        self.write_all(iterator.map(|slot| (slot, cell.clone())))
    }

    /// Place whatever `f` returns at each visited slot
    pub fn draw_with(
        &self,
        iterator: SlotIterator,
        mut f: impl FnMut(Slot) -> Option<Cell>,
    ) -> Result<usize, GridError> {
        self.write_all(iterator.filter_map(|slot| f(slot).map(|cell| (slot, cell))))
    }

    // ---- bulk ----

    /// Right-biased union: entries of `other` overwrite entries of `self`
    pub fn merge_with(&self, other: &Content) -> Result<(), GridError> {
        self.write_all(other.entries())?;
        Ok(())
    }

    /// Keep at most `max` entries, evicting the highest slots first.
    ///
    /// Returns the evicted slots, highest first.
    pub fn trim(&self, max: usize) -> Vec<Slot> {
        let mut cells = self.cells.write();
        let mut evicted = Vec::new();
        while cells.len() > max {
            match cells.pop_last() {
                Some((slot, _)) => evicted.push(slot),
                None => break,
            }
        }
        evicted
    }

    /// Apply `updater` to every entry accepted by `condition`, returning their slots.
    ///
    /// Both closures run under the write lock, like [`Content::update`].
    pub fn update_all(
        &self,
        condition: impl Fn(Slot, &Cell) -> bool,
        mut updater: impl FnMut(&mut Cell),
    ) -> Vec<Slot> {
        let mut cells = self.cells.write();
        let mut updated = Vec::new();
        for (slot, cell) in cells.iter_mut() {
            if condition(*slot, cell) {
                updater(cell);
                updated.push(*slot);
            }
        }
        updated
    }

    /// Visit every entry in slot order
    pub fn for_each(&self, mut f: impl FnMut(Slot, &Cell)) {
        for (slot, cell) in self.cells.read().iter() {
            f(*slot, cell);
        }
    }

    /// Snapshot of every entry in slot order
    pub fn entries(&self) -> Vec<(Slot, Cell)> {
        self.cells
            .read()
            .iter()
            .map(|(slot, cell)| (*slot, cell.clone()))
            .collect()
    }

    pub fn search(&self, condition: impl Fn(Slot, &Cell) -> bool) -> Vec<(Slot, Cell)> {
        self.cells
            .read()
            .iter()
            .filter(|(slot, cell)| condition(**slot, cell))
            .map(|(slot, cell)| (*slot, cell.clone()))
            .collect()
    }

    pub fn slots(&self) -> Vec<Slot> {
        self.cells.read().keys().copied().collect()
    }

    /// Slots holding animated cells with their cadence
    pub fn animated(&self) -> Vec<(Slot, AnimationTiming)> {
        self.cells
            .read()
            .iter()
            .filter_map(|(slot, cell)| cell.animation().map(|a| (*slot, a.timing())))
            .collect()
    }
}

impl Clone for Content {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            cells: RwLock::new(self.cells.read().clone()),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("capacity", &self.capacity)
            .field("cells", &self.cells.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmenu_core::Direction;

    fn cell(material: &str) -> Cell {
        Cell::empty(Item::new(material))
    }

    fn material(content: &Content, slot: usize) -> Option<String> {
        content.item(Slot::new(slot)).map(|i| i.material.to_string())
    }

    fn indices(content: &Content) -> Vec<usize> {
        content.slots().iter().map(Slot::index).collect()
    }

    #[test]
    fn test_fill_border_three_rows() {
        let content = Content::empty(Capacity::of_rows(3));
        content.fill_border(cell("x")).unwrap();

        let mut expected: Vec<usize> = (0..9).collect();
        expected.extend([9, 17]);
        expected.extend(18..27);
        assert_eq!(indices(&content), expected);
        assert!((10..=16).all(|i| !content.contains(Slot::new(i))));
    }

    #[test]
    fn test_fill_row_idempotent() {
        let once = Content::empty(Capacity::of_rows(2));
        once.fill_row(1, cell("glass")).unwrap();
        let twice = Content::empty(Capacity::of_rows(2));
        twice.fill_row(1, cell("glass")).unwrap();
        twice.fill_row(1, cell("glass")).unwrap();

        assert_eq!(indices(&once), indices(&twice));
        for slot in once.slots() {
            assert_eq!(once.item(slot), twice.item(slot));
        }
    }

    #[test]
    fn test_merge_is_right_biased() {
        let capacity = Capacity::of_rows(1);
        let a = Content::from_cells(capacity, [(Slot::new(0), cell("a0")), (Slot::new(1), cell("a1"))]).unwrap();
        let b = Content::from_cells(capacity, [(Slot::new(1), cell("b1")), (Slot::new(2), cell("b2"))]).unwrap();
        a.merge_with(&b).unwrap();

        assert_eq!(material(&a, 0).as_deref(), Some("a0"));
        assert_eq!(material(&a, 1).as_deref(), Some("b1"));
        assert_eq!(material(&a, 2).as_deref(), Some("b2"));
    }

    #[test]
    fn test_writes_out_of_bounds_rejected() {
        let content = Content::empty(Capacity::of_rows(1));
        assert_eq!(
            content.set(Slot::new(9), cell("x")),
            Err(GridError::SlotOutOfBounds { slot: 9, size: 9 })
        );
        assert_eq!(
            content.fill_row(1, cell("x")),
            Err(GridError::RowOutOfBounds { row: 1, rows: 1 })
        );
        assert!(content.fill_column(9, cell("x")).is_err());
        assert!(content.is_empty());

        // reads and removals stay silent
        assert!(content.get(Slot::new(40)).is_none());
        assert!(content.remove(Slot::new(40)).is_none());
    }

    #[test]
    fn test_bulk_write_is_all_or_nothing() {
        let content = Content::empty(Capacity::of_rows(1));
        let iter = SlotIterator::from(Slot::new(0), Capacity::of_rows(3), Direction::Downwards);
        assert!(content.draw(iter, cell("x")).is_err());
        assert!(content.is_empty());
    }

    #[test]
    fn test_trim_evicts_highest_first() {
        let content = Content::empty(Capacity::of_rows(2));
        for i in [3, 11, 0, 7, 15] {
            content.set(Slot::new(i), cell("x")).unwrap();
        }
        let evicted = content.trim(3);
        assert_eq!(evicted, vec![Slot::new(15), Slot::new(11)]);
        assert_eq!(indices(&content), vec![0, 3, 7]);
        assert!(content.trim(10).is_empty());
    }

    #[test]
    fn test_next_empty_and_add() {
        let content = Content::empty(Capacity::of_rows(1));
        content.fill_row_until(0, 2, cell("x")).unwrap();
        content.set(Slot::new(4), cell("y")).unwrap();
        assert_eq!(content.next_empty_slot(Slot::new(0)), Some(Slot::new(3)));
        assert_eq!(content.next_empty_slot(Slot::new(4)), Some(Slot::new(5)));

        let placed = content.add((0..10).map(|i| cell(&format!("c{}", i))));
        assert_eq!(placed.len(), 5);
        assert_eq!(placed[0], Slot::new(3));
        assert_eq!(placed[1], Slot::new(5));
        assert_eq!(content.next_empty_slot(Slot::new(0)), None);
    }

    #[test]
    fn test_fill_rectangle_draws_outline_between_corners() {
        let content = Content::empty(Capacity::of_rows(5));
        content
            .fill_rectangle(Slot::at(1, 2), Slot::at(1, 6), Slot::at(3, 2), Slot::at(3, 6), cell("x"))
            .unwrap();

        assert!(content.contains(Slot::at(1, 2)));
        assert!(content.contains(Slot::at(1, 6)));
        assert!(content.contains(Slot::at(2, 2)));
        assert!(content.contains(Slot::at(2, 6)));
        assert!(content.contains(Slot::at(3, 4)));
        assert!(!content.contains(Slot::at(2, 4)));
        assert!(!content.contains(Slot::at(1, 0)));
        assert_eq!(content.len(), 5 + 5 + 2);
    }

    #[test]
    fn test_fill_area_is_solid() {
        let content = Content::empty(Capacity::of_rows(4));
        content.fill_area(Slot::at(2, 5), Slot::at(1, 3), cell("x")).unwrap();
        assert_eq!(content.len(), 6);
        assert!(content.contains(Slot::at(1, 4)));
        assert!(content.contains(Slot::at(2, 3)));
    }

    #[test]
    fn test_repeat_cycles() {
        let content = Content::empty(Capacity::of_rows(1));
        content.fill_row_repeatedly(0, &[cell("a"), cell("b")]).unwrap();
        assert_eq!(material(&content, 0).as_deref(), Some("a"));
        assert_eq!(material(&content, 1).as_deref(), Some("b"));
        assert_eq!(material(&content, 8).as_deref(), Some("a"));

        let cells: Vec<Cell> = (0..10).map(|_| cell("z")).collect();
        assert_eq!(
            content.fill_row_repeatedly(0, &cells),
            Err(GridError::RepeatOverflow { cells: 10, slots: 9 })
        );
        assert_eq!(content.repeat_range(Slot::new(5), Slot::new(2), &[cell("z")]), Err(GridError::InvalidRange { start: 5, end: 2 }));
        assert_eq!(content.fill_row_repeatedly(0, &[]), Err(GridError::EmptyRepeat));
    }

    #[test]
    fn test_row_except_and_column_until() {
        let content = Content::empty(Capacity::of_rows(3));
        content.fill_row_except(0, cell("x"), &[0, 8]).unwrap();
        assert_eq!(indices(&content), (1..8).collect::<Vec<_>>());

        let content = Content::empty(Capacity::of_rows(3));
        content.fill_column_until(4, 1, cell("x")).unwrap();
        assert_eq!(indices(&content), vec![4, 13]);
    }

    #[test]
    fn test_update_and_search() {
        let content = Content::empty(Capacity::of_rows(1));
        content.fill(cell("stone")).unwrap();
        let updated = content.update(Slot::new(3), |c| c.set_item(Some(Item::new("gold"))));
        assert_eq!(updated.and_then(|c| c.item().cloned()), Some(Item::new("gold")));
        assert!(content.update(Slot::new(30), |_| {}).is_none());

        assert_eq!(content.slots_of(&Item::new("gold")).len(), 1);
        let changed = content.update_all(|slot, _| slot.index() % 2 == 0, |c| c.set_item(None));
        assert_eq!(changed.len(), 5);
        assert_eq!(content.search(|_, c| c.item().is_none()).len(), 5);
    }
}
