use super::Direction;
use crate::grid::{Capacity, Slot, GRID_WIDTH};

/// Stateful cursor walking a grid in one [`Direction`].
///
/// The cursor keeps row and column separately so a step off the side of the
/// grid is seen as leaving it rather than wrapping onto the neighbouring row.
/// A position is valid while its linear index has not passed the end bound
/// and both its row and its column lie inside the capacity.
#[derive(Debug, Clone)]
pub struct SlotIterator {
    capacity: Capacity,
    direction: Direction,
    end: isize,
    row: isize,
    column: isize,
}

impl SlotIterator {
    /// Walk the whole capacity starting at slot 0
    pub fn create(capacity: Capacity, direction: Direction) -> Self {
        Self::between(Slot::new(0), Slot::last(capacity), capacity, direction)
    }

    /// Walk from `start` until the last slot of the capacity
    pub fn from(start: Slot, capacity: Capacity, direction: Direction) -> Self {
        Self::between(start, Slot::last(capacity), capacity, direction)
    }

    /// Walk from `start` until the linear index passes `end`
    pub fn between(start: Slot, end: Slot, capacity: Capacity, direction: Direction) -> Self {
        Self {
            capacity,
            direction,
            end: end.index() as isize,
            row: start.row() as isize,
            column: start.column() as isize,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    fn linear(&self) -> isize {
        self.row * GRID_WIDTH as isize + self.column
    }

    pub fn can_continue(&self) -> bool {
        let linear = self.linear();
        linear >= 0
            && !self.direction.is_past(linear, self.end)
            && self.row >= 0
            && (self.row as usize) < self.capacity.rows()
            && self.column >= 0
            && (self.column as usize) < self.capacity.columns()
    }

    /// Current slot, or `None` once the cursor has left the walkable area
    pub fn current(&self) -> Option<Slot> {
        self.can_continue()
            .then(|| Slot::at(self.row as usize, self.column as usize))
    }

    /// Move the cursor one step in its direction
    pub fn shift(&mut self) {
        let (dr, dc) = self.direction.delta();
        self.row += dr;
        self.column += dc;
    }
}

impl Iterator for SlotIterator {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let slot = self.current()?;
        self.shift();
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(iter: SlotIterator) -> Vec<usize> {
        iter.map(|s| s.index()).collect()
    }

    #[test]
    fn test_right_stops_at_row_edge() {
        let capacity = Capacity::of_rows(3);
        let iter = SlotIterator::from(Slot::new(6), capacity, Direction::Right);
        assert_eq!(indices(iter), vec![6, 7, 8]);
    }

    #[test]
    fn test_diagonal_does_not_wrap() {
        let capacity = Capacity::of_rows(6);
        let iter = SlotIterator::from(Slot::at(0, 6), capacity, Direction::RightDownwards);
        assert_eq!(indices(iter), vec![6, 16, 26]);

        let iter = SlotIterator::from(Slot::at(5, 2), capacity, Direction::LeftUpwards);
        assert_eq!(indices(iter), vec![47, 37, 27]);
    }

    #[test]
    fn test_end_bound_in_direction_sense() {
        let capacity = Capacity::of_rows(6);
        let iter = SlotIterator::between(Slot::new(0), Slot::new(27), capacity, Direction::Downwards);
        assert_eq!(indices(iter), vec![0, 9, 18, 27]);

        let iter = SlotIterator::between(Slot::new(49), Slot::new(20), capacity, Direction::Upwards);
        assert_eq!(indices(iter), vec![49, 40, 31, 22]);
    }

    #[test]
    fn test_current_after_exhaustion() {
        let capacity = Capacity::of_rows(1);
        let mut iter = SlotIterator::from(Slot::new(0), capacity, Direction::Upwards);
        assert_eq!(iter.current(), Some(Slot::new(0)));
        iter.shift();
        assert!(!iter.can_continue());
        assert_eq!(iter.current(), None);
    }
}
