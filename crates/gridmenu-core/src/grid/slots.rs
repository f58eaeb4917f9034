use smallvec::SmallVec;

use super::{Slot, GRID_WIDTH};

/// Ordered group of slots used to place one cell in several positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slots(SmallVec<[Slot; 9]>);

impl Slots {
    pub fn of(indices: &[usize]) -> Self {
        Self(indices.iter().copied().map(Slot::new).collect())
    }

    /// Every slot of the given rows, row by row
    pub fn of_rows(rows: &[usize]) -> Self {
        Self(
            rows.iter()
                .flat_map(|&row| (0..GRID_WIDTH).map(move |column| Slot::at(row, column)))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.0.contains(&slot)
    }
}

impl FromIterator<Slot> for Slots {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Slots {
    type Item = Slot;
    type IntoIter = smallvec::IntoIter<[Slot; 9]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_rows_expands_every_column() {
        let slots = Slots::of_rows(&[0, 2]);
        assert_eq!(slots.len(), 18);
        assert!(slots.contains(Slot::new(8)));
        assert!(slots.contains(Slot::new(18)));
        assert!(!slots.contains(Slot::new(9)));
    }
}
