use ahash::AHashMap;
use gridmenu_core::{Capacity, GridError, Slot};

use super::Content;
use crate::cell::Cell;

/// Pattern object stamped onto content
pub trait Pane {
    fn apply_on(&self, content: &Content) -> Result<(), GridError>;
}

/// Character -> cell mapping used by [`TextLayoutPane`]
#[derive(Clone, Default)]
pub struct TextLayout {
    cells: AHashMap<char, Cell>,
}

impl TextLayout {
    pub const DEFAULT_CHARACTER: char = '#';

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, character: char, cell: Cell) -> Self {
        self.cells.insert(character, cell);
        self
    }

    /// Map [`TextLayout::DEFAULT_CHARACTER`]
    pub fn set_default(self, cell: Cell) -> Self {
        self.set(Self::DEFAULT_CHARACTER, cell)
    }

    pub fn get(&self, character: char) -> Option<&Cell> {
        self.cells.get(&character)
    }
}

/// Rows of characters stamped onto a grid through a [`TextLayout`].
///
/// Every row must be exactly as wide as the grid and there may not be more
/// rows than the grid has. Characters without a mapping leave their slot
/// untouched.
pub struct TextLayoutPane {
    capacity: Capacity,
    layout: TextLayout,
    pattern: Vec<String>,
}

impl TextLayoutPane {
    pub fn new<I, S>(capacity: Capacity, layout: TextLayout, pattern: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            capacity,
            layout,
            pattern: pattern.into_iter().map(Into::into).collect(),
        }
    }
}

impl Pane for TextLayoutPane {
    fn apply_on(&self, content: &Content) -> Result<(), GridError> {
        if self.pattern.len() > self.capacity.rows() {
            return Err(GridError::PatternTooTall {
                rows: self.pattern.len(),
                max: self.capacity.rows(),
            });
        }

        let mut entries = Vec::new();
        for (row, line) in self.pattern.iter().enumerate() {
            let found = line.chars().count();
            if found != self.capacity.columns() {
                return Err(GridError::PatternRowLength {
                    row,
                    expected: self.capacity.columns(),
                    found,
                });
            }
            for (column, character) in line.chars().enumerate() {
                if let Some(cell) = self.layout.get(character) {
                    entries.push((Slot::at(row, column), cell.clone()));
                }
            }
        }
        content.write_all(entries).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmenu_core::Item;

    fn layout() -> TextLayout {
        TextLayout::new()
            .set_default(Cell::empty(Item::new("glass")))
            .set('A', Cell::empty(Item::new("apple")))
    }

    #[test]
    fn test_stamps_mapped_characters() {
        let capacity = Capacity::of_rows(3);
        let pane = TextLayoutPane::new(capacity, layout(), ["#########", "#  A    #"]);
        let content = Content::empty(capacity);
        pane.apply_on(&content).unwrap();

        assert_eq!(content.len(), 9 + 3);
        assert_eq!(content.item(Slot::at(1, 3)).map(|i| i.material), Some("apple".into()));
        assert!(!content.contains(Slot::at(1, 1)));
        assert!(!content.contains(Slot::at(2, 0)));
    }

    #[test]
    fn test_rejects_bad_rows() {
        let capacity = Capacity::of_rows(2);
        let short = TextLayoutPane::new(capacity, layout(), ["#####"]);
        assert_eq!(
            short.apply_on(&Content::empty(capacity)),
            Err(GridError::PatternRowLength { row: 0, expected: 9, found: 5 })
        );

        let tall = TextLayoutPane::new(capacity, layout(), ["#########"; 3]);
        assert_eq!(
            tall.apply_on(&Content::empty(capacity)),
            Err(GridError::PatternTooTall { rows: 3, max: 2 })
        );
    }
}
