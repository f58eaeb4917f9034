use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use compact_str::CompactString;
use gridmenu_core::{
    Capacity, ClickEvent, DataRegistry, DragEvent, GridError, Item, Slot, SurfaceKind, ViewerId,
};

use super::Pagination;
use crate::cell::{Cell, ClickHandler};
use crate::content::Content;
use crate::error::{MenuError, Result};
use crate::menu::Menu;
use crate::view::MenuView;

/// Slots of a page that paginated components may occupy.
///
/// The range runs from `start` up to, but excluding, `end` (the last slot of
/// the grid when unset), minus the forbidden slots inside it.
#[derive(Debug, Clone)]
pub struct FillRange {
    capacity: Capacity,
    start: Slot,
    end: Option<Slot>,
    forbidden: BTreeSet<Slot>,
}

impl FillRange {
    /// Range starting at slot 0
    pub fn start(capacity: Capacity) -> Self {
        Self::starting_at(capacity, Slot::new(0))
    }

    pub fn starting_at(capacity: Capacity, start: Slot) -> Self {
        Self {
            capacity,
            start,
            end: None,
            forbidden: BTreeSet::new(),
        }
    }

    /// Exclusive end; must lie after the start
    pub fn end(mut self, end: Slot) -> Result<Self, GridError> {
        if end <= self.start {
            return Err(GridError::InvalidRange {
                start: self.start.index(),
                end: end.index(),
            });
        }
        self.end = Some(end);
        Ok(self)
    }

    pub fn except(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.forbidden.extend(slots);
        self
    }

    pub fn is_forbidden(&self, slot: Slot) -> bool {
        self.forbidden.contains(&slot)
    }

    pub fn start_slot(&self) -> Slot {
        self.start
    }

    pub fn end_slot(&self) -> Slot {
        self.end.unwrap_or_else(|| Slot::last(self.capacity))
    }

    /// Usable slots in ascending order
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (self.start.index()..self.end_slot().index())
            .map(Slot::new)
            .filter(|slot| !self.forbidden.contains(slot))
    }

    /// Number of usable slots; an empty range is a definition error
    pub fn count(&self) -> Result<usize, GridError> {
        let (start, end) = (self.start.index(), self.end_slot().index());
        let forbidden = self
            .forbidden
            .iter()
            .filter(|slot| (start..end).contains(&slot.index()))
            .count();
        let count = end.saturating_sub(start).saturating_sub(forbidden);
        if count == 0 {
            return Err(GridError::EmptyFillRange {
                start,
                end,
                forbidden,
            });
        }
        Ok(count)
    }
}

/// Definition of one page of a pagination.
///
/// A page is a menu whose own content is overlaid with navigation buttons
/// and, in automatic mode, with its share of the paginated components.
pub trait Page: Menu {
    fn fill_range(&self, capacity: Capacity, viewer: &ViewerId) -> Result<FillRange, GridError>;

    fn next_page_slot(&self, capacity: Capacity) -> Slot {
        Slot::last(capacity)
    }

    fn previous_page_slot(&self, capacity: Capacity) -> Slot {
        self.next_page_slot(capacity).subtract_by(8)
    }

    fn next_page_item(&self, viewer: &ViewerId) -> Item;

    fn previous_page_item(&self, viewer: &ViewerId) -> Item;

    /// Components shown on each page of an automatic pagination
    fn components_per_page(&self, capacity: Capacity, viewer: &ViewerId) -> Result<usize> {
        let count = self.fill_range(capacity, viewer)?.count()?;
        Ok(count.min(capacity.total_size()))
    }

    /// Runs before the pagination moves forward
    fn on_switching_to_next_page(&self, _pagination: &Pagination, _view: &MenuView, _event: &mut ClickEvent) {}

    /// Runs before the pagination moves back
    fn on_switching_to_previous_page(&self, _pagination: &Pagination, _view: &MenuView, _event: &mut ClickEvent) {}
}

/// One paginated item
pub trait PageComponent: Send + Sync {
    fn item(&self) -> Item;

    fn on_click(&self, _view: &MenuView, _event: &mut ClickEvent) {}
}

pub(crate) fn component_cell(component: &Arc<dyn PageComponent>) -> Cell {
    let target = component.clone();
    Cell::clickable(component.item(), move |view, event| target.on_click(view, event))
}

/// Component showing an item with an optional click handler
#[derive(Clone)]
pub struct ItemComponent {
    item: Item,
    handler: Option<ClickHandler>,
}

impl ItemComponent {
    pub fn new(item: Item) -> Self {
        Self { item, handler: None }
    }

    pub fn on_click(mut self, f: impl Fn(&MenuView, &mut ClickEvent) + Send + Sync + 'static) -> Self {
        self.handler = Some(Arc::new(f));
        self
    }
}

impl PageComponent for ItemComponent {
    fn item(&self) -> Item {
        self.item.clone()
    }

    fn on_click(&self, view: &MenuView, event: &mut ClickEvent) {
        if let Some(handler) = &self.handler {
            handler(view, event);
        }
    }
}

/// Supplies the component list of an automatic pagination
pub trait ComponentProvider: Send + Sync {
    fn provide(&self) -> Vec<Arc<dyn PageComponent>>;
}

impl<F> ComponentProvider for F
where
    F: Fn() -> Vec<Arc<dyn PageComponent>> + Send + Sync,
{
    fn provide(&self) -> Vec<Arc<dyn PageComponent>> {
        self()
    }
}

/// Menu of one page view: the page definition bound to its pagination and index
pub(crate) struct PageMenu {
    pub(crate) page: Arc<dyn Page>,
    pub(crate) pagination: Weak<Pagination>,
    pub(crate) index: usize,
}

impl Menu for PageMenu {
    fn name(&self) -> &str {
        self.page.name()
    }

    fn surface_kind(&self) -> SurfaceKind {
        self.page.surface_kind()
    }

    fn title(&self, data: &DataRegistry, viewer: &ViewerId) -> CompactString {
        self.page.title(data, viewer)
    }

    fn capacity(&self, data: &DataRegistry, viewer: &ViewerId) -> Capacity {
        self.page.capacity(data, viewer)
    }

    fn content(&self, data: &DataRegistry, viewer: &ViewerId, capacity: Capacity) -> Result<Content> {
        let pagination = self
            .pagination
            .upgrade()
            .ok_or(MenuError::Precondition("pagination no longer exists"))?;
        pagination.page_content(&self.page, self.index, data, viewer, capacity)
    }

    fn on_pre_click(&self, view: &MenuView, event: &mut ClickEvent) -> bool {
        self.page.on_pre_click(view, event)
    }

    fn on_post_click(&self, view: &MenuView, event: &mut ClickEvent) {
        self.page.on_post_click(view, event)
    }

    fn on_open(&self, view: &MenuView) {
        self.page.on_open(view)
    }

    fn on_close(&self, view: &MenuView) {
        self.page.on_close(view)
    }

    fn on_drag(&self, view: &MenuView, event: &mut DragEvent) {
        self.page.on_drag(view, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_range_count() {
        let capacity = Capacity::of_rows(3);
        assert_eq!(FillRange::start(capacity).count(), Ok(26));

        let range = FillRange::start(capacity)
            .end(Slot::new(10))
            .unwrap()
            .except([Slot::new(3), Slot::new(20)]);
        assert_eq!(range.count(), Ok(9));
        assert!(range.is_forbidden(Slot::new(3)));
        assert_eq!(range.slots().count(), 9);
        assert!(!range.slots().any(|s| s == Slot::new(3)));
    }

    #[test]
    fn test_fill_range_errors() {
        let capacity = Capacity::of_rows(1);
        assert_eq!(
            FillRange::starting_at(capacity, Slot::new(4)).end(Slot::new(4)).err(),
            Some(GridError::InvalidRange { start: 4, end: 4 })
        );

        let range = FillRange::starting_at(capacity, Slot::new(2))
            .end(Slot::new(4))
            .unwrap()
            .except([Slot::new(2), Slot::new(3)]);
        assert_eq!(
            range.count(),
            Err(GridError::EmptyFillRange { start: 2, end: 4, forbidden: 2 })
        );
    }
}
