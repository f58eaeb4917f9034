//! Paginated menus.
//!
//! An automatic pagination spreads a component list over as many pages as
//! it needs, all built from one [`Page`] definition. A plain pagination is a
//! fixed set of pages registered by index. Either way each page is a regular
//! [`MenuView`] with navigation buttons merged into its content.

mod page;

pub use page::{ComponentProvider, FillRange, ItemComponent, Page, PageComponent};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use gridmenu_core::{Capacity, DataRegistry, Item, ViewerId};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cell::Cell;
use crate::content::Content;
use crate::error::{MenuError, Result};
use crate::hub::MenuHub;
use crate::view::MenuView;
use page::{component_cell, PageMenu};

enum Mode {
    Automatic {
        creator: Arc<dyn Page>,
        components: RwLock<Vec<Arc<dyn PageComponent>>>,
    },
    Plain,
}

/// Ordered set of page views browsed by one viewer at a time.
///
/// The hub keeps a pagination alive while its viewer has one of its pages
/// open; pages only hold a weak reference back. Navigation is serialized, and
/// a failed navigation leaves the current index and the open page untouched.
pub struct Pagination {
    this: Weak<Pagination>,
    hub: Weak<MenuHub>,
    mode: Mode,
    trim_extra: bool,
    pages: RwLock<BTreeMap<usize, Arc<MenuView>>>,
    page_count: AtomicUsize,
    per_page: AtomicUsize,
    current: AtomicUsize,
    viewer: RwLock<Option<ViewerId>>,
    navigation: Mutex<()>,
}

impl Pagination {
    /// Builder for a pagination that pages through components
    pub fn automatic(hub: &Arc<MenuHub>) -> AutomaticBuilder {
        AutomaticBuilder {
            hub: Arc::downgrade(hub),
            creator: None,
            components: Vec::new(),
            providers: Vec::new(),
            trim_extra: hub.settings().trim_extra_content(),
        }
    }

    /// Builder for a pagination of explicitly registered pages
    pub fn plain(hub: &Arc<MenuHub>) -> PlainBuilder {
        PlainBuilder {
            hub: Arc::downgrade(hub),
            pages: BTreeMap::new(),
            trim_extra: hub.settings().trim_extra_content(),
        }
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self.mode, Mode::Automatic { .. })
    }

    pub fn trims_extra_content(&self) -> bool {
        self.trim_extra
    }

    fn hub(&self) -> Result<Arc<MenuHub>> {
        self.hub
            .upgrade()
            .ok_or(MenuError::Precondition("menu hub no longer exists"))
    }

    fn page_view(&self, page: Arc<dyn Page>, index: usize, page_count: usize) -> Arc<MenuView> {
        page_view(&self.hub, &self.this, page, index, page_count)
    }

    // =========== Pages ===========

    /// Split the components into pages and build a view for each.
    ///
    /// Always produces at least one page. Returns the page count.
    pub fn paginate(&self, viewer: &ViewerId) -> Result<usize> {
        let _guard = self.navigation.lock();
        self.rebuild_pages(viewer)
    }

    /// Caller holds the navigation lock
    fn rebuild_pages(&self, viewer: &ViewerId) -> Result<usize> {
        let Mode::Automatic { creator, components } = &self.mode else {
            return Err(MenuError::Precondition("only automatic paginations can be paginated"));
        };
        let capacity = creator.capacity(&DataRegistry::new(), viewer);
        let per_page = creator.components_per_page(capacity, viewer)?;
        if per_page == 0 {
            return Err(MenuError::Precondition("a page must hold at least one component"));
        }
        let total = components.read().len();
        let page_count = total.div_ceil(per_page).max(1);
        self.per_page.store(per_page, Ordering::Release);
        self.page_count.store(page_count, Ordering::Release);

        let mut pages = BTreeMap::new();
        for index in 0..page_count {
            let view = self.page_view(creator.clone(), index, page_count);
            view.initialize(viewer)?;
            pages.insert(index, view);
        }
        *self.pages.write() = pages;
        info!(
            "Paginated {} components of '{}' into {} pages",
            total,
            creator.name(),
            page_count
        );
        Ok(page_count)
    }

    /// Append components; they show up on the next [`Pagination::paginate`]
    pub fn add_components(&self, added: impl IntoIterator<Item = Arc<dyn PageComponent>>) -> Result<()> {
        match &self.mode {
            Mode::Automatic { components, .. } => {
                components.write().extend(added);
                Ok(())
            }
            Mode::Plain => Err(MenuError::Precondition("plain paginations have no components")),
        }
    }

    pub fn components(&self) -> Vec<Arc<dyn PageComponent>> {
        match &self.mode {
            Mode::Automatic { components, .. } => components.read().clone(),
            Mode::Plain => Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count.load(Ordering::Acquire)
    }

    pub fn page_indices(&self) -> Vec<usize> {
        self.pages.read().keys().copied().collect()
    }

    pub fn pages(&self) -> Vec<Arc<MenuView>> {
        self.pages.read().values().cloned().collect()
    }

    fn first_index(&self) -> Option<usize> {
        self.pages.read().keys().next().copied()
    }

    /// Page at `index`, or the first page when there is none
    pub fn page(&self, index: usize) -> Option<Arc<MenuView>> {
        let default = self.first_index()?;
        self.page_or_default(index, default)
    }

    pub fn page_or_default(&self, index: usize, default: usize) -> Option<Arc<MenuView>> {
        let pages = self.pages.read();
        pages.get(&index).or_else(|| pages.get(&default)).cloned()
    }

    pub fn is_first(&self, index: usize) -> bool {
        match &self.mode {
            Mode::Automatic { .. } => index == 0,
            Mode::Plain => self.first_index() == Some(index),
        }
    }

    pub fn is_last(&self, index: usize) -> bool {
        match &self.mode {
            Mode::Automatic { .. } => index + 1 == self.page_count(),
            Mode::Plain => self.pages.read().keys().next_back() == Some(&index),
        }
    }

    // =========== Navigation ===========

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn viewer(&self) -> Option<ViewerId> {
        self.viewer.read().clone()
    }

    /// Bind `viewer` and show the first page, paginating first when automatic
    pub fn open(&self, viewer: &ViewerId) -> Result<()> {
        let _guard = self.navigation.lock();
        if self.is_automatic() {
            self.rebuild_pages(viewer)?;
        }
        let first = self.first_index().ok_or(MenuError::InvalidPage(0))?;
        self.show(first, viewer)
    }

    /// Bind `viewer` and show the page at `index`
    pub fn open_page(&self, index: usize, viewer: &ViewerId) -> Result<()> {
        let _guard = self.navigation.lock();
        self.show(index, viewer)
    }

    /// Show the page after the current one
    pub fn next(&self) -> Result<()> {
        let _guard = self.navigation.lock();
        let viewer = self.viewer().ok_or(MenuError::NoViewer)?;
        let target = self.current_index() + 1;
        self.show(target, &viewer)
    }

    /// Show the page before the current one
    pub fn previous(&self) -> Result<()> {
        let _guard = self.navigation.lock();
        let viewer = self.viewer().ok_or(MenuError::NoViewer)?;
        let current = self.current_index();
        let target = current
            .checked_sub(1)
            .ok_or(MenuError::InvalidPage(current as i64 - 1))?;
        self.show(target, &viewer)
    }

    /// Caller holds the navigation lock
    fn show(&self, index: usize, viewer: &ViewerId) -> Result<()> {
        let view = self
            .pages
            .read()
            .get(&index)
            .cloned()
            .ok_or(MenuError::InvalidPage(index as i64))?;
        let hub = self.hub()?;
        let this = self
            .this
            .upgrade()
            .ok_or(MenuError::Precondition("pagination no longer exists"))?;

        hub.open_view(viewer, view)?;
        hub.retain_pagination(viewer, this);
        *self.viewer.write() = Some(viewer.clone());
        self.current.store(index, Ordering::Release);
        debug!("Showing page {} to {}", index, viewer);
        Ok(())
    }

    // =========== Page content ===========

    /// Content of the page at `index`: the page's own content with its
    /// navigation buttons and, when automatic, its share of the components
    pub(crate) fn page_content(
        &self,
        page: &Arc<dyn Page>,
        index: usize,
        data: &DataRegistry,
        viewer: &ViewerId,
        capacity: Capacity,
    ) -> Result<Content> {
        let total = capacity.total_size();
        let range = page.fill_range(capacity, viewer)?;
        let reserved = range.count()?.min(total);

        let content = page.content(data, viewer, capacity)?;
        let navigation = self.navigation_content(page, index, capacity, viewer)?;
        if self.trim_extra {
            let evicted = content.trim(total.saturating_sub(reserved + navigation.len()));
            if !evicted.is_empty() {
                debug!("Trimmed {} cells from page {}", evicted.len(), index);
            }
        }
        content.merge_with(&navigation)?;

        match &self.mode {
            Mode::Automatic { components, .. } => {
                let allowed = total - reserved;
                if content.len() > allowed {
                    return Err(MenuError::ContentOverflow {
                        page: index,
                        actual: content.len(),
                        allowed,
                    });
                }
                let components = components.read();
                let per_page = self.per_page.load(Ordering::Acquire).max(1);
                let start = (index * per_page).min(components.len());
                let end = (start + per_page).min(components.len());
                let shown = &components[start..end];

                let free: Vec<_> = range.slots().filter(|slot| !content.contains(*slot)).collect();
                if shown.len() > free.len() {
                    return Err(MenuError::ContentOverflow {
                        page: index,
                        actual: shown.len(),
                        allowed: free.len(),
                    });
                }
                for (slot, component) in free.into_iter().zip(shown) {
                    content.set(slot, component_cell(component))?;
                }
            }
            Mode::Plain => {
                if content.len() > total {
                    return Err(MenuError::ContentOverflow {
                        page: index,
                        actual: content.len(),
                        allowed: total,
                    });
                }
            }
        }
        Ok(content)
    }

    fn navigation_content(
        &self,
        page: &Arc<dyn Page>,
        index: usize,
        capacity: Capacity,
        viewer: &ViewerId,
    ) -> Result<Content> {
        let content = Content::empty(capacity);
        if !self.is_last(index) {
            let cell = self.navigation_cell(page, page.next_page_item(viewer), true);
            content.set(page.next_page_slot(capacity), cell)?;
        }
        if !self.is_first(index) {
            let cell = self.navigation_cell(page, page.previous_page_item(viewer), false);
            content.set(page.previous_page_slot(capacity), cell)?;
        }
        Ok(content)
    }

    fn navigation_cell(&self, page: &Arc<dyn Page>, item: Item, forward: bool) -> Cell {
        let pagination = self.this.clone();
        let page = page.clone();
        Cell::clickable(item, move |view, event| {
            event.cancel();
            let Some(pagination) = pagination.upgrade() else {
                return;
            };
            let result = if forward {
                page.on_switching_to_next_page(&pagination, view, event);
                pagination.next()
            } else {
                page.on_switching_to_previous_page(&pagination, view, event);
                pagination.previous()
            };
            if let Err(e) = result {
                warn!("Page navigation failed: {}", e);
            }
        })
    }
}

fn page_view(
    hub: &Weak<MenuHub>,
    pagination: &Weak<Pagination>,
    page: Arc<dyn Page>,
    index: usize,
    page_count: usize,
) -> Arc<MenuView> {
    let menu = Arc::new(PageMenu {
        page,
        pagination: pagination.clone(),
        index,
    });
    let mut data = DataRegistry::new();
    data.set("index", index);
    data.set("page_count", page_count);
    MenuView::for_page(hub.clone(), menu, pagination.clone(), data)
}

impl fmt::Debug for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pagination")
            .field("automatic", &self.is_automatic())
            .field("pages", &self.page_indices())
            .field("current", &self.current_index())
            .field("viewer", &self.viewer())
            .finish()
    }
}

pub struct AutomaticBuilder {
    hub: Weak<MenuHub>,
    creator: Option<Arc<dyn Page>>,
    components: Vec<Arc<dyn PageComponent>>,
    providers: Vec<Box<dyn ComponentProvider>>,
    trim_extra: bool,
}

impl AutomaticBuilder {
    /// Page definition every page is built from
    pub fn creator(mut self, page: Arc<dyn Page>) -> Self {
        self.creator = Some(page);
        self
    }

    pub fn component(mut self, component: impl PageComponent + 'static) -> Self {
        self.components.push(Arc::new(component));
        self
    }

    pub fn components(mut self, components: impl IntoIterator<Item = Arc<dyn PageComponent>>) -> Self {
        self.components.extend(components);
        self
    }

    /// Components from `provider` come before individually added ones
    pub fn component_provider(mut self, provider: impl ComponentProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn trim_extra_content(mut self, trim: bool) -> Self {
        self.trim_extra = trim;
        self
    }

    pub fn build(self) -> Result<Arc<Pagination>> {
        let creator = self.creator.ok_or(MenuError::MissingPageCreator)?;
        let mut components: Vec<Arc<dyn PageComponent>> = Vec::new();
        for provider in &self.providers {
            components.extend(provider.provide());
        }
        components.extend(self.components);

        let hub = self.hub;
        let trim_extra = self.trim_extra;
        Ok(Arc::new_cyclic(|this| Pagination {
            this: this.clone(),
            hub,
            mode: Mode::Automatic {
                creator,
                components: RwLock::new(components),
            },
            trim_extra,
            pages: RwLock::new(BTreeMap::new()),
            page_count: AtomicUsize::new(0),
            per_page: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            viewer: RwLock::new(None),
            navigation: Mutex::new(()),
        }))
    }
}

pub struct PlainBuilder {
    hub: Weak<MenuHub>,
    pages: BTreeMap<usize, Arc<dyn Page>>,
    trim_extra: bool,
}

impl PlainBuilder {
    /// Register `page` at `index`; indices need not be contiguous
    pub fn page(mut self, index: usize, page: Arc<dyn Page>) -> Self {
        self.pages.insert(index, page);
        self
    }

    pub fn trim_extra_content(mut self, trim: bool) -> Self {
        self.trim_extra = trim;
        self
    }

    pub fn build(self) -> Result<Arc<Pagination>> {
        if self.pages.is_empty() {
            return Err(MenuError::Precondition("a plain pagination needs at least one page"));
        }
        let page_count = self.pages.len();
        let hub = self.hub;
        let trim_extra = self.trim_extra;
        Ok(Arc::new_cyclic(|this| {
            let pages = self
                .pages
                .into_iter()
                .map(|(index, page)| (index, page_view(&hub, this, page, index, page_count)))
                .collect();
            Pagination {
                this: this.clone(),
                hub,
                mode: Mode::Plain,
                trim_extra,
                pages: RwLock::new(pages),
                page_count: AtomicUsize::new(page_count),
                per_page: AtomicUsize::new(0),
                current: AtomicUsize::new(0),
                viewer: RwLock::new(None),
                navigation: Mutex::new(()),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Menu;
    use crate::opener::MemoryOpener;
    use crate::opener::Opener;
    use crate::testing::RefusingOpener;
    use compact_str::CompactString;
    use std::sync::atomic::AtomicBool;
    use gridmenu_core::{ClickEvent, ClickKind, GridError, HostEvent, Slot};

    struct ShopPage {
        range_end: usize,
        filler: Vec<usize>,
    }

    impl ShopPage {
        fn new(range_end: usize) -> Self {
            Self {
                range_end,
                filler: Vec::new(),
            }
        }

        fn with_filler(mut self, slots: impl IntoIterator<Item = usize>) -> Self {
            self.filler.extend(slots);
            self
        }
    }

    impl Menu for ShopPage {
        fn name(&self) -> &str {
            "shop"
        }

        fn title(&self, data: &DataRegistry, _viewer: &ViewerId) -> CompactString {
            let index = data.get::<usize>("index").unwrap_or_default();
            compact_str::format_compact!("Shop {}", index + 1)
        }

        fn capacity(&self, _data: &DataRegistry, _viewer: &ViewerId) -> Capacity {
            Capacity::of_rows(3)
        }

        fn content(&self, _data: &DataRegistry, _viewer: &ViewerId, capacity: Capacity) -> Result<Content> {
            let cells = self
                .filler
                .iter()
                .map(|slot| (Slot::new(*slot), Cell::empty(Item::new("glass"))));
            Ok(Content::from_cells(capacity, cells)?)
        }
    }

    impl Page for ShopPage {
        fn fill_range(&self, capacity: Capacity, _viewer: &ViewerId) -> Result<FillRange, GridError> {
            FillRange::start(capacity).end(Slot::new(self.range_end))
        }

        fn next_page_item(&self, _viewer: &ViewerId) -> Item {
            Item::new("arrow").named("Next")
        }

        fn previous_page_item(&self, _viewer: &ViewerId) -> Item {
            Item::new("arrow").named("Back")
        }
    }

    fn components(count: usize) -> Vec<Arc<dyn PageComponent>> {
        (0..count)
            .map(|i| Arc::new(ItemComponent::new(Item::new(format!("c{i}")))) as Arc<dyn PageComponent>)
            .collect()
    }

    fn setup() -> (Arc<MenuHub>, Arc<MemoryOpener>, ViewerId) {
        let opener = Arc::new(MemoryOpener::new());
        (MenuHub::new(opener.clone()), opener, ViewerId::from("alex"))
    }

    fn shop(hub: &Arc<MenuHub>, count: usize) -> Arc<Pagination> {
        Pagination::automatic(hub)
            .creator(Arc::new(ShopPage::new(10)))
            .components(components(count))
            .build()
            .unwrap()
    }

    fn click(hub: &MenuHub, viewer: &ViewerId, slot: usize) {
        let surface = hub.open_view_of(viewer).and_then(|v| v.surface_id()).unwrap();
        let mut event = HostEvent::Click(ClickEvent::new(
            viewer.clone(),
            surface,
            Some(Slot::new(slot)),
            ClickKind::Left,
        ));
        hub.dispatch(&mut event);
    }

    #[test]
    fn test_page_count() {
        let (hub, _, viewer) = setup();
        assert_eq!(shop(&hub, 25).paginate(&viewer).unwrap(), 3);
        assert_eq!(shop(&hub, 20).paginate(&viewer).unwrap(), 2);
        assert_eq!(shop(&hub, 0).paginate(&viewer).unwrap(), 1);
    }

    #[test]
    fn test_last_page_holds_remainder() {
        let (hub, _, viewer) = setup();
        let pagination = shop(&hub, 25);
        pagination.paginate(&viewer).unwrap();

        let content = pagination.page(2).unwrap().content().unwrap();
        for i in 0..5 {
            assert_eq!(content.item(Slot::new(i)).unwrap().material, format!("c{}", 20 + i));
        }
        assert!(!content.contains(Slot::new(5)));
        // previous button only
        assert_eq!(content.item(Slot::new(18)).unwrap().label(), "Back");
        assert!(!content.contains(Slot::new(26)));

        let first = pagination.page(0).unwrap().content().unwrap();
        assert_eq!(first.item(Slot::new(26)).unwrap().label(), "Next");
        assert!(!first.contains(Slot::new(18)));
    }

    #[test]
    fn test_automatic_boundaries() {
        let (hub, _, viewer) = setup();
        let pagination = shop(&hub, 25);
        pagination.paginate(&viewer).unwrap();
        assert!(pagination.is_first(0));
        assert!(!pagination.is_first(1));
        assert!(pagination.is_last(2));
        assert!(!pagination.is_last(3));
    }

    #[test]
    fn test_navigation_buttons() {
        let (hub, opener, viewer) = setup();
        let pagination = shop(&hub, 25);
        pagination.open(&viewer).unwrap();
        assert_eq!(pagination.current_index(), 0);
        let first = pagination.page(0).unwrap();
        assert!(Arc::ptr_eq(&hub.open_view_of(&viewer).unwrap(), &first));

        click(&hub, &viewer, 26);
        assert_eq!(pagination.current_index(), 1);
        assert!(!first.is_open());
        let second = hub.open_view_of(&viewer).unwrap();
        assert_eq!(second.page_index(), Some(1));
        let surface = opener.surface(&viewer).unwrap();
        assert_eq!(surface.item(Slot::new(0)).unwrap().material, "c10");
        assert_eq!(surface.title(), "Shop 2");

        click(&hub, &viewer, 18);
        assert_eq!(pagination.current_index(), 0);
        assert!(first.is_open());
    }

    #[test]
    fn test_plain_navigation_errors() {
        let (hub, _, viewer) = setup();
        let pagination = Pagination::plain(&hub)
            .page(0, Arc::new(ShopPage::new(10)))
            .page(3, Arc::new(ShopPage::new(10)))
            .build()
            .unwrap();
        assert!(pagination.is_first(0));
        assert!(pagination.is_last(3));
        assert!(!pagination.is_last(1));
        assert!(Arc::ptr_eq(&pagination.page(1).unwrap(), &pagination.page(0).unwrap()));

        pagination.open(&viewer).unwrap();
        let first = hub.open_view_of(&viewer).unwrap();
        assert!(matches!(pagination.next(), Err(MenuError::InvalidPage(1))));
        assert_eq!(pagination.current_index(), 0);
        assert!(Arc::ptr_eq(&hub.open_view_of(&viewer).unwrap(), &first));
        assert!(first.is_open());

        pagination.open_page(3, &viewer).unwrap();
        assert!(matches!(pagination.previous(), Err(MenuError::InvalidPage(2))));
        assert_eq!(pagination.current_index(), 3);
    }

    #[test]
    fn test_navigation_without_viewer() {
        let (hub, _, viewer) = setup();
        let pagination = shop(&hub, 25);
        assert!(matches!(pagination.next(), Err(MenuError::NoViewer)));

        pagination.open(&viewer).unwrap();
        assert!(matches!(pagination.previous(), Err(MenuError::InvalidPage(-1))));
        assert_eq!(pagination.current_index(), 0);
    }

    #[test]
    fn test_missing_creator() {
        let (hub, _, _) = setup();
        let result = Pagination::automatic(&hub).components(components(3)).build();
        assert!(matches!(result, Err(MenuError::MissingPageCreator)));
        assert!(Pagination::plain(&hub).build().is_err());
    }

    #[test]
    fn test_content_overflow() {
        let (hub, _, viewer) = setup();
        // 18 reserved slots leave room for 9 cells
        let pagination = Pagination::automatic(&hub)
            .creator(Arc::new(ShopPage::new(18).with_filler(17..27)))
            .components(components(4))
            .build()
            .unwrap();
        let err = pagination.paginate(&viewer).unwrap_err();
        assert!(matches!(
            err,
            MenuError::ContentOverflow { page: 0, actual: 10, allowed: 9 }
        ));
        assert!(err.is_definition());
    }

    #[test]
    fn test_trim_extra_content() {
        let (hub, _, viewer) = setup();
        let pagination = Pagination::automatic(&hub)
            .creator(Arc::new(ShopPage::new(18).with_filler(17..27)))
            .components(components(4))
            .trim_extra_content(true)
            .build()
            .unwrap();
        pagination.paginate(&viewer).unwrap();

        let content = pagination.page(0).unwrap().content().unwrap();
        assert!(!content.contains(Slot::new(26)));
        assert_eq!(content.item(Slot::new(17)).unwrap().material, "glass");
        assert_eq!(content.item(Slot::new(3)).unwrap().material, "c3");
        assert_eq!(content.len(), 9 + 4);
    }

    #[test]
    fn test_component_provider() {
        let (hub, _, viewer) = setup();
        let pagination = Pagination::automatic(&hub)
            .creator(Arc::new(ShopPage::new(10)))
            .component_provider(|| components(12))
            .component(ItemComponent::new(Item::new("extra")))
            .build()
            .unwrap();
        assert_eq!(pagination.components().len(), 13);
        assert_eq!(pagination.paginate(&viewer).unwrap(), 2);

        let last = pagination.page(1).unwrap().content().unwrap();
        assert_eq!(last.item(Slot::new(2)).unwrap().material, "extra");
    }

    #[test]
    fn test_failed_navigation_keeps_current_page() {
        let opener = Arc::new(RefusingOpener::new());
        let hub = MenuHub::new(opener.clone());
        let viewer = ViewerId::from("alex");
        let pagination = shop(&hub, 25);
        pagination.open(&viewer).unwrap();
        let first = hub.open_view_of(&viewer).unwrap();
        let surface = first.surface_id().unwrap();

        opener.refuse(true);
        assert!(matches!(pagination.next(), Err(MenuError::Surface(_))));
        assert_eq!(pagination.current_index(), 0);
        assert!(first.is_open());
        assert!(Arc::ptr_eq(&hub.open_view_of(&viewer).unwrap(), &first));
        assert_eq!(opener.active_surface(&viewer), Some(surface));

        // a viewer that never got a page is not bound
        let other = ViewerId::from("sam");
        let pagination = shop(&hub, 5);
        assert!(pagination.open(&other).is_err());
        assert!(pagination.viewer().is_none());
        assert!(hub.pagination_of(&other).is_none());
    }

    #[test]
    fn test_concurrent_next_is_serialized() {
        let (hub, opener, viewer) = setup();
        // 200 components, 10 per page
        let pagination = shop(&hub, 200);
        pagination.open(&viewer).unwrap();
        assert_eq!(pagination.page_count(), 20);

        let results: Vec<Result<()>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| (0..3).map(|_| pagination.next()).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 19);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, MenuError::InvalidPage(20))));
        assert_eq!(pagination.current_index(), 19);
        let open: Vec<_> = pagination.pages().into_iter().filter(|p| p.is_open()).collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].page_index(), Some(19));
        assert_eq!(opener.surface(&viewer).unwrap().title(), "Shop 20");
    }

    #[test]
    fn test_paginate_races_navigation() {
        let (hub, _, viewer) = setup();
        let pagination = shop(&hub, 30);
        pagination.open(&viewer).unwrap();
        let stop = AtomicBool::new(false);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..50 {
                    pagination.paginate(&viewer).unwrap();
                }
                stop.store(true, Ordering::Release);
            });
            scope.spawn(|| {
                while !stop.load(Ordering::Acquire) {
                    let _ = pagination.next();
                    let _ = pagination.previous();
                }
            });
        });

        assert_eq!(pagination.page_indices(), vec![0, 1, 2]);
        let index = pagination.current_index();
        let current = hub.open_view_of(&viewer).unwrap();
        assert_eq!(current.page_index(), Some(index));
        assert!(current.is_open());
    }

    #[test]
    fn test_released_when_viewer_leaves() {
        let (hub, _, viewer) = setup();
        let pagination = shop(&hub, 5);
        let weak = Arc::downgrade(&pagination);
        pagination.open(&viewer).unwrap();
        drop(pagination);

        assert!(hub.pagination_of(&viewer).is_some());
        hub.close_view(&viewer);
        assert!(hub.pagination_of(&viewer).is_none());
        assert!(weak.upgrade().is_none());
    }
}
