use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use compact_str::CompactString;
use gridmenu_core::{Capacity, ClickEvent, DataRegistry, DragEvent, Item, Slot, SurfaceId, ViewerId};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cell::{AnimationTiming, Cell};
use crate::content::Content;
use crate::error::{MenuError, Result};
use crate::hub::MenuHub;
use crate::menu::Menu;
use crate::opener::{render_all, Opener, Surface};
use crate::pagination::Pagination;

/// What a view renders: produced by the menu each time the view initializes
#[derive(Debug, Clone)]
pub struct ViewData {
    pub title: CompactString,
    pub capacity: Capacity,
    pub content: Arc<Content>,
}

#[derive(Default)]
struct Binding {
    data: Option<ViewData>,
    viewer: Option<ViewerId>,
    surface: Option<Arc<dyn Surface>>,
    opener: Option<Arc<dyn Opener>>,
}

impl Binding {
    fn live(&self) -> Option<Live<'_>> {
        Some(Live {
            data: self.data.as_ref()?,
            viewer: self.viewer.as_ref()?,
            surface: self.surface.as_ref()?,
            opener: self.opener.as_ref()?,
        })
    }
}

/// Borrowed parts of an open view
struct Live<'a> {
    data: &'a ViewData,
    viewer: &'a ViewerId,
    surface: &'a Arc<dyn Surface>,
    opener: &'a Arc<dyn Opener>,
}

impl Live<'_> {
    /// The host must still be showing our surface to our viewer
    fn check_sync(&self) -> Result<()> {
        let expected = self.surface.id();
        match self.opener.active_surface(self.viewer) {
            Some(active) if active == expected => Ok(()),
            _ => Err(MenuError::Desynchronized { expected }),
        }
    }

    fn render(&self, slot: Slot, cell: Option<&Cell>) {
        self.surface.set_item(slot, cell.and_then(Cell::item));
    }
}

/// Scheduling state of one animated cell
#[derive(Debug, Clone, Copy)]
struct AnimationTask {
    timing: AnimationTiming,
    ticks: u64,
}

/// Live binding of one menu to one viewer's surface.
///
/// A view moves from unbound to open through [`MenuHub::open_view`] and back
/// to closed when the hub closes it. It counts as open only while its view
/// data, viewer and surface are all present; each can be cleared by a
/// different path.
///
/// Locking: the binding lock is never held while menu hooks or click actions
/// run, so those may call back into the view or the hub. Animation ticks hold
/// the binding read lock for their whole batch and closing takes the write
/// lock, so no animation can run against a closed view. Every content change
/// is rendered under the edit lock, so the surface always ends up showing
/// the content's last state.
pub struct MenuView {
    hub: Weak<MenuHub>,
    menu: Arc<dyn Menu>,
    pagination: Option<Weak<Pagination>>,
    data: RwLock<DataRegistry>,
    binding: RwLock<Binding>,
    animations: Mutex<AnimationTasks>,
    edits: Mutex<()>,
    closing: AtomicBool,
}

#[derive(Default)]
struct AnimationTasks {
    tasks: BTreeMap<Slot, AnimationTask>,
    cancelled: bool,
}

impl MenuView {
    pub fn new(hub: Weak<MenuHub>, menu: Arc<dyn Menu>) -> Arc<Self> {
        Self::with_data(hub, menu, DataRegistry::new())
    }

    pub fn with_data(hub: Weak<MenuHub>, menu: Arc<dyn Menu>, data: DataRegistry) -> Arc<Self> {
        Arc::new(Self::build(hub, menu, None, data))
    }

    pub(crate) fn for_page(
        hub: Weak<MenuHub>,
        menu: Arc<dyn Menu>,
        pagination: Weak<Pagination>,
        data: DataRegistry,
    ) -> Arc<Self> {
        Arc::new(Self::build(hub, menu, Some(pagination), data))
    }

    fn build(
        hub: Weak<MenuHub>,
        menu: Arc<dyn Menu>,
        pagination: Option<Weak<Pagination>>,
        data: DataRegistry,
    ) -> Self {
        Self {
            hub,
            menu,
            pagination,
            data: RwLock::new(data),
            binding: RwLock::new(Binding::default()),
            animations: Mutex::new(AnimationTasks::default()),
            edits: Mutex::new(()),
            closing: AtomicBool::new(false),
        }
    }

    pub fn hub(&self) -> Option<Arc<MenuHub>> {
        self.hub.upgrade()
    }

    pub fn menu(&self) -> &Arc<dyn Menu> {
        &self.menu
    }

    /// Pagination this view is a page of
    pub fn pagination(&self) -> Option<Arc<Pagination>> {
        self.pagination.as_ref()?.upgrade()
    }

    pub fn is_page(&self) -> bool {
        self.pagination.is_some()
    }

    /// Page index for page views
    pub fn page_index(&self) -> Option<usize> {
        self.data.read().get::<usize>("index")
    }

    /// Snapshot of the view's side data
    pub fn data(&self) -> DataRegistry {
        self.data.read().clone()
    }

    pub fn set_data<T: std::any::Any + Send + Sync>(&self, key: &str, value: T) {
        self.data.write().set(key, value);
    }

    pub fn viewer(&self) -> Option<ViewerId> {
        self.binding.read().viewer.clone()
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.binding.read().surface.as_ref().map(|s| s.id())
    }

    pub fn view_data(&self) -> Option<ViewData> {
        self.binding.read().data.clone()
    }

    pub fn content(&self) -> Option<Arc<Content>> {
        self.binding.read().data.as_ref().map(|d| d.content.clone())
    }

    pub fn title(&self) -> Option<CompactString> {
        self.binding.read().data.as_ref().map(|d| d.title.clone())
    }

    pub fn cell(&self, slot: Slot) -> Option<Cell> {
        self.content()?.get(slot)
    }

    pub fn is_open(&self) -> bool {
        let binding = self.binding.read();
        binding.data.is_some() && binding.viewer.is_some() && binding.surface.is_some()
    }

    fn build_data(&self, viewer: &ViewerId) -> Result<ViewData> {
        let data = self.data();
        let title = self.menu.title(&data, viewer);
        let capacity = self.menu.capacity(&data, viewer);
        let content = self.menu.content(&data, viewer, capacity)?;
        Ok(ViewData {
            title,
            capacity,
            content: Arc::new(content),
        })
    }

    /// Recompute title, capacity and content from the menu.
    ///
    /// Safe to call any number of times; an open surface is not re-rendered,
    /// see [`MenuView::refresh`] for that.
    pub fn initialize(&self, viewer: &ViewerId) -> Result<ViewData> {
        let data = self.build_data(viewer)?;
        self.binding.write().data = Some(data.clone());
        Ok(data)
    }

    /// Bind `viewer`, build fresh view data and show it through `opener`
    pub(crate) fn open(&self, opener: Arc<dyn Opener>, viewer: &ViewerId) -> Result<SurfaceId> {
        let data = self.build_data(viewer)?;
        let surface = opener.open_surface(viewer, &data)?;
        let id = surface.id();

        let mut binding = self.binding.write();
        self.start_animations(&data.content);
        binding.data = Some(data);
        binding.viewer = Some(viewer.clone());
        binding.surface = Some(surface);
        binding.opener = Some(opener);
        self.closing.store(false, Ordering::Release);
        debug!("Opened '{}' for {} on {}", self.menu.name(), viewer, id);
        Ok(id)
    }

    /// Run the close hook, then cancel animations and drop viewer and surface.
    ///
    /// View data is kept so a closed view can still be inspected.
    pub(crate) fn close(&self) -> bool {
        if !self.is_open() || self.closing.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.menu.on_close(self);

        let mut binding = self.binding.write();
        self.animations.lock().tasks.clear();
        let viewer = binding.viewer.take();
        binding.surface = None;
        binding.opener = None;
        debug!(
            "Closed '{}' for {}",
            self.menu.name(),
            viewer.as_ref().map(ViewerId::as_str).unwrap_or("-")
        );
        true
    }

    pub(crate) fn handle_open(&self) {
        self.menu.on_open(self);
    }

    /// Pre-click veto, then the clicked cell's action, then the post-click hook
    pub fn handle_click(&self, event: &mut ClickEvent) {
        event.cancel();
        if !self.menu.on_pre_click(self, event) {
            return;
        }
        if let Some(slot) = event.slot {
            if !self.is_open() {
                debug!("Ignoring click on closed view '{}'", self.menu.name());
                return;
            }
            let action = self
                .content()
                .and_then(|content| content.with_cell(slot, |cell| cell.action().cloned()))
                .flatten();
            if let Some(action) = action {
                action.execute(self, event);
            }
        }
        self.menu.on_post_click(self, event);
    }

    pub fn handle_drag(&self, event: &mut DragEvent) {
        self.menu.on_drag(self, event);
    }

    fn with_live<R>(&self, f: impl FnOnce(&Live<'_>) -> Result<R>) -> Result<R> {
        let binding = self.binding.read();
        let live = binding.live().ok_or(MenuError::NotOpen)?;
        live.check_sync()?;
        let _edit = self.edits.lock();
        f(&live)
    }

    /// Put `cell` at `slot` and show it
    pub fn replace_cell(&self, slot: Slot, cell: Cell) -> Result<()> {
        self.with_live(|live| {
            live.data.content.set(slot, cell.clone())?;
            self.sync_animations(&live.data.content);
            live.render(slot, Some(&cell));
            live.surface.refresh();
            Ok(())
        })
    }

    pub fn remove_cell(&self, slot: Slot) -> Result<Option<Cell>> {
        self.with_live(|live| {
            let removed = live.data.content.remove(slot);
            if removed.is_some() {
                self.sync_animations(&live.data.content);
                live.render(slot, None);
                live.surface.refresh();
            }
            Ok(removed)
        })
    }

    /// Swap the item of an existing cell.
    ///
    /// With `overwrite` the cell is replaced by a plain cell showing `item`,
    /// otherwise only its item changes. Returns whether a cell was there.
    pub fn replace_item(&self, slot: Slot, item: Option<Item>, overwrite: bool) -> Result<bool> {
        self.update_cell(slot, |cell| {
            if overwrite {
                *cell = Cell::from_parts(item, None);
            } else {
                cell.set_item(item);
            }
        })
    }

    /// Atomically update the cell at `slot` and show the result.
    ///
    /// `f` runs with the content locked and must not call back into this view.
    pub fn update_cell(&self, slot: Slot, f: impl FnOnce(&mut Cell)) -> Result<bool> {
        self.with_live(|live| match live.data.content.update(slot, f) {
            Some(cell) => {
                self.sync_animations(&live.data.content);
                live.render(slot, Some(&cell));
                live.surface.refresh();
                Ok(true)
            }
            None => Ok(false),
        })
    }

    /// Update the item of the cell at `slot`, if it shows one
    pub fn update_item(&self, slot: Slot, f: impl FnOnce(&mut Item)) -> Result<bool> {
        self.update_cell(slot, |cell| {
            if let Some(item) = cell.item_mut() {
                f(item);
            }
        })
    }

    /// Update every cell accepted by `condition`, returning how many
    pub fn update_all(
        &self,
        condition: impl Fn(Slot, &Cell) -> bool,
        updater: impl FnMut(&mut Cell),
    ) -> Result<usize> {
        self.with_live(|live| {
            let updated = live.data.content.update_all(condition, updater);
            if !updated.is_empty() {
                self.sync_animations(&live.data.content);
            }
            for slot in &updated {
                live.data
                    .content
                    .with_cell(*slot, |cell| live.render(*slot, Some(cell)));
            }
            if !updated.is_empty() {
                live.surface.refresh();
            }
            Ok(updated.len())
        })
    }

    /// Place cells in the next empty slots and show them
    pub fn add_cells(&self, cells: impl IntoIterator<Item = Cell>) -> Result<Vec<Slot>> {
        self.with_live(|live| {
            let placed = live.data.content.add(cells);
            if !placed.is_empty() {
                self.sync_animations(&live.data.content);
            }
            for slot in &placed {
                live.data
                    .content
                    .with_cell(*slot, |cell| live.render(*slot, Some(cell)));
            }
            if !placed.is_empty() {
                live.surface.refresh();
            }
            Ok(placed)
        })
    }

    pub fn search(&self, condition: impl Fn(Slot, &Cell) -> bool) -> Vec<(Slot, Cell)> {
        self.content()
            .map(|content| content.search(condition))
            .unwrap_or_default()
    }

    /// Rebuild the view data from the menu and re-render the surface
    pub fn refresh(&self) -> Result<()> {
        let viewer = self.viewer().ok_or(MenuError::NotOpen)?;
        let fresh = self.build_data(&viewer)?;

        let mut binding = self.binding.write();
        {
            let live = binding.live().ok_or(MenuError::NotOpen)?;
            live.check_sync()?;
            for slot in live.data.content.slots() {
                if !fresh.content.contains(slot) {
                    live.render(slot, None);
                }
            }
            render_all(live.surface.as_ref(), &fresh);
        }
        self.start_animations(&fresh.content);
        binding.data = Some(fresh);
        Ok(())
    }

    fn start_animations(&self, content: &Content) {
        let mut animations = self.animations.lock();
        animations.cancelled = false;
        animations.tasks.clear();
        animations.tasks.extend(
            content
                .animated()
                .into_iter()
                .map(|(slot, timing)| (slot, AnimationTask { timing, ticks: 0 })),
        );
    }

    /// Match the animation tasks to the animated cells of `content`.
    ///
    /// A slot whose cell keeps the same cadence keeps its tick count; new
    /// animated cells start from zero. Nothing is tracked once cancelled.
    fn sync_animations(&self, content: &Content) {
        let animated = content.animated();
        let mut animations = self.animations.lock();
        if animations.cancelled || self.closing.load(Ordering::Acquire) {
            return;
        }
        animations
            .tasks
            .retain(|slot, task| animated.iter().any(|(s, t)| s == slot && *t == task.timing));
        for (slot, timing) in animated {
            animations
                .tasks
                .entry(slot)
                .or_insert(AnimationTask { timing, ticks: 0 });
        }
    }

    /// Refresh the tasks from the current content; true when any remain
    pub(crate) fn track_animations(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        if let Some(content) = self.content() {
            self.sync_animations(&content);
        }
        self.animation_task_count() > 0
    }

    /// Number of animation tasks registered for this view
    pub fn animation_task_count(&self) -> usize {
        self.animations.lock().tasks.len()
    }

    pub(crate) fn prefers_offload(&self) -> bool {
        self.animations.lock().tasks.values().any(|t| t.timing.offload)
    }

    /// Stop animating until the view is opened or refreshed again
    pub(crate) fn cancel_animations(&self) {
        let mut animations = self.animations.lock();
        animations.cancelled = true;
        animations.tasks.clear();
    }

    /// Advance every animation due on this tick and show the new frames.
    ///
    /// Returns how many cells changed.
    pub(crate) fn tick_animations(&self) -> Result<usize> {
        if self.closing.load(Ordering::Acquire) {
            return Ok(0);
        }
        let binding = self.binding.read();
        let Some(live) = binding.live() else {
            return Ok(0);
        };
        let _edit = self.edits.lock();

        self.sync_animations(&live.data.content);
        let due: Vec<Slot> = {
            let mut animations = self.animations.lock();
            animations
                .tasks
                .iter_mut()
                .filter_map(|(slot, task)| {
                    let tick = task.ticks;
                    task.ticks += 1;
                    task.timing.is_due(tick).then_some(*slot)
                })
                .collect()
        };
        if due.is_empty() {
            return Ok(0);
        }
        live.check_sync()?;

        let mut changed = 0;
        for slot in due {
            if let Some(cell) = live.data.content.update(slot, |cell| {
                cell.advance_animation();
            }) {
                live.render(slot, Some(&cell));
                changed += 1;
            }
        }
        if changed > 0 {
            live.surface.refresh();
        }
        Ok(changed)
    }
}

impl std::fmt::Debug for MenuView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuView")
            .field("menu", &self.menu.name())
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Animation, FrameAnimator};
    use crate::opener::MemoryOpener;
    use crate::testing::TestMenu;
    use gridmenu_core::{ClickKind, HostEvent};
    use std::sync::atomic::Ordering as AtomicOrdering;

    fn animated(frames: usize) -> Cell {
        Cell::animated(Animation::new(FrameAnimator::new(
            (0..frames).map(|i| Item::new(format!("f{}", i))),
        )))
    }

    fn setup(menu: TestMenu) -> (Arc<MenuHub>, Arc<MemoryOpener>, Arc<TestMenu>, ViewerId) {
        let opener = Arc::new(MemoryOpener::new());
        let hub = MenuHub::new(opener.clone());
        (hub, opener, Arc::new(menu), ViewerId::from("alex"))
    }

    #[test]
    fn test_lifecycle() {
        let (hub, _, menu, viewer) = setup(TestMenu::new("life", 2).with_cell(3, animated(2)));
        let view = hub.create_view(menu.clone());
        assert!(!view.is_open());
        assert_eq!(view.animation_task_count(), 0);

        hub.open_view(&viewer, view.clone()).unwrap();
        assert!(view.is_open());
        assert_eq!(view.animation_task_count(), 1);
        assert_eq!(menu.opened.load(AtomicOrdering::SeqCst), 1);

        assert!(hub.close_view(&viewer));
        assert!(!view.is_open());
        assert_eq!(view.animation_task_count(), 0);
        assert_eq!(menu.closed.load(AtomicOrdering::SeqCst), 1);

        // a second close is a no-op
        assert!(!view.close());
        assert_eq!(menu.closed.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_initialize_is_repeatable() {
        let (hub, _, menu, viewer) = setup(TestMenu::new("init", 1).with_cell(0, Cell::blank()));
        let view = hub.create_view(menu);
        let first = view.initialize(&viewer).unwrap();
        let second = view.initialize(&viewer).unwrap();
        assert_eq!(first.content.len(), second.content.len());
        assert!(!view.is_open());
    }

    #[test]
    fn test_mutations_reach_surface() {
        let (hub, opener, menu, viewer) =
            setup(TestMenu::new("edit", 1).with_cell(0, Cell::empty(Item::new("stone"))));
        let view = hub.open_menu(&viewer, menu).unwrap();
        let surface = opener.surface(&viewer).unwrap();
        let refreshes = surface.refresh_count();

        view.replace_cell(Slot::new(2), Cell::empty(Item::new("gold"))).unwrap();
        assert_eq!(surface.item(Slot::new(2)), Some(Item::new("gold")));

        assert!(view.update_item(Slot::new(0), |item| item.amount = 7).unwrap());
        assert_eq!(surface.item(Slot::new(0)).map(|i| i.amount), Some(7));
        assert_eq!(view.cell(Slot::new(0)).and_then(|c| c.item().map(|i| i.amount)), Some(7));

        assert!(view.replace_item(Slot::new(2), None, false).unwrap());
        assert_eq!(surface.item(Slot::new(2)), None);
        assert!(!view.replace_item(Slot::new(5), None, true).unwrap());

        let placed = view.add_cells([Cell::empty(Item::new("apple"))]).unwrap();
        assert_eq!(placed, vec![Slot::new(1)]);
        assert_eq!(surface.item(Slot::new(1)), Some(Item::new("apple")));

        let updated = view
            .update_all(|_, cell| cell.item().is_some(), |cell| cell.set_item(Some(Item::new("dirt"))))
            .unwrap();
        assert_eq!(updated, 2);
        assert_eq!(surface.item(Slot::new(1)), Some(Item::new("dirt")));
        assert!(surface.refresh_count() > refreshes);

        assert!(matches!(
            view.replace_cell(Slot::new(40), Cell::blank()),
            Err(MenuError::Grid(_))
        ));
    }

    #[test]
    fn test_mutation_on_closed_view() {
        let (hub, _, menu, viewer) = setup(TestMenu::new("closed", 1));
        let view = hub.open_menu(&viewer, menu).unwrap();
        hub.close_view(&viewer);
        assert!(matches!(
            view.replace_cell(Slot::new(0), Cell::blank()),
            Err(MenuError::NotOpen)
        ));
    }

    #[test]
    fn test_desynchronized_mutation_rejected() {
        let (hub, opener, menu, viewer) = setup(TestMenu::new("desync", 1));
        let view = hub.open_menu(&viewer, menu).unwrap();
        opener.swap_surface(&viewer);

        let result = view.replace_cell(Slot::new(0), Cell::empty(Item::new("gold")));
        assert!(matches!(result, Err(MenuError::Desynchronized { .. })));
        assert!(view.cell(Slot::new(0)).is_none());
    }

    #[test]
    fn test_refresh_rebuilds_surface() {
        let (hub, opener, menu, viewer) =
            setup(TestMenu::new("refresh", 1).with_cell(0, Cell::empty(Item::new("stone"))));
        let view = hub.open_menu(&viewer, menu).unwrap();
        view.replace_cell(Slot::new(4), Cell::empty(Item::new("gold"))).unwrap();

        view.refresh().unwrap();
        let surface = opener.surface(&viewer).unwrap();
        assert_eq!(surface.item(Slot::new(4)), None);
        assert_eq!(surface.item(Slot::new(0)), Some(Item::new("stone")));
        assert!(view.cell(Slot::new(4)).is_none());
    }

    #[test]
    fn test_tick_advances_and_renders() {
        let (hub, opener, menu, viewer) = setup(TestMenu::new("anim", 1).with_cell(0, animated(4)));
        let view = hub.open_menu(&viewer, menu).unwrap();
        for _ in 0..5 {
            view.tick_animations().unwrap();
        }
        let frame = view
            .cell(Slot::new(0))
            .and_then(|c| c.animation().map(Animation::frame));
        assert_eq!(frame, Some(1));
        assert_eq!(
            opener.surface(&viewer).and_then(|s| s.item(Slot::new(0))),
            Some(Item::new("f1"))
        );

        hub.close_view(&viewer);
        assert_eq!(view.tick_animations().unwrap(), 0);
    }

    #[test]
    fn test_animations_follow_content_changes() {
        let (hub, opener, menu, viewer) = setup(TestMenu::new("later", 1));
        let view = hub.open_menu(&viewer, menu).unwrap();
        assert_eq!(view.animation_task_count(), 0);

        view.replace_cell(Slot::new(2), animated(4)).unwrap();
        assert_eq!(view.animation_task_count(), 1);
        for _ in 0..3 {
            assert_eq!(view.tick_animations().unwrap(), 1);
        }
        let frame = view
            .cell(Slot::new(2))
            .and_then(|c| c.animation().map(Animation::frame));
        assert_eq!(frame, Some(3));

        view.replace_cell(Slot::new(2), Cell::empty(Item::new("stone"))).unwrap();
        assert_eq!(view.animation_task_count(), 0);
        let surface = opener.surface(&viewer).unwrap();
        let refreshes = surface.refresh_count();
        assert_eq!(view.tick_animations().unwrap(), 0);
        assert_eq!(surface.refresh_count(), refreshes);
        assert_eq!(surface.item(Slot::new(2)), Some(Item::new("stone")));

        view.add_cells([animated(2)]).unwrap();
        assert_eq!(view.animation_task_count(), 1);
        view.remove_cell(Slot::new(0)).unwrap();
        assert_eq!(view.animation_task_count(), 0);
    }

    #[test]
    fn test_cancelled_animations_stay_cancelled() {
        let (hub, _, menu, viewer) = setup(TestMenu::new("cancel", 1).with_cell(0, animated(3)));
        let view = hub.open_menu(&viewer, menu).unwrap();
        view.cancel_animations();
        view.replace_cell(Slot::new(1), animated(3)).unwrap();
        assert!(!view.track_animations());
        assert_eq!(view.tick_animations().unwrap(), 0);

        view.refresh().unwrap();
        assert_eq!(view.animation_task_count(), 1);
    }

    #[test]
    fn test_ticks_race_edits_and_clicks() {
        let counter = Cell::item_transformer(Item::new("counter"), |item| {
            item.clone().with_amount(item.amount + 1)
        });
        let stack = Cell::transformer(Item::new("stack"), |cell, _| {
            let mut next = cell.clone();
            if let Some(item) = next.item_mut() {
                item.amount += 1;
            }
            next
        });
        let (hub, opener, menu, viewer) = setup(
            TestMenu::new("race", 1)
                .with_cell(0, animated(4))
                .with_cell(1, counter)
                .with_cell(2, stack),
        );
        let view = hub.open_menu(&viewer, menu).unwrap();
        let surface_id = view.surface_id().unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..200 {
                    view.tick_animations().unwrap();
                }
            });
            scope.spawn(|| {
                for i in 0..200 {
                    let cell = if i % 2 == 0 {
                        Cell::empty(Item::new(format!("s{i}")))
                    } else {
                        animated(4)
                    };
                    view.replace_cell(Slot::new(0), cell).unwrap();
                }
            });
            for _ in 0..2 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        for slot in [1, 2] {
                            let mut event = HostEvent::Click(ClickEvent::new(
                                viewer.clone(),
                                surface_id,
                                Some(Slot::new(slot)),
                                ClickKind::Left,
                            ));
                            hub.dispatch(&mut event);
                        }
                    }
                });
            }
        });

        let surface = opener.surface(&viewer).unwrap();
        for slot in (0..3).map(Slot::new) {
            assert_eq!(surface.item(slot), view.cell(slot).and_then(|c| c.item().cloned()));
        }
        assert_eq!(surface.item(Slot::new(1)).map(|i| i.amount), Some(201));
        assert_eq!(surface.item(Slot::new(2)).map(|i| i.amount), Some(201));
        assert_eq!(view.animation_task_count(), 1);
    }

    #[test]
    fn test_search() {
        let (hub, _, menu, viewer) = setup(
            TestMenu::new("search", 1)
                .with_cell(0, Cell::empty(Item::new("stone")))
                .with_cell(5, Cell::empty(Item::new("gold"))),
        );
        let view = hub.open_menu(&viewer, menu).unwrap();
        let found = view.search(|_, cell| cell.shows(&Item::new("gold")));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, Slot::new(5));
    }
}
