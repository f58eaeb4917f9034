use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use compact_str::CompactString;
use gridmenu_core::{Capacity, Item, Slot, SurfaceId, ViewerId};
use parking_lot::{Mutex, RwLock};

use super::{render_all, Opener, Surface};
use crate::error::Result;
use crate::view::ViewData;

/// Surface kept in memory, recording what was rendered
pub struct MemorySurface {
    id: SurfaceId,
    title: CompactString,
    capacity: Capacity,
    items: RwLock<BTreeMap<Slot, Item>>,
    refreshes: AtomicUsize,
}

impl MemorySurface {
    pub fn new(id: SurfaceId, title: CompactString, capacity: Capacity) -> Self {
        Self {
            id,
            title,
            capacity,
            items: RwLock::new(BTreeMap::new()),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn item(&self, slot: Slot) -> Option<Item> {
        self.items.read().get(&slot).cloned()
    }

    pub fn items(&self) -> BTreeMap<Slot, Item> {
        self.items.read().clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::Relaxed)
    }
}

impl Surface for MemorySurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn set_item(&self, slot: Slot, item: Option<&Item>) {
        let mut items = self.items.write();
        match item {
            Some(item) => {
                items.insert(slot, item.clone());
            }
            None => {
                items.remove(&slot);
            }
        }
    }

    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Opener backed by [`MemorySurface`]s.
///
/// Useful as a host stand-in: it tracks one active surface per viewer the way
/// a real host session would.
#[derive(Default)]
pub struct MemoryOpener {
    next_id: AtomicU64,
    active: Mutex<AHashMap<ViewerId, Arc<MemorySurface>>>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface currently shown to `viewer`
    pub fn surface(&self, viewer: &ViewerId) -> Option<Arc<MemorySurface>> {
        self.active.lock().get(viewer).cloned()
    }

    /// Pretend the host replaced the viewer's surface behind our back
    pub fn swap_surface(&self, viewer: &ViewerId) -> SurfaceId {
        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let surface = Arc::new(MemorySurface::new(id, "foreign".into(), Capacity::of_rows(1)));
        self.active.lock().insert(viewer.clone(), surface);
        id
    }
}

impl Opener for MemoryOpener {
    fn open_surface(&self, viewer: &ViewerId, data: &ViewData) -> Result<Arc<dyn Surface>> {
        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let surface = Arc::new(MemorySurface::new(id, data.title.clone(), data.capacity));
        render_all(surface.as_ref(), data);
        self.active.lock().insert(viewer.clone(), surface.clone());
        Ok(surface)
    }

    fn active_surface(&self, viewer: &ViewerId) -> Option<SurfaceId> {
        self.active.lock().get(viewer).map(|s| s.id())
    }

    fn close_surface(&self, viewer: &ViewerId) {
        self.active.lock().remove(viewer);
    }
}
