use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use compact_str::CompactString;
use gridmenu::{render_all, Opener, Surface, ViewData};
use gridmenu_core::{Capacity, Item, Slot, SurfaceId, ViewerId};
use parking_lot::Mutex;

const LABEL_WIDTH: usize = 10;

/// Text grid standing in for a host window
pub struct ConsoleSurface {
    id: SurfaceId,
    viewer: ViewerId,
    title: CompactString,
    capacity: Capacity,
    items: Mutex<BTreeMap<Slot, Item>>,
    live: bool,
}

impl ConsoleSurface {
    fn new(id: SurfaceId, viewer: ViewerId, data: &ViewData, live: bool) -> Self {
        Self {
            id,
            viewer,
            title: data.title.clone(),
            capacity: data.capacity,
            items: Mutex::new(BTreeMap::new()),
            live,
        }
    }

    pub fn render(&self) -> String {
        let items = self.items.lock();
        let mut out = String::new();
        let _ = writeln!(out, "== {} [{} for {}] ==", self.title, self.id, self.viewer);
        for row in 0..self.capacity.rows() {
            let cells: Vec<String> = (0..self.capacity.columns())
                .map(|column| match items.get(&Slot::at(row, column)) {
                    Some(item) => label(item),
                    None => format!("{:<width$}", "-", width = LABEL_WIDTH),
                })
                .collect();
            let _ = writeln!(out, "{:>3} | {}", row * self.capacity.columns(), cells.join(" ").trim_end());
        }
        out
    }
}

fn label(item: &Item) -> String {
    let mut text: String = item.label().chars().take(LABEL_WIDTH).collect();
    if item.amount > 1 {
        let amount = format!("x{}", item.amount);
        let keep = LABEL_WIDTH.saturating_sub(amount.len());
        text = text.chars().take(keep).collect::<String>() + &amount;
    }
    format!("{:<width$}", text, width = LABEL_WIDTH)
}

impl Surface for ConsoleSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn set_item(&self, slot: Slot, item: Option<&Item>) {
        let mut items = self.items.lock();
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
        if self.live {
            print!("{}", self.render());
        }
    }
}

/// Opener drawing surfaces on stdout
#[derive(Default)]
pub struct ConsoleOpener {
    next_id: AtomicU64,
    active: Mutex<HashMap<ViewerId, Arc<ConsoleSurface>>>,
    live: bool,
}

impl ConsoleOpener {
    /// `live` prints every refresh, animation frames included
    pub fn new(live: bool) -> Self {
        Self {
            live,
            ..Default::default()
        }
    }

    pub fn surface(&self, viewer: &ViewerId) -> Option<Arc<ConsoleSurface>> {
        self.active.lock().get(viewer).cloned()
    }
}

impl Opener for ConsoleOpener {
    fn open_surface(&self, viewer: &ViewerId, data: &ViewData) -> gridmenu::Result<Arc<dyn Surface>> {
        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let surface = Arc::new(ConsoleSurface::new(id, viewer.clone(), data, self.live));
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
