//! Menus shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use compact_str::CompactString;
use gridmenu_core::{Capacity, ClickEvent, DataRegistry, Slot, SurfaceId, ViewerId};

use crate::cell::Cell;
use crate::content::Content;
use crate::error::{MenuError, Result};
use crate::menu::Menu;
use crate::opener::{MemoryOpener, Opener, Surface};
use crate::view::{MenuView, ViewData};

pub(crate) struct TestMenu {
    name: String,
    rows: usize,
    cells: Vec<(usize, Cell)>,
    veto: bool,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl TestMenu {
    pub fn new(name: &str, rows: usize) -> Self {
        Self {
            name: name.to_string(),
            rows,
            cells: Vec::new(),
            veto: false,
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
        }
    }

    pub fn with_cell(mut self, slot: usize, cell: Cell) -> Self {
        self.cells.push((slot, cell));
        self
    }

    pub fn vetoing(mut self) -> Self {
        self.veto = true;
        self
    }
}

impl Menu for TestMenu {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self, _data: &DataRegistry, _viewer: &ViewerId) -> CompactString {
        self.name.as_str().into()
    }

    fn capacity(&self, _data: &DataRegistry, _viewer: &ViewerId) -> Capacity {
        Capacity::of_rows(self.rows)
    }

    fn content(&self, _data: &DataRegistry, _viewer: &ViewerId, capacity: Capacity) -> Result<Content> {
        let content = Content::from_cells(
            capacity,
            self.cells.iter().map(|(slot, cell)| (Slot::new(*slot), cell.clone())),
        )?;
        Ok(content)
    }

    fn on_pre_click(&self, _view: &MenuView, _event: &mut ClickEvent) -> bool {
        !self.veto
    }

    fn on_open(&self, _view: &MenuView) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn on_close(&self, _view: &MenuView) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn grid_menu(name: &str, rows: usize) -> Arc<dyn Menu> {
    Arc::new(TestMenu::new(name, rows))
}

/// Host that can be told to refuse new surfaces
#[derive(Default)]
pub(crate) struct RefusingOpener {
    inner: MemoryOpener,
    refusing: AtomicBool,
}

impl RefusingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }
}

impl Opener for RefusingOpener {
    fn open_surface(&self, viewer: &ViewerId, data: &ViewData) -> Result<Arc<dyn Surface>> {
        if self.refusing.load(Ordering::SeqCst) {
            return Err(MenuError::Surface(format!("host refused a surface for {}", viewer)));
        }
        self.inner.open_surface(viewer, data)
    }

    fn active_surface(&self, viewer: &ViewerId) -> Option<SurfaceId> {
        self.inner.active_surface(viewer)
    }

    fn close_surface(&self, viewer: &ViewerId) {
        self.inner.close_surface(viewer)
    }
}
