use std::path::Path;
use std::sync::{Arc, Weak};

use ahash::AHashMap;
use compact_str::CompactString;
use gridmenu_core::{HostEvent, MenuSettings, SurfaceId, SurfaceKind, ViewerId};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::actions::ActionRegistry;
use crate::error::{MenuError, Result};
use crate::menu::Menu;
use crate::opener::Opener;
use crate::pagination::Pagination;
use crate::persist::{MenuDocument, SerializableMenu};
use crate::view::MenuView;

/// Process-wide registry of menus, openers and open views.
///
/// The hub owns every open view, keyed by viewer; views only keep a weak
/// reference back. Host events are routed through a surface -> view side
/// table, so a surface never has to know which view drew it.
pub struct MenuHub {
    this: Weak<MenuHub>,
    settings: RwLock<MenuSettings>,
    actions: ActionRegistry,
    openers: RwLock<AHashMap<SurfaceKind, Arc<dyn Opener>>>,
    menus: RwLock<AHashMap<CompactString, Arc<dyn Menu>>>,
    open_views: RwLock<AHashMap<ViewerId, Arc<MenuView>>>,
    surfaces: RwLock<AHashMap<SurfaceId, Weak<MenuView>>>,
    paginations: Mutex<AHashMap<ViewerId, Arc<Pagination>>>,
}

impl MenuHub {
    /// Hub with default settings, the built-in actions and one opener for grids
    pub fn new(opener: Arc<dyn Opener>) -> Arc<Self> {
        Self::with_settings(MenuSettings::default(), ActionRegistry::new(), opener)
    }

    pub fn with_settings(
        settings: MenuSettings,
        actions: ActionRegistry,
        opener: Arc<dyn Opener>,
    ) -> Arc<Self> {
        let mut openers: AHashMap<SurfaceKind, Arc<dyn Opener>> = AHashMap::new();
        openers.insert(SurfaceKind::Grid, opener);
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            settings: RwLock::new(settings),
            actions,
            openers: RwLock::new(openers),
            menus: RwLock::new(AHashMap::new()),
            open_views: RwLock::new(AHashMap::new()),
            surfaces: RwLock::new(AHashMap::new()),
            paginations: Mutex::new(AHashMap::new()),
        })
    }

    pub(crate) fn weak(&self) -> Weak<MenuHub> {
        self.this.clone()
    }

    pub fn settings(&self) -> MenuSettings {
        self.settings.read().clone()
    }

    pub fn set_settings(&self, settings: MenuSettings) {
        *self.settings.write() = settings;
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    // =========== Openers ===========

    pub fn register_opener(&self, kind: SurfaceKind, opener: Arc<dyn Opener>) {
        self.openers.write().insert(kind, opener);
    }

    fn opener(&self, kind: SurfaceKind) -> Result<Arc<dyn Opener>> {
        self.openers
            .read()
            .get(&kind)
            .cloned()
            .ok_or_else(|| MenuError::Surface(format!("no opener for {:?} surfaces", kind)))
    }

    // =========== Named menus ===========

    pub fn register_menu(&self, menu: Arc<dyn Menu>) -> Result<()> {
        let name = menu.name().trim().to_lowercase();
        if name.is_empty() {
            return Err(MenuError::Precondition("menu name must not be empty"));
        }
        info!("Registered menu '{}'", name);
        self.menus.write().insert(name.into(), menu);
        Ok(())
    }

    pub fn unregister_menu(&self, name: &str) -> Option<Arc<dyn Menu>> {
        self.menus.write().remove(name.to_lowercase().as_str())
    }

    pub fn registered_menu(&self, name: &str) -> Option<Arc<dyn Menu>> {
        self.menus.read().get(name.to_lowercase().as_str()).cloned()
    }

    pub fn menu_names(&self) -> Vec<CompactString> {
        let mut names: Vec<_> = self.menus.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Load a persisted menu document and register it
    pub fn load_menu_file(&self, path: &Path) -> Result<CompactString> {
        let menu = SerializableMenu::from_document(MenuDocument::load(path)?)?;
        let name = CompactString::from(menu.name());
        self.register_menu(Arc::new(menu))?;
        Ok(name)
    }

    /// Register every `*.json` menu document in `dir`, returning the names
    /// that loaded. Broken documents are skipped with a warning.
    pub fn load_menus_from(&self, dir: &Path) -> Result<Vec<CompactString>> {
        let mut loaded = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.load_menu_file(&path) {
                Ok(name) => loaded.push(name),
                Err(e) => warn!("Skipping menu {}: {}", path.display(), e),
            }
        }
        Ok(loaded)
    }

    // =========== Views ===========

    /// Unbound view of `menu` owned by this hub
    pub fn create_view(&self, menu: Arc<dyn Menu>) -> Arc<MenuView> {
        MenuView::new(self.weak(), menu)
    }

    /// Open `menu` for `viewer` in a fresh view
    pub fn open_menu(&self, viewer: &ViewerId, menu: Arc<dyn Menu>) -> Result<Arc<MenuView>> {
        let view = self.create_view(menu);
        self.open_view(viewer, view.clone())?;
        Ok(view)
    }

    /// Open the menu registered as `name`
    pub fn open_named(&self, viewer: &ViewerId, name: &str) -> Result<Arc<MenuView>> {
        let menu = self
            .registered_menu(name)
            .ok_or_else(|| MenuError::UnknownMenu(name.into()))?;
        self.open_menu(viewer, menu)
    }

    /// Show `view` to `viewer`, closing whatever the viewer had open before.
    ///
    /// The previous view is only closed once the new surface is up; if
    /// opening fails the viewer keeps what they had.
    pub fn open_view(&self, viewer: &ViewerId, view: Arc<MenuView>) -> Result<()> {
        if viewer.is_empty() {
            return Err(MenuError::Precondition("viewer id must not be empty"));
        }
        let opener = self.opener(view.menu().surface_kind())?;

        let stale_surface = view.surface_id();
        let surface = view.open(opener, viewer)?;
        let previous = self.open_views.write().insert(viewer.clone(), view.clone());
        {
            let mut surfaces = self.surfaces.write();
            if let Some(stale) = stale_surface {
                surfaces.remove(&stale);
            }
            if let Some(old) = previous.as_ref().and_then(|previous| previous.surface_id()) {
                surfaces.remove(&old);
            }
            surfaces.insert(surface, Arc::downgrade(&view));
        }
        if let Some(previous) = previous.filter(|previous| !Arc::ptr_eq(previous, &view)) {
            previous.close();
        }
        self.release_pagination_unless(viewer, view.pagination().as_ref());
        info!("Opened menu '{}' for {}", view.menu().name(), viewer);

        view.handle_open();
        Ok(())
    }

    fn take_open_view(&self, viewer: &ViewerId) -> Option<Arc<MenuView>> {
        let view = self.open_views.write().remove(viewer)?;
        if let Some(surface) = view.surface_id() {
            self.surfaces.write().remove(&surface);
        }
        Some(view)
    }

    /// Close the viewer's open view and its surface
    pub fn close_view(&self, viewer: &ViewerId) -> bool {
        let Some(view) = self.take_open_view(viewer) else {
            return false;
        };
        if let Ok(opener) = self.opener(view.menu().surface_kind()) {
            opener.close_surface(viewer);
        }
        view.close();
        self.paginations.lock().remove(viewer);
        true
    }

    /// Close every open view
    pub fn close_all(&self) {
        let viewers: Vec<ViewerId> = self.open_views.read().keys().cloned().collect();
        for viewer in viewers {
            self.close_view(&viewer);
        }
    }

    pub fn open_view_of(&self, viewer: &ViewerId) -> Option<Arc<MenuView>> {
        self.open_views.read().get(viewer).cloned()
    }

    /// Snapshot of every open view
    pub fn open_views(&self) -> Vec<Arc<MenuView>> {
        self.open_views.read().values().cloned().collect()
    }

    pub fn view_for_surface(&self, surface: SurfaceId) -> Option<Arc<MenuView>> {
        self.surfaces.read().get(&surface)?.upgrade()
    }

    // =========== Paginations ===========

    /// Keep `pagination` alive while the viewer browses its pages
    pub(crate) fn retain_pagination(&self, viewer: &ViewerId, pagination: Arc<Pagination>) {
        self.paginations.lock().insert(viewer.clone(), pagination);
    }

    fn release_pagination_unless(&self, viewer: &ViewerId, keep: Option<&Arc<Pagination>>) {
        let mut paginations = self.paginations.lock();
        let same = match (paginations.get(viewer), keep) {
            (Some(current), Some(keep)) => Arc::ptr_eq(current, keep),
            _ => false,
        };
        if !same && paginations.remove(viewer).is_some() {
            debug!("Released pagination of {}", viewer);
        }
    }

    pub fn pagination_of(&self, viewer: &ViewerId) -> Option<Arc<Pagination>> {
        self.paginations.lock().get(viewer).cloned()
    }

    // =========== Host events ===========

    /// Route a host event to the view owning its surface
    pub fn dispatch(&self, event: &mut HostEvent) {
        match event {
            HostEvent::Click(click) => match self.view_for_surface(click.surface) {
                Some(view) => view.handle_click(click),
                None => {
                    if !self.settings.read().allow_outside_click() {
                        click.cancel();
                    }
                }
            },
            HostEvent::Drag(drag) => {
                if let Some(view) = self.view_for_surface(drag.surface) {
                    view.handle_drag(drag);
                }
            }
            HostEvent::Open { viewer, surface } => {
                debug!("Host opened {} for {}", surface, viewer);
            }
            HostEvent::Close { viewer, surface } => self.host_closed(viewer, *surface),
        }
    }

    /// The host already closed the surface; only our side is torn down
    fn host_closed(&self, viewer: &ViewerId, surface: SurfaceId) {
        let Some(view) = self.view_for_surface(surface) else {
            return;
        };
        let current = self.open_view_of(viewer);
        if !current.is_some_and(|current| Arc::ptr_eq(&current, &view)) {
            return;
        }
        if let Some(view) = self.take_open_view(viewer) {
            view.close();
            self.paginations.lock().remove(viewer);
        }
    }
}
