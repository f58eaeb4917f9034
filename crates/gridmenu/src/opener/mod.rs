mod memory;

pub use memory::{MemoryOpener, MemorySurface};

use std::sync::Arc;

use gridmenu_core::{Item, Slot, SurfaceId, ViewerId};

use crate::error::Result;
use crate::view::ViewData;

/// Live rendering surface owned by the host
pub trait Surface: Send + Sync {
    fn id(&self) -> SurfaceId;

    /// Show `item` at `slot`, `None` clears it
    fn set_item(&self, slot: Slot, item: Option<&Item>);

    /// Push pending changes to the viewer
    fn refresh(&self);
}

/// Strategy that turns view data into a live host surface
pub trait Opener: Send + Sync {
    /// Create and show a surface sized to the data's capacity and
    /// initialised from its content
    fn open_surface(&self, viewer: &ViewerId, data: &ViewData) -> Result<Arc<dyn Surface>>;

    /// Surface the host currently shows to `viewer`
    fn active_surface(&self, viewer: &ViewerId) -> Option<SurfaceId>;

    /// Close whatever the host shows to `viewer`
    fn close_surface(&self, viewer: &ViewerId);
}

/// Render every entry of `data` onto a fresh surface
pub fn render_all(surface: &dyn Surface, data: &ViewData) {
    data.content
        .for_each(|slot, cell| surface.set_item(slot, cell.item()));
    surface.refresh();
}
