use compact_str::CompactString;
use gridmenu_core::{Capacity, ClickEvent, DataRegistry, DragEvent, SurfaceKind, ViewerId};

use crate::content::Content;
use crate::error::Result;
use crate::view::MenuView;

/// Definition of a menu: what to show and how to react.
///
/// A view asks its menu for title, capacity and content every time it is
/// initialized, passing the view's own side data and the viewer. The hooks
/// run on whichever thread delivered the host event.
pub trait Menu: Send + Sync {
    /// Registry name (matched case-insensitively)
    fn name(&self) -> &str;

    /// Kind of surface to ask the host for
    fn surface_kind(&self) -> SurfaceKind {
        SurfaceKind::Grid
    }

    fn title(&self, data: &DataRegistry, viewer: &ViewerId) -> CompactString;

    fn capacity(&self, data: &DataRegistry, viewer: &ViewerId) -> Capacity;

    fn content(&self, data: &DataRegistry, viewer: &ViewerId, capacity: Capacity) -> Result<Content>;

    /// Return `false` to veto the click before any cell action runs
    fn on_pre_click(&self, _view: &MenuView, _event: &mut ClickEvent) -> bool {
        true
    }

    fn on_post_click(&self, _view: &MenuView, _event: &mut ClickEvent) {}

    fn on_open(&self, _view: &MenuView) {}

    fn on_close(&self, _view: &MenuView) {}

    /// Drags are cancelled unless a menu decides otherwise
    fn on_drag(&self, _view: &MenuView, event: &mut DragEvent) {
        event.cancel();
    }
}
