pub mod actions;
pub mod animation;
pub mod cell;
pub mod content;
pub mod error;
pub mod hub;
pub mod menu;
pub mod opener;
pub mod pagination;
pub mod persist;
pub mod view;

#[cfg(test)]
mod testing;

pub use actions::{ActionRef, ActionRegistry, CloseAction, NamedAction, OpenAction};
pub use animation::{AnimationHandle, AnimationScheduler};
pub use cell::{Animation, AnimationTiming, Animator, Cell, CellKind, ClickAction, ClickHandler, FrameAnimator};
pub use content::{Content, ContentBuilder, Pane, TextLayout, TextLayoutPane};
pub use error::{MenuError, Result};
pub use hub::MenuHub;
pub use menu::Menu;
pub use opener::{render_all, MemoryOpener, MemorySurface, Opener, Surface};
pub use pagination::{
    AutomaticBuilder, ComponentProvider, FillRange, ItemComponent, Page, PageComponent, Pagination,
    PlainBuilder,
};
pub use persist::{ButtonDocument, MenuDocument, MenuProperties, SerializableMenu, VIEWER_PLACEHOLDER};
pub use view::{MenuView, ViewData};

pub use gridmenu_core::{
    Capacity, ClickEvent, ClickKind, DataRegistry, Direction, DragEvent, GridError, HostEvent, Item,
    MenuSettings, Slot, SlotIterator, Slots, SurfaceId, SurfaceKind, ViewerId,
};
