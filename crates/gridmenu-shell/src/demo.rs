//! Menus the shell ships with, so it is usable without any documents.

use std::sync::Arc;

use compact_str::{format_compact, CompactString};
use gridmenu::{
    Animation, AnimationTiming, Capacity, Cell, ClickEvent, Content, DataRegistry, FillRange, FrameAnimator,
    GridError, Item, ItemComponent, Menu, MenuHub, MenuView, NamedAction, Page, PageComponent, Pagination,
    Slot, ViewerId,
};
use tracing::{info, warn};

const GALLERY_ROWS: usize = 4;
const COLORS: [&str; 8] = ["white", "orange", "magenta", "yellow", "lime", "pink", "cyan", "purple"];

/// Paginated wool swatches
struct GalleryPage;

impl Menu for GalleryPage {
    fn name(&self) -> &str {
        "gallery"
    }

    fn title(&self, data: &DataRegistry, _viewer: &ViewerId) -> CompactString {
        let index = data.get::<usize>("index").unwrap_or_default();
        let count = data.get::<usize>("page_count").unwrap_or(1);
        format_compact!("Gallery {}/{}", index + 1, count)
    }

    fn capacity(&self, _data: &DataRegistry, _viewer: &ViewerId) -> Capacity {
        Capacity::of_rows(GALLERY_ROWS)
    }

    fn content(&self, _data: &DataRegistry, _viewer: &ViewerId, capacity: Capacity) -> gridmenu::Result<Content> {
        let bottom = capacity.rows() - 1;
        let content = Content::builder(capacity)
            .fill_row(bottom, Cell::empty(Item::new("glass_pane").named(" ")))
            .set(
                Slot::at(bottom, 4),
                Cell::with_actions(Some(Item::new("barrier").named("Close")), ["CLOSE"]),
            )
            .build()?;
        Ok(content)
    }
}

impl Page for GalleryPage {
    fn fill_range(&self, capacity: Capacity, _viewer: &ViewerId) -> Result<FillRange, GridError> {
        FillRange::start(capacity).end(Slot::at(capacity.rows() - 1, 0))
    }

    fn next_page_item(&self, _viewer: &ViewerId) -> Item {
        Item::new("arrow").named("Next")
    }

    fn previous_page_item(&self, _viewer: &ViewerId) -> Item {
        Item::new("arrow").named("Back")
    }
}

fn swatch(index: usize) -> Arc<dyn PageComponent> {
    let color = COLORS[index % COLORS.len()];
    let item = Item::new(format!("{}_wool", color))
        .named(format!("{}{}", color, index))
        .with_lore([format!("Swatch #{}", index)]);
    Arc::new(ItemComponent::new(item).on_click(move |_view, event| {
        info!("{} picked swatch #{}", event.viewer, index);
    }))
}

/// Automatic pagination over the swatches
pub fn gallery(hub: &Arc<MenuHub>, swatches: usize) -> gridmenu::Result<Arc<Pagination>> {
    Pagination::automatic(hub)
        .creator(Arc::new(GalleryPage))
        .component_provider(move || (0..swatches).map(swatch).collect())
        .build()
}

/// `BROWSE`: open the gallery for the clicking viewer
pub struct BrowseAction {
    pub swatches: usize,
}

impl NamedAction for BrowseAction {
    fn tag(&self) -> &str {
        "BROWSE"
    }

    fn execute(&self, view: &MenuView, event: &mut ClickEvent, _payload: &str) {
        event.cancel();
        let Some(hub) = view.hub() else { return };
        let opened = gallery(&hub, self.swatches).and_then(|pagination| pagination.open(&event.viewer));
        if let Err(e) = opened {
            warn!("Could not open gallery for {}: {}", event.viewer, e);
        }
    }
}

/// One-row menu with a ticking clock and a gallery button
pub struct ClockMenu;

impl Menu for ClockMenu {
    fn name(&self) -> &str {
        "clock"
    }

    fn title(&self, _data: &DataRegistry, viewer: &ViewerId) -> CompactString {
        format_compact!("Clock for {}", viewer)
    }

    fn capacity(&self, _data: &DataRegistry, _viewer: &ViewerId) -> Capacity {
        Capacity::of_rows(1)
    }

    fn content(&self, _data: &DataRegistry, _viewer: &ViewerId, capacity: Capacity) -> gridmenu::Result<Content> {
        let hands = FrameAnimator::new(["12", "3", "6", "9"].map(|hour| Item::new("clock").named(hour)));
        let clock = Animation::new(hands).with_timing(AnimationTiming::every(4));
        let content = Content::builder(capacity)
            .set(Slot::new(4), Cell::animated(clock))
            .set(
                Slot::new(8),
                Cell::with_actions(Some(Item::new("painting").named("Gallery")), ["BROWSE"]),
            )
            .build()?;
        Ok(content)
    }
}

/// Register the built-in menus and actions on `hub`
pub fn install(hub: &Arc<MenuHub>, swatches: usize) -> gridmenu::Result<()> {
    hub.actions().register(BrowseAction { swatches });
    hub.register_menu(Arc::new(ClockMenu))
}
