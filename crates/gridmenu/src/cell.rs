use std::fmt;
use std::sync::Arc;

use gridmenu_core::{ClickEvent, DataRegistry, Item};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::actions::ActionRef;
use crate::view::MenuView;

/// Inline click behaviour
pub type ClickHandler = Arc<dyn Fn(&MenuView, &mut ClickEvent) + Send + Sync>;

/// What happens when a cell is clicked
#[derive(Clone)]
pub enum ClickAction {
    /// Closure run directly
    Handler(ClickHandler),
    /// Tagged actions resolved against the hub's action registry at click time
    Named(SmallVec<[ActionRef; 1]>),
}

impl ClickAction {
    pub fn handler(f: impl Fn(&MenuView, &mut ClickEvent) + Send + Sync + 'static) -> Self {
        ClickAction::Handler(Arc::new(f))
    }

    /// Parse persisted action strings, skipping blank ones
    pub fn named<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ClickAction::Named(
            actions
                .into_iter()
                .filter_map(|a| ActionRef::parse(a.as_ref()))
                .collect(),
        )
    }

    pub fn execute(&self, view: &MenuView, event: &mut ClickEvent) {
        match self {
            ClickAction::Handler(f) => f(view, event),
            ClickAction::Named(refs) => {
                let Some(hub) = view.hub() else {
                    debug!("Named action clicked on a view without a hub");
                    return;
                };
                for action in refs {
                    match hub.actions().get(&action.tag) {
                        Some(named) => named.execute(view, event, &action.payload),
                        None => debug!("No action registered for tag {}", action.tag),
                    }
                }
            }
        }
    }

    /// Action strings for persistence, empty for inline handlers
    pub fn tags(&self) -> Vec<String> {
        match self {
            ClickAction::Handler(_) => Vec::new(),
            ClickAction::Named(refs) => refs.iter().map(ToString::to_string).collect(),
        }
    }
}

impl fmt::Debug for ClickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickAction::Handler(_) => f.write_str("Handler(..)"),
            ClickAction::Named(refs) => f.debug_tuple("Named").field(refs).finish(),
        }
    }
}

/// Refresh cadence of an animated cell, counted in scheduler ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTiming {
    /// Ticks to wait before the first frame change
    pub delay: u64,
    /// Ticks between frame changes
    pub period: u64,
    /// Run on the blocking pool instead of the scheduler task
    pub offload: bool,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            delay: 0,
            period: 1,
            offload: false,
        }
    }
}

impl AnimationTiming {
    pub fn every(period: u64) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    pub fn delayed(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    pub fn offloaded(mut self) -> Self {
        self.offload = true;
        self
    }

    /// Whether the `tick`-th tick since registration should advance the animation
    pub fn is_due(&self, tick: u64) -> bool {
        tick >= self.delay && (tick - self.delay) % self.period.max(1) == 0
    }
}

/// Produces the frames of an animated cell
pub trait Animator: Send + Sync {
    fn frame_count(&self) -> usize;

    /// Item shown for `frame`, `None` to show nothing
    fn frame(&self, frame: usize) -> Option<Item>;
}

/// Cycles through a fixed list of items
pub struct FrameAnimator {
    frames: Vec<Item>,
    transform: Option<Arc<dyn Fn(Item) -> Item + Send + Sync>>,
}

impl FrameAnimator {
    pub fn new(frames: impl IntoIterator<Item = Item>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            transform: None,
        }
    }

    /// Rewrite every frame before it is shown
    pub fn with_transform(mut self, f: impl Fn(Item) -> Item + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }
}

impl Animator for FrameAnimator {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, frame: usize) -> Option<Item> {
        let item = self.frames.get(frame)?.clone();
        Some(match &self.transform {
            Some(f) => f(item),
            None => item,
        })
    }
}

/// Animation state carried by an animated cell
#[derive(Clone)]
pub struct Animation {
    timing: AnimationTiming,
    frame: usize,
    animator: Arc<dyn Animator>,
}

impl Animation {
    pub fn new(animator: impl Animator + 'static) -> Self {
        Self::shared(Arc::new(animator))
    }

    pub fn shared(animator: Arc<dyn Animator>) -> Self {
        Self {
            timing: AnimationTiming::default(),
            frame: 0,
            animator,
        }
    }

    pub fn with_timing(mut self, timing: AnimationTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing(&self) -> AnimationTiming {
        self.timing
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn current_item(&self) -> Option<Item> {
        self.animator.frame(self.frame)
    }

    /// Step to the next frame, wrapping after the last one
    pub fn advance(&mut self) -> Option<Item> {
        let count = self.animator.frame_count();
        self.frame = if count == 0 { 0 } else { (self.frame + 1) % count };
        self.current_item()
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("timing", &self.timing)
            .field("frame", &self.frame)
            .field("frames", &self.animator.frame_count())
            .finish()
    }
}

/// Plain or animated
#[derive(Debug, Clone)]
pub enum CellKind {
    Plain,
    Animated(Animation),
}

/// One grid entry: visual, click behaviour and side data.
///
/// `item == None` means the cell renders nothing while still occupying its
/// slot. Cloning a cell clones its animation state, so a copy rendered onto a
/// surface never shares a frame counter with its source.
#[derive(Debug, Clone)]
pub struct Cell {
    item: Option<Item>,
    action: Option<ClickAction>,
    data: DataRegistry,
    kind: CellKind,
}

impl Cell {
    /// Cell showing `item` without any click behaviour
    pub fn empty(item: Item) -> Self {
        Self::from_parts(Some(item), None)
    }

    /// Occupied cell that renders nothing
    pub fn blank() -> Self {
        Self::from_parts(None, None)
    }

    pub fn from_parts(item: Option<Item>, action: Option<ClickAction>) -> Self {
        Self {
            item,
            action,
            data: DataRegistry::new(),
            kind: CellKind::Plain,
        }
    }

    pub fn clickable(
        item: Item,
        f: impl Fn(&MenuView, &mut ClickEvent) + Send + Sync + 'static,
    ) -> Self {
        Self::from_parts(Some(item), Some(ClickAction::handler(f)))
    }

    /// Cell whose clicks run registered actions such as `CLOSE` or `OPEN(shop)`
    pub fn with_actions<I, S>(item: Option<Item>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_parts(item, Some(ClickAction::named(actions)))
    }

    /// Clicking replaces this cell with whatever `f` builds from it
    pub fn transformer(
        item: Item,
        f: impl Fn(&Cell, &ClickEvent) -> Cell + Send + Sync + 'static,
    ) -> Self {
        Self::clickable(item, move |view, event| {
            let Some(slot) = event.slot else { return };
            let event: &ClickEvent = event;
            if let Err(e) = view.update_cell(slot, |cell| *cell = f(cell, event)) {
                warn!("Failed to transform cell {}: {}", slot, e);
            }
        })
    }

    /// Clicking replaces only this cell's item with whatever `f` builds from it
    pub fn item_transformer(item: Item, f: impl Fn(&Item) -> Item + Send + Sync + 'static) -> Self {
        Self::clickable(item, move |view, event| {
            let Some(slot) = event.slot else { return };
            if let Err(e) = view.update_item(slot, |item| *item = f(item)) {
                warn!("Failed to transform item at {}: {}", slot, e);
            }
        })
    }

    /// Animated cell starting on the animation's first frame
    pub fn animated(animation: Animation) -> Self {
        Self {
            item: animation.current_item(),
            action: None,
            data: DataRegistry::new(),
            kind: CellKind::Animated(animation),
        }
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn item_mut(&mut self) -> Option<&mut Item> {
        self.item.as_mut()
    }

    pub fn set_item(&mut self, item: Option<Item>) {
        self.item = item;
    }

    pub fn with_item(mut self, item: Option<Item>) -> Self {
        self.item = item;
        self
    }

    pub fn action(&self) -> Option<&ClickAction> {
        self.action.as_ref()
    }

    pub fn set_action(&mut self, action: Option<ClickAction>) {
        self.action = action;
    }

    pub fn on_click(mut self, f: impl Fn(&MenuView, &mut ClickEvent) + Send + Sync + 'static) -> Self {
        self.action = Some(ClickAction::handler(f));
        self
    }

    pub fn data(&self) -> &DataRegistry {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataRegistry {
        &mut self.data
    }

    pub fn with_data<T: std::any::Any + Send + Sync>(mut self, key: &str, value: T) -> Self {
        self.data.set(key, value);
        self
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    pub fn animation(&self) -> Option<&Animation> {
        match &self.kind {
            CellKind::Animated(animation) => Some(animation),
            CellKind::Plain => None,
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.kind, CellKind::Animated(_))
    }

    /// Advance an animated cell one frame, returning whether it changed
    pub fn advance_animation(&mut self) -> bool {
        match &mut self.kind {
            CellKind::Animated(animation) => {
                self.item = animation.advance();
                true
            }
            CellKind::Plain => false,
        }
    }

    /// Whether this cell shows an item similar to `item`
    pub fn shows(&self, item: &Item) -> bool {
        self.item.as_ref().is_some_and(|own| own.is_similar(item))
    }
}
