use ahash::AHashMap;
use compact_str::CompactString;
use gridmenu_core::ClickEvent;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::view::MenuView;

/// Reference to a registered action: `TAG` or `TAG(payload)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRef {
    pub tag: CompactString,
    pub payload: CompactString,
}

impl ActionRef {
    /// Split on the first `(` and drop one trailing `)`.
    ///
    /// Returns `None` for blank input.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let (tag, payload) = match s.split_once('(') {
            Some((tag, rest)) => (tag, rest.strip_suffix(')').unwrap_or(rest)),
            None => (s, ""),
        };
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        Some(Self {
            tag: tag.into(),
            payload: payload.into(),
        })
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.payload.is_empty() {
            f.write_str(&self.tag)
        } else {
            write!(f, "{}({})", self.tag, self.payload)
        }
    }
}

/// Action addressable by tag from persisted menus
pub trait NamedAction: Send + Sync {
    fn tag(&self) -> &str;

    fn execute(&self, view: &MenuView, event: &mut ClickEvent, payload: &str);
}

/// Closes the clicking viewer's menu
pub struct CloseAction;

impl NamedAction for CloseAction {
    fn tag(&self) -> &str {
        "CLOSE"
    }

    fn execute(&self, view: &MenuView, event: &mut ClickEvent, _payload: &str) {
        event.cancel();
        if let Some(hub) = view.hub() {
            hub.close_view(&event.viewer);
        }
    }
}

/// Opens the registered menu named by the payload
pub struct OpenAction;

impl NamedAction for OpenAction {
    fn tag(&self) -> &str {
        "OPEN"
    }

    fn execute(&self, view: &MenuView, event: &mut ClickEvent, payload: &str) {
        event.cancel();
        let Some(hub) = view.hub() else { return };
        if let Err(e) = hub.open_named(&event.viewer, payload) {
            warn!("OPEN({}) failed for {}: {}", payload, event.viewer, e);
        }
    }
}

/// Tag -> action table consulted at click time
pub struct ActionRegistry {
    actions: RwLock<AHashMap<CompactString, Arc<dyn NamedAction>>>,
}

impl ActionRegistry {
    /// Registry without any actions
    pub fn empty() -> Self {
        Self {
            actions: RwLock::new(AHashMap::new()),
        }
    }

    /// Registry holding the built-in `CLOSE` and `OPEN` actions
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(CloseAction);
        registry.register(OpenAction);
        registry
    }

    /// Register an action, replacing any previous one with the same tag
    pub fn register(&self, action: impl NamedAction + 'static) {
        let action: Arc<dyn NamedAction> = Arc::new(action);
        let tag = CompactString::from(action.tag());
        debug!("Registered action {}", tag);
        self.actions.write().insert(tag, action);
    }

    pub fn unregister(&self, tag: &str) -> bool {
        self.actions.write().remove(tag).is_some()
    }

    pub fn get(&self, tag: &str) -> Option<Arc<dyn NamedAction>> {
        self.actions.read().get(tag).cloned()
    }

    pub fn tags(&self) -> Vec<CompactString> {
        let mut tags: Vec<_> = self.actions.read().keys().cloned().collect();
        tags.sort();
        tags
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
