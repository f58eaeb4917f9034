//! Menus stored as JSON documents.
//!
//! ```json
//! {
//!   "name": "warps",
//!   "properties": { "capacity": 3, "title": "Warps for <viewer>" },
//!   "buttons": {
//!     "slot_13": { "slot": 13, "item": { "material": "compass" }, "actions": ["OPEN(spawn)"] }
//!   }
//! }
//! ```
//!
//! `properties.capacity` counts rows. Button actions are resolved against the
//! hub's action registry when clicked, so they may name actions registered
//! after the document was loaded.

use std::collections::BTreeMap;
use std::path::Path;

use compact_str::CompactString;
use gridmenu_core::{Capacity, DataRegistry, GridError, Item, Slot, ViewerId, GRID_WIDTH};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::Cell;
use crate::content::Content;
use crate::error::{MenuError, Result};
use crate::menu::Menu;
use crate::view::MenuView;

/// Replaced by the viewer's id in titles and item text
pub const VIEWER_PLACEHOLDER: &str = "<viewer>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDocument {
    pub name: CompactString,
    pub properties: MenuProperties,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub buttons: BTreeMap<String, ButtonDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuProperties {
    /// Row count
    pub capacity: usize,
    #[serde(default)]
    pub title: CompactString,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonDocument {
    pub slot: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

impl MenuDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        debug!("Saved menu '{}' to {}", self.name, path.display());
        Ok(())
    }
}

fn button_key(slot: Slot) -> String {
    format!("slot_{}", slot.index())
}

#[derive(Debug, Clone)]
struct Button {
    item: Option<Item>,
    actions: Vec<String>,
}

/// Menu backed by a [`MenuDocument`]
#[derive(Debug, Clone)]
pub struct SerializableMenu {
    name: CompactString,
    title: CompactString,
    capacity: Capacity,
    buttons: BTreeMap<Slot, Button>,
}

impl SerializableMenu {
    pub fn new(name: impl Into<CompactString>, title: impl Into<CompactString>, rows: usize) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            capacity: Capacity::of_rows(rows),
            buttons: BTreeMap::new(),
        }
    }

    /// Put a button at `slot`; out-of-range slots are rejected
    pub fn set_button<I, S>(&mut self, slot: Slot, item: Option<Item>, actions: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.capacity.contains_index(slot.index()) {
            return Err(GridError::SlotOutOfBounds {
                slot: slot.index(),
                size: self.capacity.total_size(),
            }
            .into());
        }
        self.buttons.insert(
            slot,
            Button {
                item,
                actions: actions.into_iter().map(Into::into).collect(),
            },
        );
        Ok(())
    }

    /// Validate a loaded document; every button must fit the declared rows
    pub fn from_document(document: MenuDocument) -> Result<Self> {
        if document.name.trim().is_empty() {
            return Err(MenuError::Precondition("menu name must not be empty"));
        }
        if document.properties.capacity == 0 {
            return Err(MenuError::Precondition("menu capacity must be at least one row"));
        }
        let capacity = Capacity::with_grid(document.properties.capacity, GRID_WIDTH)?;
        let mut menu = Self {
            name: document.name,
            title: document.properties.title,
            capacity,
            buttons: BTreeMap::new(),
        };
        for button in document.buttons.into_values() {
            menu.set_button(Slot::new(button.slot), button.item, button.actions)?;
        }
        Ok(menu)
    }

    pub fn to_document(&self) -> MenuDocument {
        let buttons = self
            .buttons
            .iter()
            .map(|(slot, button)| {
                let document = ButtonDocument {
                    slot: slot.index(),
                    item: button.item.clone(),
                    actions: button.actions.clone(),
                };
                (button_key(*slot), document)
            })
            .collect();
        MenuDocument {
            name: self.name.clone(),
            properties: MenuProperties {
                capacity: self.capacity.rows(),
                title: self.title.clone(),
            },
            buttons,
        }
    }

    /// Snapshot of what `menu` shows `viewer`.
    ///
    /// Inline click handlers cannot be stored; their cells keep only the item.
    pub fn from_menu(menu: &dyn Menu, viewer: &ViewerId) -> Result<Self> {
        let data = DataRegistry::new();
        let capacity = menu.capacity(&data, viewer);
        let title = menu.title(&data, viewer);
        let content = menu.content(&data, viewer, capacity)?;
        Ok(Self::from_content(menu.name(), title, &content))
    }

    /// Snapshot of the view's current title and content
    pub fn from_view(view: &MenuView) -> Result<Self> {
        let data = view.view_data().ok_or(MenuError::NotOpen)?;
        Ok(Self::from_content(view.menu().name(), data.title, &data.content))
    }

    fn from_content(name: &str, title: CompactString, content: &Content) -> Self {
        let buttons = content
            .entries()
            .into_iter()
            .map(|(slot, cell)| {
                let button = Button {
                    item: cell.item().cloned(),
                    actions: cell.action().map(|a| a.tags()).unwrap_or_default(),
                };
                (slot, button)
            })
            .collect();
        Self {
            name: name.into(),
            title,
            capacity: content.capacity(),
            buttons,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_document().save(path)
    }
}

fn substitute(text: &str, viewer: &ViewerId) -> CompactString {
    text.replace(VIEWER_PLACEHOLDER, viewer.as_str()).into()
}

impl Menu for SerializableMenu {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self, _data: &DataRegistry, viewer: &ViewerId) -> CompactString {
        substitute(&self.title, viewer)
    }

    fn capacity(&self, _data: &DataRegistry, _viewer: &ViewerId) -> Capacity {
        self.capacity
    }

    fn content(&self, _data: &DataRegistry, viewer: &ViewerId, capacity: Capacity) -> Result<Content> {
        let cells = self.buttons.iter().map(|(slot, button)| {
            let item = button
                .item
                .clone()
                .map(|item| item.map_text(|text| substitute(text, viewer)));
            let cell = if button.actions.is_empty() {
                Cell::from_parts(item, None)
            } else {
                Cell::with_actions(item, &button.actions)
            };
            (*slot, cell)
        });
        Ok(Content::from_cells(capacity, cells)?)
    }
}
