use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Visual representation of a cell as the host renders it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub material: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<CompactString>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub lore: SmallVec<[CompactString; 2]>,
    #[serde(default = "default_amount")]
    pub amount: u32,
}

fn default_amount() -> u32 {
    1
}

impl Item {
    pub fn new(material: impl Into<CompactString>) -> Self {
        Self {
            material: material.into(),
            name: None,
            lore: SmallVec::new(),
            amount: 1,
        }
    }

    pub fn named(mut self, name: impl Into<CompactString>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_lore<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.lore = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Same item ignoring the stack amount
    pub fn is_similar(&self, other: &Item) -> bool {
        self.material == other.material && self.name == other.name && self.lore == other.lore
    }

    /// Display name, or the material when unnamed
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.material)
    }

    /// Rewrite every text field (display name and lore) through `f`
    pub fn map_text(mut self, f: impl Fn(&str) -> CompactString) -> Self {
        self.name = self.name.map(|name| f(&name));
        for line in self.lore.iter_mut() {
            *line = f(line);
        }
        self
    }
}
