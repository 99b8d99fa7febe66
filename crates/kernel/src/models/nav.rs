//! Static navigation structure consumed by the menu renderer.

use serde::{Deserialize, Serialize};

/// A single menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// Route path (e.g., "/dashboard/ecommerce")
    pub path: String,
    /// Human-readable title
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NavItem {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            icon: None,
        }
    }

    /// Set the icon name.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// A labelled group of menu entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSection {
    pub label: String,
    #[serde(default)]
    pub items: Vec<NavItem>,
}

impl NavSection {
    pub fn new(label: impl Into<String>, items: Vec<NavItem>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }
}

/// Ordered list of sections. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavTree {
    pub sections: Vec<NavSection>,
}

impl NavTree {
    pub fn new(sections: Vec<NavSection>) -> Self {
        Self { sections }
    }

    /// Iterate over every item in section order.
    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// Paths of every item in section order.
    pub fn paths(&self) -> Vec<&str> {
        self.items().map(|i| i.path.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
