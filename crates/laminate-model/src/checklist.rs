//! Checklist, phase and item definitions
//!
//! This module defines the hierarchical structure a user authors: a titled
//! checklist made of ordered phases, each holding ordered items.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Title used when the transport does not supply one
pub const DEFAULT_TITLE: &str = "CHECKLIST";

/// Subtitle used when the transport does not supply one
pub const DEFAULT_SUBTITLE: &str = "(Print and laminate for use)";

/// A complete checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    /// Checklist title, rendered large and bold
    #[serde(default = "default_title")]
    pub title: String,
    /// Subtitle rendered in italics below the title
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    /// Phases in display order
    #[serde(default)]
    pub phases: Vec<Phase>,
}

/// A named group of items, rendered as one section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Phase {
    /// Section heading. Required; `None` only survives decoding so the
    /// generator can report the omission.
    #[serde(default)]
    pub name: Option<String>,
    /// Items in display order
    #[serde(default, alias = "checklist_items")]
    pub items: Vec<Item>,
}

/// One checklist line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Primary instruction. Required, see [`Phase::name`].
    #[serde(default)]
    pub read: Option<String>,
    /// Right-aligned annotation, usually the expected response
    #[serde(default, rename = "do", skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_subtitle() -> String {
    DEFAULT_SUBTITLE.to_string()
}

impl Checklist {
    /// Create an empty checklist with the given title and subtitle
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            phases: Vec::new(),
        }
    }

    /// Decode a checklist from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a bare phase list, as stored next to a checklist's title
    pub fn phases_from_json(json: &str) -> Result<Vec<Phase>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the phase list for storage
    pub fn phases_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.phases)?)
    }

    /// Append a phase
    pub fn push(&mut self, phase: Phase) {
        self.phases.push(phase);
    }

    /// Builder-style variant of [`Checklist::push`]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Check if the checklist has no phases
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Total number of items across all phases
    pub fn item_count(&self) -> usize {
        self.phases.iter().map(|p| p.items.len()).sum()
    }
}

impl Default for Checklist {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_SUBTITLE)
    }
}

impl Phase {
    /// Create an empty phase
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            items: Vec::new(),
        }
    }

    /// Append an item
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }
}

impl Item {
    /// Create an item without an annotation
    pub fn new(read: impl Into<String>) -> Self {
        Self {
            read: Some(read.into()),
            action: None,
        }
    }

    /// Create an item with a right-aligned annotation
    pub fn with_action(read: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            read: Some(read.into()),
            action: Some(action.into()),
        }
    }

    /// The annotation, if present and non-empty
    pub fn annotation(&self) -> Option<&str> {
        self.action.as_deref().filter(|a| !a.is_empty())
    }
}
