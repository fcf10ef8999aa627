//! Declarative zone layouts for structured boards.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Inline content held by a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ZoneContent {
    Text { text: String },
    Image { src: String },
}

/// A named sub-region of a node, addressed by `id`.
///
/// `frame` is expressed in unit coordinates of the owning node, so zones
/// follow the node through moves and resizes without being rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub frame: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ZoneContent>,
}

impl Zone {
    pub fn new(id: impl Into<String>, frame: Rect) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            frame,
            content: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = Some(ZoneContent::Text { text: text.into() });
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(ZoneContent::Text { text }) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub zones: Vec<Zone>,
}

impl Structure {
    /// Top-most zone containing a unit-space point. Later zones sit above earlier ones.
    pub fn zone_at(&self, unit: Point) -> Option<&Zone> {
        self.zones.iter().rev().find(|z| {
            unit.x >= z.frame.x0 && unit.x <= z.frame.x1 && unit.y >= z.frame.y0 && unit.y <= z.frame.y1
        })
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zone_mut(&mut self, id: &str) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }
}
