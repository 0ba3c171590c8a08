//! Raw entity/relation records as handed over by the data source.
//!
//! The core schema is strict (identifiers, endpoints); everything else a
//! source attaches rides along in the flattened `extra` map and is passed
//! through untouched for tooltips and styling.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique within a snapshot; records with an empty id are dropped during
    /// reconciliation.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Group label driving color and the cluster force.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_category(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Display label, falling back to the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EdgeRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Category palette of the production graph, in ordinal assignment order.
pub const DEFAULT_PALETTE: [Rgb; 10] = [
    Rgb::new(0x41, 0x8B, 0xFC),
    Rgb::new(0x46, 0xBC, 0xC8),
    Rgb::new(0xD6, 0xAB, 0x1B),
    Rgb::new(0xEB, 0x5E, 0x68),
    Rgb::new(0xB6, 0xBE, 0x1C),
    Rgb::new(0xF6, 0x4D, 0x1A),
    Rgb::new(0xBA, 0x6D, 0xE4),
    Rgb::new(0xEA, 0x6B, 0xCB),
    Rgb::new(0xB9, 0xAA, 0xC8),
    Rgb::new(0xF0, 0x85, 0x19),
];

/// Fill for nodes without a category.
pub const UNGROUPED_COLOR: Rgb = Rgb::new(0x66, 0x66, 0x66);

#[cfg(test)]
mod tests {
    use super::{NodeRecord, Rgb};

    #[test]
    fn extra_fields_survive_a_serde_round_trip() {
        let json = r#"{"id":"sun","category":"star","MASS":"1.989e30"}"#;
        let rec: NodeRecord = serde_json::from_str(json).expect("parse");
        assert_eq!(rec.id, "sun");
        assert_eq!(rec.category.as_deref(), Some("star"));
        assert_eq!(
            rec.extra.get("MASS").and_then(|v| v.as_str()),
            Some("1.989e30")
        );
    }

    #[test]
    fn missing_id_parses_to_an_empty_identifier() {
        let rec: NodeRecord = serde_json::from_str(r#"{"category":"x"}"#).expect("parse");
        assert!(rec.id.is_empty());
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb::new(0x41, 0x8B, 0xFC).to_hex(), "#418BFC");
    }
}
