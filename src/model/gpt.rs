//! Custom GPT configuration records.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One custom GPT configuration as captured from the discovery API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GptRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Tool type names (`browser`, `python`, `dalle`, ...)
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub prompt_starters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_interactions: Option<u64>,
}

impl GptRecord {
    /// Parse a captured discovery response (`{"list": {"items": [...]}}`).
    ///
    /// Items without a `resource.gizmo.id` are skipped.
    pub fn from_discovery_json(json: &str) -> Result<Vec<Self>> {
        let root: Value = serde_json::from_str(json)?;
        let items = root
            .pointer("/list/items")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Other("missing list.items in GPT discovery data".into()))?;

        let records: Vec<Self> = items.iter().filter_map(Self::from_item).collect();
        log::debug!("parsed {} of {} GPT items", records.len(), items.len());
        Ok(records)
    }

    fn from_item(item: &Value) -> Option<Self> {
        let resource = item.get("resource")?;
        let gizmo = resource.get("gizmo")?;
        let id = scalar_string(gizmo.get("id")?)?;
        let display = gizmo.get("display");
        let display_str = |key: &str| {
            display
                .and_then(|d| d.get(key))
                .and_then(scalar_string)
                .unwrap_or_default()
        };

        let tools = resource
            .get("tools")
            .and_then(Value::as_array)
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|t| t.get("type").and_then(scalar_string))
                    .collect()
            })
            .unwrap_or_default();

        let prompt_starters = display
            .and_then(|d| d.get("prompt_starters"))
            .and_then(Value::as_array)
            .map(|starters| starters.iter().filter_map(scalar_string).collect())
            .unwrap_or_default();

        Some(Self {
            id,
            name: display_str("name"),
            description: display_str("description"),
            instructions: gizmo
                .get("instructions")
                .and_then(scalar_string)
                .unwrap_or_default(),
            created_at: gizmo.get("created_at").and_then(scalar_string),
            updated_at: gizmo.get("updated_at").and_then(scalar_string),
            version: gizmo.get("version").and_then(scalar_string),
            tools,
            prompt_starters,
            share_recipient: gizmo.get("share_recipient").and_then(scalar_string),
            num_interactions: gizmo.get("num_interactions").and_then(Value::as_u64),
        })
    }
}

/// Stringify a JSON scalar; null, arrays and objects yield `None`.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accumulated GPT records, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GptCatalog {
    records: Vec<GptRecord>,
}

impl GptCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge records by id. Newer records replace older ones in place;
    /// unseen ids are appended.
    pub fn merge(&mut self, records: impl IntoIterator<Item = GptRecord>) {
        for record in records {
            match self.records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => self.records.push(record),
            }
        }
    }

    pub fn records(&self) -> &[GptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
