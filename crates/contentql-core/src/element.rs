//! Content records.
//!
//! An element is a single piece of content owned by one definition: an entry
//! of a section, an asset of a volume, a category, a tag, or the content of a
//! global set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::model::DefinitionId;

/// Identifier of an element, unique across all element kinds.
pub type ElementId = u64;

/// The kinds of elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Entry,
    Asset,
    Category,
    Tag,
    GlobalSet,
}

/// Which definition owns an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementOwner {
    Entry {
        section_id: DefinitionId,
        entry_type_id: DefinitionId,
    },
    Asset {
        volume_id: DefinitionId,
    },
    Category {
        group_id: DefinitionId,
    },
    Tag {
        group_id: DefinitionId,
    },
    GlobalSet {
        global_set_id: DefinitionId,
    },
}

impl ElementOwner {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Entry { .. } => ElementKind::Entry,
            Self::Asset { .. } => ElementKind::Asset,
            Self::Category { .. } => ElementKind::Category,
            Self::Tag { .. } => ElementKind::Tag,
            Self::GlobalSet { .. } => ElementKind::GlobalSet,
        }
    }

    /// Id of the owning section, volume, group or global set.
    #[must_use]
    pub fn owner_id(&self) -> DefinitionId {
        match *self {
            Self::Entry { section_id, .. } => section_id,
            Self::Asset { volume_id } => volume_id,
            Self::Category { group_id } | Self::Tag { group_id } => group_id,
            Self::GlobalSet { global_set_id } => global_set_id,
        }
    }
}

/// A single piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub owner: ElementOwner,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub date_updated: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub post_date: Option<OffsetDateTime>,
    /// Custom field values keyed by field handle.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Element {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.owner.kind()
    }

    /// Returns the raw value of a custom field.
    #[must_use]
    pub fn field(&self, handle: &str) -> Option<&Value> {
        self.fields.get(handle)
    }

    /// Returns the related element ids stored in a relation field.
    ///
    /// Non-numeric entries are ignored.
    #[must_use]
    pub fn related_ids(&self, handle: &str) -> Vec<ElementId> {
        match self.fields.get(handle) {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_u64).collect(),
            Some(Value::Number(n)) => n.as_u64().into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_entry() {
        let element: Element = serde_json::from_value(json!({
            "id": 7,
            "owner": {"kind": "entry", "section_id": 1, "entry_type_id": 10},
            "title": "Hello",
            "slug": "hello",
            "date_created": "2024-01-02T03:04:05Z",
            "date_updated": "2024-01-02T03:04:05Z",
            "fields": {"related": [8, "x", 9]}
        }))
        .unwrap();

        assert_eq!(element.kind(), ElementKind::Entry);
        assert_eq!(element.owner.owner_id(), 1);
        assert!(element.post_date.is_none());
        assert_eq!(element.related_ids("related"), vec![8, 9]);
        assert!(element.related_ids("missing").is_empty());
    }

    #[test]
    fn test_owner_kind() {
        let owner = ElementOwner::Tag { group_id: 3 };
        assert_eq!(owner.kind(), ElementKind::Tag);
        assert_eq!(owner.owner_id(), 3);
    }
}
