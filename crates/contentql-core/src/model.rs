//! Content definitions.
//!
//! A content definition describes a schema-relevant collection in the host
//! CMS. Its `handle` is a short, human-assigned identifier that ContentQL uses
//! verbatim as a GraphQL type name, so definitions are validated at the edge
//! of the system (see [`ContentModel::validate`]).

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::store::ContentStore;

/// Stable identifier of a definition within its category.
pub type DefinitionId = u64;

/// The categories of content definitions exposed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Section,
    EntryType,
    Volume,
    CategoryGroup,
    TagGroup,
    GlobalSet,
    Field,
}

impl ContentCategory {
    /// Human readable name, used in logs and error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::EntryType => "entry type",
            Self::Volume => "volume",
            Self::CategoryGroup => "category group",
            Self::TagGroup => "tag group",
            Self::GlobalSet => "global set",
            Self::Field => "field",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record describing one content collection of the host.
///
/// Implementors know how to fetch their full, host-ordered list from a
/// [`ContentStore`]; repositories cache the result.
#[async_trait]
pub trait ContentDefinition: Clone + fmt::Debug + Send + Sync + 'static {
    /// Category this definition belongs to.
    const CATEGORY: ContentCategory;

    fn id(&self) -> DefinitionId;

    fn name(&self) -> &str;

    /// Short identifier, used as the GraphQL type name.
    fn handle(&self) -> &str;

    /// Fetches every definition of this category from the store, in host order.
    async fn fetch(store: &dyn ContentStore) -> Result<Vec<Self>, CoreError>;
}

/// Section kinds as defined by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Single,
    #[default]
    Channel,
    Structure,
}

impl SectionKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Channel => "channel",
            Self::Structure => "structure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: DefinitionId,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub kind: SectionKind,
    /// Entry types of this section, in host order.
    #[serde(default)]
    pub entry_types: Vec<DefinitionId>,
    #[serde(default)]
    pub has_urls: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryType {
    pub id: DefinitionId,
    pub section_id: DefinitionId,
    pub name: String,
    pub handle: String,
    /// Custom field handles, in layout order.
    #[serde(default)]
    pub field_layout: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: DefinitionId,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub field_layout: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: DefinitionId,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub field_layout: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagGroup {
    pub id: DefinitionId,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub field_layout: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSet {
    pub id: DefinitionId,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub field_layout: Vec<String>,
}

/// The kind of a custom field, with kind specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    PlainText,
    RichText,
    Number,
    Lightswitch,
    Date,
    Dropdown {
        #[serde(default)]
        options: Vec<String>,
    },
    Entries,
    Assets,
    Categories,
    Tags,
}

impl FieldKind {
    /// Whether values of this field are lists of related element ids.
    #[must_use]
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            Self::Entries | Self::Assets | Self::Categories | Self::Tags
        )
    }
}

/// A global custom field, referenced by handle from field layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: DefinitionId,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

macro_rules! content_definition {
    ($ty:ty, $category:expr, $fetch:ident) => {
        #[async_trait]
        impl ContentDefinition for $ty {
            const CATEGORY: ContentCategory = $category;

            fn id(&self) -> DefinitionId {
                self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn handle(&self) -> &str {
                &self.handle
            }

            async fn fetch(store: &dyn ContentStore) -> Result<Vec<Self>, CoreError> {
                store.$fetch().await
            }
        }
    };
}

content_definition!(Section, ContentCategory::Section, sections);
content_definition!(EntryType, ContentCategory::EntryType, entry_types);
content_definition!(Volume, ContentCategory::Volume, volumes);
content_definition!(CategoryGroup, ContentCategory::CategoryGroup, category_groups);
content_definition!(TagGroup, ContentCategory::TagGroup, tag_groups);
content_definition!(GlobalSet, ContentCategory::GlobalSet, global_sets);
content_definition!(FieldDefinition, ContentCategory::Field, fields);

/// The complete definition model of a host, as one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentModel {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub entry_types: Vec<EntryType>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub category_groups: Vec<CategoryGroup>,
    #[serde(default)]
    pub tag_groups: Vec<TagGroup>,
    #[serde(default)]
    pub global_sets: Vec<GlobalSet>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl ContentModel {
    /// Checks referential integrity of the model.
    ///
    /// Handle uniqueness across categories is intentionally not checked here:
    /// colliding type names are a schema concern and are rejected when the
    /// GraphQL schema is assembled.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidModel` for duplicate ids or handles within a
    /// category, dangling section/entry type references, and field layouts
    /// naming unknown fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_unique(&self.sections)?;
        check_unique(&self.entry_types)?;
        check_unique(&self.volumes)?;
        check_unique(&self.category_groups)?;
        check_unique(&self.tag_groups)?;
        check_unique(&self.global_sets)?;
        check_unique(&self.fields)?;

        for entry_type in &self.entry_types {
            let section = self
                .sections
                .iter()
                .find(|s| s.id == entry_type.section_id)
                .ok_or_else(|| {
                    CoreError::invalid_model(format!(
                        "entry type '{}' belongs to unknown section {}",
                        entry_type.handle, entry_type.section_id
                    ))
                })?;
            if !section.entry_types.contains(&entry_type.id) {
                return Err(CoreError::invalid_model(format!(
                    "entry type '{}' is not listed by section '{}'",
                    entry_type.handle, section.handle
                )));
            }
        }

        for section in &self.sections {
            for id in &section.entry_types {
                if !self.entry_types.iter().any(|et| et.id == *id) {
                    return Err(CoreError::invalid_model(format!(
                        "section '{}' lists unknown entry type {id}",
                        section.handle
                    )));
                }
            }
        }

        let layouts = self
            .entry_types
            .iter()
            .map(|d| (d.handle.as_str(), &d.field_layout))
            .chain(self.volumes.iter().map(|d| (d.handle.as_str(), &d.field_layout)))
            .chain(
                self.category_groups
                    .iter()
                    .map(|d| (d.handle.as_str(), &d.field_layout)),
            )
            .chain(self.tag_groups.iter().map(|d| (d.handle.as_str(), &d.field_layout)))
            .chain(self.global_sets.iter().map(|d| (d.handle.as_str(), &d.field_layout)));

        for (owner, layout) in layouts {
            for handle in layout {
                if !self.fields.iter().any(|f| &f.handle == handle) {
                    return Err(CoreError::invalid_model(format!(
                        "field layout of '{owner}' references unknown field '{handle}'"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Returns the section with the given id.
    #[must_use]
    pub fn section(&self, id: DefinitionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

fn check_unique<D: ContentDefinition>(definitions: &[D]) -> Result<(), CoreError> {
    let mut ids = HashSet::new();
    let mut handles = HashSet::new();
    for definition in definitions {
        if !ids.insert(definition.id()) {
            return Err(CoreError::invalid_model(format!(
                "duplicate {} id {}",
                D::CATEGORY,
                definition.id()
            )));
        }
        if !handles.insert(definition.handle()) {
            return Err(CoreError::invalid_model(format!(
                "duplicate {} handle '{}'",
                D::CATEGORY,
                definition.handle()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news_model() -> ContentModel {
        ContentModel {
            sections: vec![Section {
                id: 1,
                name: "News".into(),
                handle: "news".into(),
                kind: SectionKind::Channel,
                entry_types: vec![10],
                has_urls: true,
            }],
            entry_types: vec![EntryType {
                id: 10,
                section_id: 1,
                name: "Article".into(),
                handle: "article".into(),
                field_layout: vec!["body".into()],
            }],
            fields: vec![FieldDefinition {
                id: 100,
                name: "Body".into(),
                handle: "body".into(),
                instructions: None,
                required: false,
                kind: FieldKind::RichText,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_model() {
        assert!(news_model().validate().is_ok());
    }

    #[test]
    fn test_unknown_field_in_layout() {
        let mut model = news_model();
        model.entry_types[0].field_layout.push("summary".into());
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("unknown field 'summary'"));
    }

    #[test]
    fn test_dangling_section_reference() {
        let mut model = news_model();
        model.entry_types[0].section_id = 99;
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_duplicate_handle_within_category() {
        let mut model = news_model();
        model.volumes = vec![
            Volume {
                id: 1,
                name: "Images".into(),
                handle: "images".into(),
                field_layout: vec![],
            },
            Volume {
                id: 2,
                name: "Images 2".into(),
                handle: "images".into(),
                field_layout: vec![],
            },
        ];
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate volume handle 'images'"));
    }

    #[test]
    fn test_cross_category_handles_are_allowed_here() {
        let mut model = news_model();
        model.volumes.push(Volume {
            id: 1,
            name: "News".into(),
            handle: "news".into(),
            field_layout: vec![],
        });
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_field_kind_deserialize() {
        let field: FieldDefinition = serde_json::from_str(
            r#"{"id": 1, "name": "Color", "handle": "color", "type": "dropdown", "options": ["red", "blue"]}"#,
        )
        .unwrap();
        assert_eq!(
            field.kind,
            FieldKind::Dropdown {
                options: vec!["red".into(), "blue".into()]
            }
        );
        assert!(!field.required);
        assert!(!field.kind.is_relation());
    }
}
