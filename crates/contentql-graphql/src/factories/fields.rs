//! Custom field descriptors.

use async_graphql::dynamic::{FieldFuture, TypeRef};
use async_graphql::{Number, Value};
use contentql_core::{ElementKind, FieldDefinition, FieldKind};
use tracing::warn;

use crate::error::GraphQLError;
use crate::registry::{FieldDescriptor, is_valid_graphql_name};
use crate::resolvers::{parent_element, resolve_relation};
use crate::types::interfaces::interface_name;
use crate::types::scalars::{TIMESTAMP, json_to_timestamp};

fn relation_kind(kind: &FieldKind) -> Option<ElementKind> {
    match kind {
        FieldKind::Entries => Some(ElementKind::Entry),
        FieldKind::Assets => Some(ElementKind::Asset),
        FieldKind::Categories => Some(ElementKind::Category),
        FieldKind::Tags => Some(ElementKind::Tag),
        _ => None,
    }
}

/// GraphQL type of a custom field.
///
/// Required fields and lightswitches are non-null; relations are lists of
/// the related kind's interface.
#[must_use]
pub fn field_type(field: &FieldDefinition) -> TypeRef {
    if let Some(kind) = relation_kind(&field.kind) {
        return if field.required {
            TypeRef::named_nn_list_nn(interface_name(kind))
        } else {
            TypeRef::named_nn_list(interface_name(kind))
        };
    }

    let name = match field.kind {
        FieldKind::Number => TypeRef::FLOAT,
        FieldKind::Lightswitch => return TypeRef::named_nn(TypeRef::BOOLEAN),
        FieldKind::Date => TIMESTAMP,
        _ => TypeRef::STRING,
    };
    if field.required {
        TypeRef::named_nn(name)
    } else {
        TypeRef::named(name)
    }
}

/// Converts a stored field value to the GraphQL value of its type.
fn scalar_value(kind: &FieldKind, raw: Option<&serde_json::Value>) -> Option<Value> {
    match kind {
        FieldKind::Number => match raw? {
            serde_json::Value::Number(n) => Some(Value::Number(n.clone())),
            serde_json::Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            _ => None,
        },
        FieldKind::Lightswitch => Some(Value::Boolean(
            raw.and_then(serde_json::Value::as_bool).unwrap_or(false),
        )),
        FieldKind::Date => raw.and_then(json_to_timestamp),
        _ => match raw? {
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Number(n) => Some(Value::String(n.to_string())),
            _ => None,
        },
    }
}

fn field_descriptor(field: &FieldDefinition) -> FieldDescriptor {
    let handle = field.handle.clone();
    let descriptor = FieldDescriptor::new(field.handle.clone(), field_type(field));
    let descriptor = match &field.instructions {
        Some(instructions) if !instructions.is_empty() => descriptor.description(instructions.clone()),
        _ => descriptor.description(field.name.clone()),
    };

    match relation_kind(&field.kind) {
        Some(kind) => descriptor.resolve(move |ctx| resolve_relation(ctx, handle.clone(), kind)),
        None => {
            let kind = field.kind.clone();
            descriptor.resolve(move |ctx| {
                let handle = handle.clone();
                let kind = kind.clone();
                FieldFuture::new(async move {
                    let element = parent_element(&ctx)?;
                    Ok(scalar_value(&kind, element.field(&handle)))
                })
            })
        }
    }
}

/// Descriptors of the custom fields in `layout`.
///
/// `owner` names the definition for diagnostics. Handles that shadow one of
/// the `reserved` field names are skipped with a warning.
///
/// # Errors
///
/// `InvalidTypeName` (as `owner.handle`) if a field handle is not a valid
/// GraphQL name.
pub fn custom_fields(
    owner: &str,
    layout: &[String],
    fields: &[FieldDefinition],
    reserved: &[FieldDescriptor],
) -> Result<Vec<FieldDescriptor>, GraphQLError> {
    let mut descriptors = Vec::with_capacity(layout.len());
    for handle in layout {
        let Some(field) = fields.iter().find(|f| &f.handle == handle) else {
            warn!(owner = %owner, field = %handle, "Field layout references unknown field");
            continue;
        };
        if !is_valid_graphql_name(handle) {
            return Err(GraphQLError::InvalidTypeName {
                name: format!("{owner}.{handle}"),
            });
        }
        if reserved.iter().any(|f| &f.name == handle) {
            warn!(owner = %owner, field = %handle, "Custom field shadows a built-in field, skipping");
            continue;
        }
        descriptors.push(field_descriptor(field));
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::named_type;
    use serde_json::json;

    fn field(handle: &str, kind: FieldKind, required: bool) -> FieldDefinition {
        FieldDefinition {
            id: 1,
            name: handle.to_uppercase(),
            handle: handle.into(),
            instructions: None,
            required,
            kind,
        }
    }

    #[test]
    fn test_field_types() {
        let ty = field_type(&field("body", FieldKind::RichText, false));
        assert_eq!(ty.to_string(), "String");

        let ty = field_type(&field("price", FieldKind::Number, true));
        assert_eq!(ty.to_string(), "Float!");

        let ty = field_type(&field("featured", FieldKind::Lightswitch, false));
        assert_eq!(ty.to_string(), "Boolean!");

        let ty = field_type(&field("published", FieldKind::Date, false));
        assert_eq!(ty.to_string(), "Timestamp");

        let ty = field_type(&field("related", FieldKind::Entries, false));
        assert_eq!(ty.to_string(), "[EntryInterface!]");
        assert_eq!(named_type(&ty), "EntryInterface");

        let ty = field_type(&field("topics", FieldKind::Tags, true));
        assert_eq!(ty.to_string(), "[TagInterface!]!");
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(
            scalar_value(&FieldKind::Number, Some(&json!("2.5"))),
            Some(Value::Number(Number::from_f64(2.5).unwrap()))
        );
        assert_eq!(
            scalar_value(&FieldKind::Lightswitch, None),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            scalar_value(&FieldKind::PlainText, Some(&json!("hi"))),
            Some(Value::String("hi".into()))
        );
        assert_eq!(scalar_value(&FieldKind::PlainText, Some(&json!([1]))), None);
        assert_eq!(
            scalar_value(&FieldKind::Date, Some(&json!("2024-01-01T00:00:00Z"))),
            Some(Value::Number(1_704_067_200.into()))
        );
    }

    #[test]
    fn test_invalid_field_handle() {
        let fields = vec![field("2fast", FieldKind::PlainText, false)];
        let err = custom_fields("article", &["2fast".into()], &fields, &[]).unwrap_err();
        assert!(matches!(err, GraphQLError::InvalidTypeName { name } if name == "article.2fast"));
    }

    #[test]
    fn test_reserved_field_is_skipped() {
        let fields = vec![
            field("title", FieldKind::PlainText, false),
            field("body", FieldKind::RichText, false),
        ];
        let reserved = vec![FieldDescriptor::new("title", TypeRef::named_nn(TypeRef::STRING))];
        let descriptors =
            custom_fields("article", &["title".into(), "body".into()], &fields, &reserved).unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["body"]);
        assert!(descriptors.iter().all(FieldDescriptor::has_resolver));
    }
}
