//! Custom scalar types.

use async_graphql::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::registry::{ScalarDescriptor, TypeDescriptor, TypeOrigin};

/// Unix timestamp scalar, in seconds.
pub const TIMESTAMP: &str = "Timestamp";

#[must_use]
pub fn timestamp_scalar() -> TypeDescriptor {
    TypeDescriptor::Scalar(
        ScalarDescriptor::new(TIMESTAMP, TypeOrigin::Builtin)
            .description("Unix timestamp in seconds. Use @date to render it as a string."),
    )
}

/// Converts a raw date field value into a `Timestamp` value.
///
/// Accepts unix seconds or an RFC 3339 string.
#[must_use]
pub fn json_to_timestamp(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().map(|secs| Value::Number(secs.into())),
        serde_json::Value::String(s) => OffsetDateTime::parse(s, &Rfc3339)
            .ok()
            .map(|date| Value::Number(date.unix_timestamp().into())),
        _ => None,
    }
}
