//! GraphQL configuration.
//!
//! Configuration is read from the `[graphql]` section of the server config.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! enabled = true
//! max_query_depth = 10
//! max_query_complexity = false
//! introspection = true
//! dev_mode = false
//! ```
//!
//! Each query limit is independently optional: a positive number enables it,
//! while `false`, `0` or leaving the key out disables it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::{AssemblerConfig, QuerySafetyLimits};

/// GraphQL API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Enable GraphQL API endpoints.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum query depth. Root fields are depth 1.
    /// Default: disabled
    #[serde(
        default,
        deserialize_with = "deserialize_limit",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_query_depth: Option<usize>,

    /// Maximum query complexity. Every selected field costs 1.
    /// Default: disabled
    #[serde(
        default,
        deserialize_with = "deserialize_limit",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_query_complexity: Option<usize>,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Development mode: resolver failures are returned with full detail
    /// instead of being sanitized.
    /// Default: false
    #[serde(default)]
    pub dev_mode: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_introspection() -> bool {
    true
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_query_depth: None,
            max_query_complexity: None,
            introspection: default_introspection(),
            dev_mode: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LimitValue {
    Flag(bool),
    Number(usize),
}

/// Accepts a positive number, `false` or `0`.
fn deserialize_limit<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LimitValue>::deserialize(deserializer)? {
        None | Some(LimitValue::Flag(false)) | Some(LimitValue::Number(0)) => Ok(None),
        Some(LimitValue::Number(n)) => Ok(Some(n)),
        Some(LimitValue::Flag(true)) => Err(serde::de::Error::custom(
            "query limits must be a number or false",
        )),
    }
}

impl GraphQLConfig {
    /// The query safety limits installed at bootstrap.
    #[must_use]
    pub fn limits(&self) -> QuerySafetyLimits {
        QuerySafetyLimits {
            max_depth: self.max_query_depth,
            max_complexity: self.max_query_complexity,
        }
    }

    /// Converts this config to an [`AssemblerConfig`].
    #[must_use]
    pub fn to_assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            limits: self.limits(),
            introspection_enabled: self.introspection,
            dev_mode: self.dev_mode,
        }
    }
}
