//! Query schema extension hook.

use super::query::QueryBuilder;
use crate::error::GraphQLError;
use crate::token::AccessToken;

/// Extension point fired once per schema build, after the standard Query
/// fields exist and before the Query root is registered.
///
/// Hooks run synchronously, in registration order, with mutable access to
/// the builder. Resolvers added by a hook run like any other resolver.
pub trait QuerySchemaHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Alters the Query root for the build scoped to `token`.
    ///
    /// # Errors
    ///
    /// An error aborts the schema build.
    fn alter(&self, query: &mut QueryBuilder, token: &AccessToken) -> Result<(), GraphQLError>;
}
