//! # contentql-server
//!
//! Serves the ContentQL GraphQL API over a JSON content export.
//!
//! - `GET /healthz` - liveness check
//! - `POST /graphql`, `GET /graphql` - GraphQL endpoint, unless
//!   `graphql.enabled = false`
//!
//! Configuration comes from `contentql.toml` with `CONTENTQL__*`
//! environment overrides (see [`config::loader::load_config`]).

pub mod config;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use server::{ContentQLServer, ServerBuilder, build_app, load_store};
