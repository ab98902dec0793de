use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Router, http::StatusCode, routing::get};
use contentql_core::{DynContentStore, InMemoryContentStore};
use contentql_graphql::{GraphQLService, GraphQLState, graphql_handler, graphql_handler_get};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;

pub struct ContentQLServer {
    addr: SocketAddr,
    app: Router,
    service: GraphQLService,
}

/// Routes for `service`. `/graphql` is only mounted when the API is enabled.
pub fn build_app(cfg: &AppConfig, service: GraphQLService) -> Router {
    let body_limit = cfg.server.body_limit_bytes;

    let mut router = Router::new().route("/healthz", get(healthz));
    if cfg.graphql.enabled {
        let graphql = Router::new()
            .route("/graphql", get(graphql_handler_get).post(graphql_handler))
            .with_state(GraphQLState::new(service));
        router = router.merge(graphql);
    } else {
        tracing::info!("GraphQL API disabled");
    }

    router
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub struct ServerBuilder {
    config: AppConfig,
    store: Option<DynContentStore>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Serves `store` instead of reading `content.path`.
    pub fn with_store(mut self, store: DynContentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> anyhow::Result<ContentQLServer> {
        let store = match self.store {
            Some(store) => store,
            None => load_store(&self.config)?,
        };
        let service = GraphQLService::bootstrap(store, &self.config.graphql)
            .await
            .context("GraphQL service bootstrap failed")?;
        let app = build_app(&self.config, service.clone());

        Ok(ContentQLServer {
            addr: self.config.addr(),
            app,
            service,
        })
    }
}

/// Reads the JSON content export named by `content.path`.
pub fn load_store(cfg: &AppConfig) -> anyhow::Result<DynContentStore> {
    let path = &cfg.content.path;
    let store = InMemoryContentStore::from_path(path)
        .with_context(|| format!("failed to load content from {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        elements = store.element_count(),
        "Content loaded"
    );
    Ok(Arc::new(store))
}

impl ContentQLServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn service(&self) -> &GraphQLService {
        &self.service
    }

    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
