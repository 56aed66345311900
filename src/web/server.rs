//! HTTP server for the DevBoard API.

use super::handlers;
use crate::auth::AuthProvider;
use crate::config::{Config, RetentionConfig};
use crate::service::TaskService;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    service: TaskService,
    auth: Arc<dyn AuthProvider>,
    cookie_name: Arc<str>,
    retention: Arc<RetentionConfig>,
}

impl AppState {
    pub fn new(service: TaskService, auth: Arc<dyn AuthProvider>, config: &Config) -> Self {
        Self {
            service,
            auth,
            cookie_name: Arc::from(config.auth.cookie_name.as_str()),
            retention: Arc::new(config.retention.clone()),
        }
    }

    /// State whose sessions are resolved against the service's own database.
    pub fn from_service(service: TaskService, config: &Config) -> Self {
        let auth: Arc<dyn AuthProvider> = service.db().clone();
        Self::new(service, auth, config)
    }

    pub fn service(&self) -> &TaskService {
        &self.service
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/me", get(handlers::me))
        .route("/api/revision", get(handlers::revision))
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{task_id}",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::soft_delete_task),
        )
        .route("/api/tasks/{task_id}/restore", post(handlers::restore_task))
        .route("/api/tasks/{task_id}/clone", post(handlers::clone_task))
        .route(
            "/api/tasks/{task_id}/permanent",
            delete(handlers::hard_delete_task),
        )
        .route(
            "/api/labels",
            get(handlers::list_labels).post(handlers::create_label),
        )
        .route("/api/cron/cleanup-tasks", get(handlers::cron_cleanup))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.join.await;
    }
}

/// Bind `addr` and serve in the background. Port 0 picks a free port.
pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("DevBoard listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("HTTP server shutting down");
            })
            .await
        {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx: Some(shutdown_tx),
        join,
    })
}
