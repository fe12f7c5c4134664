use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, rejection::{JsonRejection, PathRejection}},
    http::{HeaderValue, StatusCode},
    routing::get,
};
use tokio::net;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::HttpServerConfig;
use crate::domain::{NewTodo, Todo, TodoError, TodoPatch};
use crate::service::todo_service;
use crate::storage::{Database, Session};

#[cfg(feature = "tracing")]
use tower_http::trace::TraceLayer;
#[cfg(feature = "tracing")]
use tracing::info;

pub async fn get_todos(mut session: Session) -> Result<Json<Vec<Todo>>, TodoError> {
    let items = todo_service::list_all(&mut session).await?;
    Ok(Json(items))
}

pub async fn get_todo(
    mut session: Session,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, TodoError> {
    let Path(id) = id?;
    let item = todo_service::get_one(&mut session, id)
        .await?
        .ok_or_else(TodoError::todo_not_found)?;
    Ok(Json(item))
}

pub async fn post_todos(
    mut session: Session,
    body: Result<Json<NewTodo>, JsonRejection>,
) -> Result<Json<Todo>, TodoError> {
    let Json(body) = body?;
    let item = todo_service::create(&mut session, body).await?;
    Ok(Json(item))
}

pub async fn put_todo(
    mut session: Session,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Todo>, TodoError> {
    let Path(id) = id?;
    let Json(patch) = body?;
    let item = todo_service::update(&mut session, id, patch)
        .await?
        .ok_or_else(TodoError::todo_not_found)?;
    Ok(Json(item))
}

pub async fn delete_todo(
    mut session: Session,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, TodoError> {
    let Path(id) = id?;
    let item = todo_service::delete(&mut session, id)
        .await?
        .ok_or_else(TodoError::todo_not_found)?;
    Ok(Json(item))
}

async fn health_route() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Only the listed origins may call the API. Methods and headers are
/// mirrored back because wildcards are not allowed alongside credentials.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, TodoError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| TodoError::Config(format!("invalid CORS origin: {origin:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn router(database: Database, allowed_origins: &[String]) -> Result<Router, TodoError> {
    let router = Router::new()
        .route("/health", get(health_route))
        .route("/todos", get(get_todos).post(post_todos))
        .route("/todos/{id}", get(get_todo).put(put_todo).delete(delete_todo))
        .layer(cors_layer(allowed_origins)?);

    #[cfg(feature = "tracing")]
    let router = router.layer(TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        },
    ));

    Ok(router.with_state(database))
}

pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    pub async fn new(database: Database, config: HttpServerConfig) -> anyhow::Result<Self> {
        let router = router(database, &config.allowed_origins)?;
        let listener = net::TcpListener::bind(config.addr)
            .await
            .with_context(|| format!("failed to listen on {}", config.addr))?;
        Ok(Self { router, listener })
    }

    /// Serves until Ctrl-C or SIGTERM, then drains in-flight requests.
    pub async fn run(self) -> anyhow::Result<()> {
        #[cfg(feature = "tracing")]
        {
            if let Ok(addr) = self.listener.local_addr() {
                info!(addr = %addr, "HTTP server started");
            }
        }
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(feature = "tracing")]
    info!("Shutdown signal received");
}
