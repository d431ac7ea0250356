// src/server.rs

// dependencies
use crate::config::{Binding, ServerConfig};
use crate::errors::{ServeError, ServerError};
use crate::fs::FileSystem;
use crate::recover::recover_forbidden;
use crate::static_server::StaticServer;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Builds the request handler for one root: every path falls through to the
/// file engine, wrapped in the forbidden-listing recovery.
pub fn file_router<F: FileSystem>(server: StaticServer<F>) -> Router {
    Router::new()
        .fallback(serve_request::<F>)
        .with_state(Arc::new(server))
        .layer(middleware::from_fn(recover_forbidden))
}

pub fn binding_router(binding: &Binding, dir_listing: bool) -> Router {
    file_router(StaticServer::for_binding(binding, dir_listing))
}

async fn serve_request<F: FileSystem>(
    State(server): State<Arc<StaticServer<F>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    debug!(%method, path = uri.path(), "serving");

    let joined =
        tokio::task::spawn_blocking(move || server.serve(&method, &uri, &headers)).await;

    match joined {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => err.into_response(),
        // hand the unwind to the recovery layer on this task
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => ServeError::Io(io::Error::other(err)).into_response(),
    }
}

/// Serves `app` on an already bound listener until it fails.
pub async fn serve_listener(listener: TcpListener, app: Router) -> io::Result<()> {
    axum::serve(listener, app).await
}

/// Binds one address and serves its root directory forever.
pub async fn serve_binding(binding: Binding, dir_listing: bool) -> Result<(), ServerError> {
    let listener = TcpListener::bind(binding.socket_addr())
        .await
        .map_err(|source| ServerError::Bind {
            addr: binding.address.clone(),
            source,
        })?;

    info!(
        address = %binding.address,
        root = %binding.root_dir.display(),
        dir_listing,
        "listening"
    );

    serve_listener(listener, binding_router(&binding, dir_listing))
        .await
        .map_err(|source| ServerError::Serve {
            addr: binding.address.clone(),
            source,
        })
}

/// Runs one server per binding and returns when all have stopped.
///
/// The first listener to fail ends the run; the remaining listeners are
/// aborted when the task set is dropped.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let mut servers = JoinSet::new();
    for binding in config.bindings.iter() {
        servers.spawn(serve_binding(binding, config.dir_listing));
    }

    while let Some(joined) = servers.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(error = %err, "server stopped");
                return Err(err);
            }
            Err(err) => return Err(ServerError::Task(err)),
        }
    }

    Ok(())
}
