// src/errors.rs

// dependencies
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::io;
use std::path::PathBuf;

// enum type to represent an error from the static file server
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("404 page not found")]
    NotFound,
    #[error("403 Forbidden")]
    PermissionDenied,
    #[error("405 method not allowed")]
    MethodNotAllowed,
    #[error("500 Internal Server Error")]
    Io(#[source] io::Error),
}

impl From<io::Error> for ServeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::InvalidInput => ServeError::NotFound,
            io::ErrorKind::PermissionDenied => ServeError::PermissionDenied,
            _ => ServeError::Io(err),
        }
    }
}

impl ServeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::PermissionDenied => StatusCode::FORBIDDEN,
            ServeError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        if let ServeError::Io(err) = &self {
            tracing::warn!(error = %err, "i/o error while serving file");
        }

        let mut response = (self.status_code(), self.to_string()).into_response();
        if let ServeError::MethodNotAllowed = self {
            response
                .headers_mut()
                .insert(header::ALLOW, header::HeaderValue::from_static("GET, HEAD"));
        }
        response
    }
}

// enum type to represent a problem loading the bindings file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("bad config file: line {line} has no address/directory separator: {content:?}")]
    BadLine { line: usize, content: String },
    #[error("could not determine the home directory for the default config file")]
    NoHomeDir,
}

// enum type to represent a fatal listener failure
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server on {addr} failed: {source}")]
    Serve {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}
