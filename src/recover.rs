// src/recover.rs

// dependencies
use crate::access::Forbidden;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Middleware turning a [`Forbidden`] unwind into `403 Forbidden`.
///
/// Any other unwind is logged and resumed so real defects still surface.
pub async fn recover_forbidden(req: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => recover(payload),
    }
}

/// Converts an unwind payload caught at the request boundary.
pub fn recover(payload: Box<dyn Any + Send>) -> Response {
    if Forbidden::is_payload(payload.as_ref()) {
        return forbidden();
    }

    tracing::error!(
        panic = panic_message(payload.as_ref()),
        "request handler panicked"
    );
    panic::resume_unwind(payload)
}

pub fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
