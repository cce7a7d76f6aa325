//! Response shaping for the proxy endpoint.
//!
//! # Responsibilities
//! - Serialize `ResponseDescriptor` as the 200 body
//! - Map `ProxyError` to its status code and `{ message, type }` body
//! - Produce the fixed 405 and panic bodies
//!
//! # Design Decisions
//! - Every error body has the same shape, whatever produced it

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::proxy::{ErrorKind, ErrorPayload, ProxyError};

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.payload())).into_response()
    }
}

/// 405 body for anything but POST and OPTIONS on the proxy route.
pub fn method_not_allowed() -> Response {
    let payload = ErrorPayload {
        message: "Method not allowed".to_string(),
        kind: ErrorKind::Validation,
    };
    (StatusCode::METHOD_NOT_ALLOWED, Json(payload)).into_response()
}

/// Turn a caught panic into a `server` error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");
    ProxyError::Server(detail).into_response()
}
