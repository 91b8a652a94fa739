//! Response construction and error mapping.
//!
//! # Responsibilities
//! - Map `DispatchError` variants to HTTP status codes
//! - Wrap payloads and errors in a uniform JSON envelope
//! - Attach the request ID header to every response

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::dispatch::{DispatchError, RequestId};

/// Status code for each terminal error kind.
///
/// Overloaded asks the caller to retry later (503), timeouts are the
/// gateway-style 504, transport failures 502, task faults 500, and
/// malformed requests 400.
pub fn status_for(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
        DispatchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DispatchError::Transport(_) => StatusCode::BAD_GATEWAY,
        DispatchError::TaskFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DispatchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
    }
}

/// Successful JSON response with the request ID header attached.
pub fn success(id: RequestId, body: serde_json::Value) -> Response {
    with_request_id(id, (StatusCode::OK, Json(body)).into_response())
}

/// Error response: typed status, JSON body naming the error kind.
pub fn error(id: RequestId, err: &DispatchError) -> Response {
    let body = json!({
        "error": err.kind(),
        "message": err.to_string(),
    });
    with_request_id(id, (status_for(err), Json(body)).into_response())
}

fn with_request_id(id: RequestId, mut response: Response) -> Response {
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_expected_statuses() {
        assert_eq!(
            status_for(&DispatchError::Overloaded),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&DispatchError::Timeout(100)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&DispatchError::Transport("refused".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&DispatchError::TaskFault("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&DispatchError::InvalidRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn responses_carry_request_id() {
        let id = RequestId::new();
        let response = error(id, &DispatchError::Overloaded);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get("x-request-id").expect("header set"),
            &id.to_string()
        );
    }
}
