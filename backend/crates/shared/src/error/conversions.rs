//! RFC 7807 problem bodies, and the axum response built from them.

use super::app_error::AppError;

/// Problem Details JSON for `err`.
///
/// `code` falls back to the kind's SCREAMING_SNAKE_CASE name when unset.
pub fn problem_body(err: &AppError) -> serde_json::Value {
    let code = match err.code() {
        Some(code) => serde_json::Value::from(code),
        None => serde_json::to_value(err.kind()).unwrap_or(serde_json::Value::Null),
    };

    serde_json::json!({
        "type": format!("https://httpstatuses.io/{}", err.status_code()),
        "title": err.kind().as_str(),
        "status": err.status_code(),
        "detail": err.message(),
        "code": code,
        "action": err.action(),
    })
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(problem_body(&self))).into_response()
    }
}
