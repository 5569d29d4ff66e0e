use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use validator::Validate;

/// JSON extractor whose rejection renders the same `{"error": …}` body as
/// every other failure, instead of axum's plain-text default.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ServiceError::Validation(rejection.body_text())),
        }
    }
}

/// Standard success response
pub fn success_message(message: &str) -> Response {
    (StatusCode::OK, Json(json!({ "message": message }))).into_response()
}

/// Standard created response
pub fn created_message(message: &str) -> Response {
    (StatusCode::CREATED, Json(json!({ "message": message }))).into_response()
}

pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))
}
