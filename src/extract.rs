//! Request extractors whose rejections match the route's error format.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Json, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::middleware::EnvelopeError;

/// JSON body for the account form routes.
///
/// A missing content type, malformed JSON or a field of the wrong type is a
/// 400 error envelope rather than axum's plain-text 415/422.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = EnvelopeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for EnvelopeError {
    fn from(rejection: JsonRejection) -> Self {
        EnvelopeError(ApiError::bad_request(rejection.body_text()))
    }
}
