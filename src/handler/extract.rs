use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::internationalization::DetectedLanguage;

/// Language of the requested page, from `?lang=` or the `/nl` path prefix.
pub struct Language(pub DetectedLanguage);

impl<S> FromRequestParts<S> for Language
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(DetectedLanguage::detect(
            parts.uri.path(),
            parts.uri.query(),
        )))
    }
}
