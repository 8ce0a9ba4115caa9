//! Caller identity.
//!
//! Authentication happens upstream; the gateway forwards the resolved user id
//! in `x-user-id`. `require_user` turns it into a `CurrentUser` extension and
//! handlers extract that, never the raw header.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i32);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0
    }

    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(USER_ID_HEADER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .map(CurrentUser)
    }
}

/// Middleware for every `/api` route. Rejects the request with 401 before it
/// reaches a handler when no identity was forwarded.
pub async fn require_user(mut request: Request, next: Next) -> Result<Response, AppError> {
    match CurrentUser::from_headers(request.headers()) {
        Some(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!("Request to {} without a caller identity", request.uri().path());
            Err(AppError::Unauthorized)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parses_positive_id() {
        assert_eq!(CurrentUser::from_headers(&headers("17")), Some(CurrentUser(17)));
        assert_eq!(CurrentUser::from_headers(&headers(" 3 ")), Some(CurrentUser(3)));
    }

    #[test]
    fn test_rejects_missing_or_malformed() {
        assert_eq!(CurrentUser::from_headers(&HeaderMap::new()), None);
        assert_eq!(CurrentUser::from_headers(&headers("abc")), None);
        assert_eq!(CurrentUser::from_headers(&headers("0")), None);
        assert_eq!(CurrentUser::from_headers(&headers("-4")), None);
    }
}
