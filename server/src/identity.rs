//! Caller identity.
//!
//! Tokens are verified upstream by the identity provider's gateway, which
//! forwards the verified user id in [`USER_ID_HEADER`]. Handlers receive it
//! as a [`Caller`] and hand the derived [`Scope`] to the service explicitly.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use taskdeck_core::{Scope, UserId, ValidationError};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Caller(pub Option<UserId>);

impl Caller {
    pub fn scope(&self) -> Scope {
        Scope::from_caller(self.0.clone())
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Caller(None));
        };
        let raw = value.to_str().map_err(|_| {
            ApiError::validation(ValidationError::single(
                USER_ID_HEADER,
                "User ID header must be visible ASCII",
            ))
        })?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Caller(None));
        }
        Ok(Caller(Some(UserId::new(trimmed))))
    }
}
