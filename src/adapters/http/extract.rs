use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app_error::AppError;

/// Identity of the calling user, taken from the `x-user-id` header set by
/// the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Forbidden("Missing user identity".into()))?;

        let user_id = raw
            .parse::<Uuid>()
            .map_err(|_| AppError::InvalidInput("x-user-id must be a valid UUID".into()))?;

        Ok(AuthUser(user_id))
    }
}

/// Marker extractor for operator endpoints; requires `x-user-role: admin`.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok());

        if role != Some("admin") {
            return Err(AppError::Forbidden("Admin access required".into()));
        }

        Ok(AdminUser)
    }
}
