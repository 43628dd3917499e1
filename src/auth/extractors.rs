use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::claims::Claims;
use super::repo_types::User;
use super::session::SessionKeys;
use crate::error::AppError;
use crate::state::AppState;

/// A verified, unrevoked session token taken from the session cookie.
pub struct SessionClaims(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for SessionClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = keys.token(&jar).ok_or(AppError::Unauthorized)?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "invalid or expired session");
                return Err(AppError::Unauthorized);
            }
        };

        if state.sessions.is_revoked(claims.jti).await? {
            warn!(user_id = claims.sub, jti = %claims.jti, "revoked session presented");
            return Err(AppError::Unauthorized);
        }

        Ok(SessionClaims(claims))
    }
}

/// The live user behind the session cookie, with the claims it was resolved
/// from. A session for a user that no longer exists is rejected like a
/// missing one.
pub struct CurrentUser {
    pub user: User,
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionClaims(claims) = SessionClaims::from_request_parts(parts, state).await?;
        match state.users.find_by_id(claims.sub).await? {
            Some(user) => Ok(CurrentUser { user, claims }),
            None => {
                warn!(user_id = claims.sub, "session for missing user");
                Err(AppError::Unauthorized)
            }
        }
    }
}
