use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, SignupRequest},
        extractors::CurrentUser,
        password::verify_unknown_user,
        repo_types::NewUser,
        session::SessionKeys,
    },
    error::{AppError, AppResult},
    state::AppState,
    store::StoreError,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/check_session", get(check_session))
        .route("/logout", delete(logout))
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<SignupRequest>, AppError>,
) -> AppResult<(StatusCode, CookieJar, Json<PublicUser>)> {
    let new_user = NewUser::new(
        payload.username,
        payload.password,
        payload.image_url,
        payload.bio,
    )
    .map_err(|e| {
        warn!(error = %e, "signup rejected");
        e
    })?;

    let user = match state.users.create(new_user).await {
        Ok(u) => u,
        Err(StoreError::UniqueViolation(_)) => {
            warn!("username already taken");
            return Err(AppError::Conflict("Username already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let jar = SessionKeys::from_ref(&state).start(jar, user.id)?;

    info!(user_id = user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, jar, Json(PublicUser::from(&user))))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<(CookieJar, Json<PublicUser>)> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        warn!("login without credentials");
        return Err(AppError::Unauthorized);
    };

    let user = match state.users.find_by_username(&username).await? {
        Some(u) if u.authenticate(&password) => u,
        Some(u) => {
            warn!(user_id = u.id, "login invalid password");
            return Err(AppError::Unauthorized);
        }
        None => {
            verify_unknown_user(&password);
            warn!("login unknown username");
            return Err(AppError::Unauthorized);
        }
    };

    let jar = SessionKeys::from_ref(&state).start(jar, user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok((jar, Json(PublicUser::from(&user))))
}

#[instrument(skip_all)]
pub async fn check_session(CurrentUser { user, .. }: CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser { user, claims }: CurrentUser,
    jar: CookieJar,
) -> AppResult<(StatusCode, CookieJar)> {
    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
        .map_err(|e| AppError::Internal(e.into()))?;
    state.sessions.revoke(claims.jti, expires_at).await?;

    info!(user_id = user.id, "user logged out");
    Ok((StatusCode::NO_CONTENT, SessionKeys::from_ref(&state).end(jar)))
}
