use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Request body for signup. Fields are optional so that a missing field is
/// reported as a validation error rather than a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            image_url: user.image_url.clone(),
            bio: user.bio.clone(),
        }
    }
}
