use sqlx::FromRow;

use crate::auth::password::PasswordDigest;
use crate::error::AppError;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    #[sqlx(rename = "user_id")]
    pub id: i64,
    pub username: String,
    password_hash: PasswordDigest,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl User {
    pub fn authenticate(&self, plain: &str) -> bool {
        self.password_hash.verify(plain)
    }
}

/// A user that has passed validation but has no id yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    password_hash: PasswordDigest,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl NewUser {
    /// Validates presence of username and password, then hashes the password.
    pub fn new(
        username: Option<String>,
        password: Option<String>,
        image_url: Option<String>,
        bio: Option<String>,
    ) -> Result<Self, AppError> {
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => {
                return Err(AppError::Validation(
                    "Username and password are required".into(),
                ))
            }
        };
        let mut user = Self {
            username,
            password_hash: PasswordDigest::default(),
            image_url,
            bio,
        };
        user.set_password(&password)?;
        Ok(user)
    }

    /// Replace the stored hash with a fresh salted hash of `plain`.
    pub fn set_password(&mut self, plain: &str) -> anyhow::Result<()> {
        self.password_hash = PasswordDigest::from_plaintext(plain)?;
        Ok(())
    }

    pub(crate) fn digest(&self) -> &PasswordDigest {
        &self.password_hash
    }

    /// Attach the id the store generated.
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            image_url: self.image_url,
            bio: self.bio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_requires_username_and_password() {
        for (u, p) in [
            (None, Some("pw".to_string())),
            (Some("ada".to_string()), None),
            (Some(String::new()), Some("pw".to_string())),
            (Some("ada".to_string()), Some(String::new())),
        ] {
            let err = NewUser::new(u, p, None, None).unwrap_err();
            assert_eq!(err.to_string(), "Username and password are required");
        }
    }

    #[test]
    fn new_user_hashes_password() {
        let new = NewUser::new(Some("ada".into()), Some("secret".into()), None, None).unwrap();
        let user = new.into_user(1);
        assert!(user.authenticate("secret"));
        assert!(!user.authenticate("Secret"));
        assert!(!format!("{:?}", user).contains("secret"));
    }

    #[test]
    fn set_password_replaces_previous_hash() {
        let mut new = NewUser::new(Some("ada".into()), Some("old".into()), None, None).unwrap();
        new.set_password("new").unwrap();
        let user = new.into_user(1);
        assert!(user.authenticate("new"));
        assert!(!user.authenticate("old"));
    }
}
