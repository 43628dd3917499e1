use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a user; a taken username fails with `StoreError::UniqueViolation`.
    async fn create(&self, user: NewUser) -> StoreResult<User>;
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}

/// Logged-out session tokens, remembered until they would have expired anyway.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn revoke(&self, jti: Uuid, expires_at: OffsetDateTime) -> StoreResult<()>;
    async fn is_revoked(&self, jti: Uuid) -> StoreResult<bool>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut tx = self.db.begin().await?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, image_url, bio)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id
            "#,
        )
        .bind(&user.username)
        .bind(user.digest())
        .bind(&user.image_url)
        .bind(&user.bio)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user.into_user(id))
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password_hash, image_url, bio
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password_hash, image_url, bio
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl SessionRepo for PgStore {
    async fn revoke(&self, jti: Uuid, expires_at: OffsetDateTime) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM revoked_sessions WHERE expires_at < now()")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO revoked_sessions (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> StoreResult<bool> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_sessions WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.db)
                .await?;
        Ok(revoked)
    }
}
