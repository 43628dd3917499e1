//! Persistence plumbing shared by the domain repositories.
//!
//! Each domain module declares its own repository trait (`UserRepo`,
//! `RecipeRepo`, `SessionRepo`) and implements it for [`PgStore`]. Tests use
//! the in-memory store instead.

#[cfg(test)]
pub mod memory;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    UniqueViolation(String),

    #[error("{0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                let code = code.as_ref();
                if code == "23505" {
                    return StoreError::UniqueViolation(db_err.message().to_string());
                }
                // class 22 (data exception) and 23 (integrity constraint)
                if code.starts_with("22") || code.starts_with("23") {
                    return StoreError::Constraint(db_err.message().to_string());
                }
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// PostgreSQL-backed store. Cheap to clone; wraps the pool.
#[derive(Clone)]
pub struct PgStore {
    pub db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}
