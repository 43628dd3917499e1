use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::{SessionRepo, UserRepo};
use crate::auth::repo_types::{NewUser, User};
use crate::recipes::repo::RecipeRepo;
use crate::recipes::repo_types::{NewRecipe, Recipe};
use crate::store::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    recipes: Vec<Recipe>,
    revoked: HashMap<Uuid, OffsetDateTime>,
}

/// In-memory store mirroring the PostgreSQL schema constraints.
///
/// Intended for tests. Ids start at 1 like a fresh BIGSERIAL.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.tables.read().expect("lock").users.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.tables.read().expect("lock").recipes.len()
    }

    pub fn delete_user(&self, id: i64) {
        self.tables.write().expect("lock").users.retain(|u| u.id != id);
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().expect("lock");
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation(
                "duplicate key value violates unique constraint \"users_username_key\"".into(),
            ));
        }
        let id = t.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = user.into_user(id);
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let t = self.tables.read().expect("lock");
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().expect("lock");
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl RecipeRepo for MemoryStore {
    async fn create(&self, recipe: NewRecipe) -> StoreResult<Recipe> {
        let mut t = self.tables.write().expect("lock");
        if recipe.title.chars().count() > 100 {
            return Err(StoreError::Constraint(
                "value too long for type character varying(100)".into(),
            ));
        }
        if let Some(owner) = recipe.user_id {
            if !t.users.iter().any(|u| u.id == owner) {
                return Err(StoreError::Constraint(
                    "insert or update on table \"recipes\" violates foreign key constraint".into(),
                ));
            }
        }
        let id = t.recipes.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let recipe = recipe.into_recipe(id);
        t.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Recipe>> {
        let t = self.tables.read().expect("lock");
        Ok(t.recipes
            .iter()
            .filter(|r| r.user_id == Some(user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionRepo for MemoryStore {
    async fn revoke(&self, jti: Uuid, expires_at: OffsetDateTime) -> StoreResult<()> {
        let mut t = self.tables.write().expect("lock");
        let now = OffsetDateTime::now_utc();
        t.revoked.retain(|_, exp| *exp >= now);
        t.revoked.insert(jti, expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> StoreResult<bool> {
        Ok(self.tables.read().expect("lock").revoked.contains_key(&jti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser::new(Some(name.into()), Some("pw".into()), None, None).unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let store = MemoryStore::new();
        let first = UserRepo::create(&store, new_user("ada")).await.unwrap();
        assert_eq!(first.id, 1);

        let err = UserRepo::create(&store, new_user("ada")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn list_by_user_filters_on_owner() {
        let store = MemoryStore::new();
        let a = UserRepo::create(&store, new_user("a")).await.unwrap();
        let b = UserRepo::create(&store, new_user("b")).await.unwrap();
        let text = "x".repeat(60);
        for owner in [a.id, b.id, a.id] {
            let r = NewRecipe::new(Some("t".into()), Some(text.clone()), Some(5), Some(owner));
            RecipeRepo::create(&store, r.unwrap()).await.unwrap();
        }
        let mine = store.list_by_user(a.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.user_id == Some(a.id)));
    }

    #[tokio::test]
    async fn revoke_remembers_jti() {
        let store = MemoryStore::new();
        let jti = Uuid::new_v4();
        assert!(!store.is_revoked(jti).await.unwrap());
        store
            .revoke(jti, OffsetDateTime::now_utc() + time::Duration::minutes(5))
            .await
            .unwrap();
        assert!(store.is_revoked(jti).await.unwrap());
    }
}
