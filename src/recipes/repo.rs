use async_trait::async_trait;

use crate::recipes::repo_types::{NewRecipe, Recipe};
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait RecipeRepo: Send + Sync {
    async fn create(&self, recipe: NewRecipe) -> StoreResult<Recipe>;
    /// Recipes owned by `user_id`, oldest first.
    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Recipe>>;
}

#[async_trait]
impl RecipeRepo for PgStore {
    async fn create(&self, recipe: NewRecipe) -> StoreResult<Recipe> {
        let mut tx = self.db.begin().await?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (title, instructions, minutes_to_complete, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING recipe_id
            "#,
        )
        .bind(&recipe.title)
        .bind(&recipe.instructions)
        .bind(recipe.minutes_to_complete)
        .bind(recipe.user_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(recipe.into_recipe(id))
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT recipe_id, title, instructions, minutes_to_complete, user_id
            FROM recipes
            WHERE user_id = $1
            ORDER BY recipe_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
