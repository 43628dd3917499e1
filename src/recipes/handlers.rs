use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::CurrentUser,
    error::{AppError, AppResult},
    state::AppState,
};

use super::dto::{CreateRecipeRequest, RecipeResponse};
use super::repo_types::NewRecipe;

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn list_recipes(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    let recipes = state.recipes.list_by_user(user.id).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<CreateRecipeRequest>, AppError>,
) -> AppResult<(StatusCode, Json<RecipeResponse>)> {
    let new_recipe = NewRecipe::new(
        body.title,
        body.instructions,
        body.minutes_to_complete,
        Some(user.id),
    )
    .map_err(|e| {
        warn!(error = %e, "recipe rejected");
        e
    })?;

    let recipe = state.recipes.create(new_recipe).await?;

    info!(recipe_id = recipe.id, "recipe created");
    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}
