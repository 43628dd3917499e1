use sqlx::FromRow;

use crate::error::AppError;

pub const MIN_INSTRUCTIONS_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Recipe {
    #[sqlx(rename = "recipe_id")]
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
    pub user_id: Option<i64>,
}

/// Validated recipe waiting to be inserted.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
    pub user_id: Option<i64>,
}

impl NewRecipe {
    pub fn new(
        title: Option<String>,
        instructions: Option<String>,
        minutes_to_complete: Option<i32>,
        user_id: Option<i64>,
    ) -> Result<Self, AppError> {
        let title = title.ok_or_else(|| required("title"))?;
        let instructions = instructions.ok_or_else(|| required("instructions"))?;
        let instructions = validate_instructions(instructions)?;
        let minutes_to_complete =
            minutes_to_complete.ok_or_else(|| required("minutes_to_complete"))?;
        Ok(Self {
            title,
            instructions,
            minutes_to_complete,
            user_id,
        })
    }

    pub fn into_recipe(self, id: i64) -> Recipe {
        Recipe {
            id,
            title: self.title,
            instructions: self.instructions,
            minutes_to_complete: self.minutes_to_complete,
            user_id: self.user_id,
        }
    }
}

/// Counts characters, not bytes.
pub fn validate_instructions(instructions: String) -> Result<String, AppError> {
    if instructions.chars().count() < MIN_INSTRUCTIONS_LEN {
        return Err(AppError::Validation(format!(
            "Instructions must be at least {} characters long",
            MIN_INSTRUCTIONS_LEN
        )));
    }
    Ok(instructions)
}

fn required(field: &str) -> AppError {
    AppError::Validation(format!("{} is required", field))
}
