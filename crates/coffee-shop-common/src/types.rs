//! Drink types exchanged between the API server and its clients

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Maximum length of a drink title
pub const MAX_TITLE_LEN: usize = 80;

/// One ingredient of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RecipePart {
    /// Ingredient name
    pub name: String,

    /// Display colour of the ingredient layer
    pub color: String,

    /// Relative amount of this ingredient
    pub parts: u32,
}

/// Recipe part without the ingredient name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ShortRecipePart {
    pub color: String,
    pub parts: u32,
}

/// A drink with its full recipe (the long representation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<RecipePart>,
}

/// A drink as shown to anonymous users (the short representation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortRecipePart>,
}

impl Drink {
    /// Public representation: colours and proportions only
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|part| ShortRecipePart {
                    color: part.color.clone(),
                    parts: part.parts,
                })
                .collect(),
        }
    }

    /// Detailed representation including ingredient names
    pub fn long(&self) -> Drink {
        self.clone()
    }
}

/// Recipe as submitted by clients: a single part or a list of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum RecipeInput {
    Many(Vec<RecipePart>),
    One(RecipePart),
}

impl RecipeInput {
    pub fn into_parts(self) -> Vec<RecipePart> {
        match self {
            RecipeInput::Many(parts) => parts,
            RecipeInput::One(part) => vec![part],
        }
    }
}

impl From<Vec<RecipePart>> for RecipeInput {
    fn from(parts: Vec<RecipePart>) -> Self {
        RecipeInput::Many(parts)
    }
}

/// Request body for creating or updating a drink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DrinkPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RecipeInput>,
}

/// Validation failures for a submitted drink
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrinkValidationError {
    #[error("Drink title is required")]
    MissingTitle,

    #[error("Drink title exceeds {MAX_TITLE_LEN} characters")]
    TitleTooLong,

    #[error("Drink recipe is required")]
    MissingRecipe,

    #[error("Drink recipe must contain at least one part")]
    EmptyRecipe,

    #[error("Recipe part {index} is invalid: {reason}")]
    InvalidPart { index: usize, reason: &'static str },

    #[error("Update contains no changes")]
    NoChanges,
}

/// A validated drink ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<RecipePart>,
}

/// Validated changes to an existing drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Vec<RecipePart>>,
}

impl DrinkPayload {
    pub fn new(title: impl Into<String>, recipe: Vec<RecipePart>) -> Self {
        Self {
            title: Some(title.into()),
            recipe: Some(RecipeInput::Many(recipe)),
        }
    }

    /// Validate a creation request. Both title and recipe are required.
    pub fn validate_new(self) -> Result<NewDrink, DrinkValidationError> {
        let title = validate_title(self.title.ok_or(DrinkValidationError::MissingTitle)?)?;
        let recipe = validate_recipe(self.recipe.ok_or(DrinkValidationError::MissingRecipe)?)?;
        Ok(NewDrink { title, recipe })
    }

    /// Validate an update request. Absent fields are left unchanged.
    pub fn validate_update(self) -> Result<DrinkChanges, DrinkValidationError> {
        if self.title.is_none() && self.recipe.is_none() {
            return Err(DrinkValidationError::NoChanges);
        }

        let title = self.title.map(validate_title).transpose()?;
        let recipe = self.recipe.map(validate_recipe).transpose()?;
        Ok(DrinkChanges { title, recipe })
    }
}

fn validate_title(title: String) -> Result<String, DrinkValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DrinkValidationError::MissingTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DrinkValidationError::TitleTooLong);
    }
    Ok(title.to_string())
}

fn validate_recipe(recipe: RecipeInput) -> Result<Vec<RecipePart>, DrinkValidationError> {
    let parts = recipe.into_parts();
    if parts.is_empty() {
        return Err(DrinkValidationError::EmptyRecipe);
    }

    for (index, part) in parts.iter().enumerate() {
        if part.name.trim().is_empty() {
            return Err(DrinkValidationError::InvalidPart {
                index,
                reason: "name must not be empty",
            });
        }
        if part.color.trim().is_empty() {
            return Err(DrinkValidationError::InvalidPart {
                index,
                reason: "color must not be empty",
            });
        }
        if part.parts == 0 {
            return Err(DrinkValidationError::InvalidPart {
                index,
                reason: "parts must be at least 1",
            });
        }
    }

    Ok(parts)
}

/// `GET /drinks` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DrinkListResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// Response carrying long drink representations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DrinkDetailResponse {
    pub success: bool,
    pub drinks: Vec<Drink>,
}

/// `DELETE /drinks/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DeleteResponse {
    pub success: bool,
    /// Id of the deleted drink
    pub delete: i64,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,

    /// HTTP status code
    pub error: u16,

    /// Either a short message or an object with `code` and `description`
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub message: serde_json::Value,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn water() -> RecipePart {
        RecipePart {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }
    }

    #[test]
    fn test_short_drops_ingredient_names() {
        let drink = Drink {
            id: 1,
            title: "water".to_string(),
            recipe: vec![water()],
        };

        let short = serde_json::to_value(drink.short()).unwrap();
        assert_eq!(
            short,
            json!({"id": 1, "title": "water", "recipe": [{"color": "blue", "parts": 1}]})
        );
        assert_eq!(drink.long(), drink);
    }

    #[test]
    fn test_recipe_accepts_single_object_or_list() {
        let one: DrinkPayload = serde_json::from_value(json!({
            "title": "Water",
            "recipe": {"name": "water", "color": "blue", "parts": 1}
        }))
        .unwrap();
        let many: DrinkPayload = serde_json::from_value(json!({
            "title": "Water",
            "recipe": [{"name": "water", "color": "blue", "parts": 1}]
        }))
        .unwrap();

        assert_eq!(one.validate_new().unwrap(), many.validate_new().unwrap());
    }

    #[test]
    fn test_validate_new_requires_title_and_recipe() {
        let missing_title = DrinkPayload {
            title: None,
            recipe: Some(vec![water()].into()),
        };
        assert_eq!(
            missing_title.validate_new(),
            Err(DrinkValidationError::MissingTitle)
        );

        let missing_recipe = DrinkPayload {
            title: Some("Water".to_string()),
            recipe: None,
        };
        assert_eq!(
            missing_recipe.validate_new(),
            Err(DrinkValidationError::MissingRecipe)
        );

        let blank_title = DrinkPayload::new("   ", vec![water()]);
        assert_eq!(
            blank_title.validate_new(),
            Err(DrinkValidationError::MissingTitle)
        );
    }

    #[test]
    fn test_validate_new_trims_title() {
        let drink = DrinkPayload::new("  Flat White ", vec![water()])
            .validate_new()
            .unwrap();
        assert_eq!(drink.title, "Flat White");
    }

    #[test]
    fn test_validate_rejects_bad_recipes() {
        assert_eq!(
            DrinkPayload::new("Water", vec![]).validate_new(),
            Err(DrinkValidationError::EmptyRecipe)
        );

        let mut zero = water();
        zero.parts = 0;
        assert!(matches!(
            DrinkPayload::new("Water", vec![water(), zero]).validate_new(),
            Err(DrinkValidationError::InvalidPart { index: 1, .. })
        ));

        let long_title = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            DrinkPayload::new(long_title, vec![water()]).validate_new(),
            Err(DrinkValidationError::TitleTooLong)
        );
    }

    #[test]
    fn test_validate_update_is_partial() {
        let changes = DrinkPayload {
            title: Some("Iced Water".to_string()),
            recipe: None,
        }
        .validate_update()
        .unwrap();
        assert_eq!(changes.title.as_deref(), Some("Iced Water"));
        assert!(changes.recipe.is_none());

        assert_eq!(
            DrinkPayload::default().validate_update(),
            Err(DrinkValidationError::NoChanges)
        );
    }
}
