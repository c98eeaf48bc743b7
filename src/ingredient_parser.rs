use serde::Serialize;
use std::ops::Deref;
use thiserror::Error;

/// The user gave no usable ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no ingredients were entered")]
pub struct EmptyInputError;

/// Ingredients in the order the user typed them: trimmed, lowercase, never empty.
/// Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IngredientList(Vec<String>);

impl IngredientList {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for IngredientList {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

/// Splits comma-separated free text into an `IngredientList`.
pub fn normalize(raw_text: &str) -> Result<IngredientList, EmptyInputError> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return Err(EmptyInputError);
    }

    let ingredients: Vec<String> = trimmed
        .split(',')
        .map(|piece| piece.trim().to_lowercase())
        .filter(|piece| !piece.is_empty())
        .collect();

    if ingredients.is_empty() {
        return Err(EmptyInputError);
    }
    Ok(IngredientList(ingredients))
}
