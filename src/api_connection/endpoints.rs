use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::ingredient_parser::IngredientList;

/// Path of the suggestion endpoint, relative to the service base URL.
pub const SUGGEST_PATH: &str = "/api/suggest";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SuggestionRequest {
    pub ingredients: IngredientList,
    pub use_backtracking: bool,
}

impl SuggestionRequest {
    pub fn new(ingredients: IngredientList, use_backtracking: bool) -> Self {
        Self {
            ingredients,
            use_backtracking,
        }
    }
}

/// Which search the service ran, reported in the response's `type` field.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SuggestionStrategy {
    Greedy,
    BacktrackingCombo,
    Unknown,
}

impl From<String> for SuggestionStrategy {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "greedy" => SuggestionStrategy::Greedy,
            "backtracking_combo" => SuggestionStrategy::BacktrackingCombo,
            _ => SuggestionStrategy::Unknown,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Suggestion {
    pub name: String,
    #[serde(rename = "matching")]
    pub matching_count: u32,
    #[serde(rename = "total")]
    pub total_count: u32,
    // Backtracking combinations come back without a score.
    #[serde(default)]
    pub enhanced_score: f64,
    pub gaps: Vec<String>,
    pub substitutions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// A suggestion claims more matching ingredients than the recipe has.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("suggestion '{name}' matches {matching} of only {total} ingredients")]
pub struct InconsistentCounts {
    pub name: String,
    pub matching: u32,
    pub total: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
    pub complementary_ingredients: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<SuggestionStrategy>,
}

impl SuggestionResponse {
    /// Checks the invariants serde cannot express on its own.
    pub fn validate(&self) -> Result<(), InconsistentCounts> {
        match self
            .suggestions
            .iter()
            .find(|suggestion| suggestion.total_count < suggestion.matching_count)
        {
            Some(suggestion) => Err(InconsistentCounts {
                name: suggestion.name.clone(),
                matching: suggestion.matching_count,
                total: suggestion.total_count,
            }),
            None => Ok(()),
        }
    }
}
