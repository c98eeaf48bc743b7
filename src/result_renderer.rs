//! Turns a `RequestState` into a `DisplayModel`.
//!
//! Rendering is pure: the same state always gives the same model, and every
//! state has a rendering. What the model looks like on screen is the
//! presenter's business.

use reqwest::Url;

use crate::api_connection::{Suggestion, SuggestionResponse, SuggestionStrategy};
use crate::suggestion_orchestrator::RequestState;

pub const TRIGGER_LABEL: &str = "Get Recipe Suggestions";
pub const TRIGGER_WORKING_LABEL: &str = "Generating...";
pub const ERROR_MESSAGE: &str = "An error occurred. Please try again.";
pub const NO_RESULTS_MESSAGE: &str = "No recipes found with your ingredients. Try adding more!";
pub const ALL_AVAILABLE_NOTE: &str = "All ingredients available!";
pub const COMPLEMENTS_NOTE: &str =
    "These ingredients pair well with what you have. Consider adding them for more options!";

const PLACEHOLDER_IMAGE_BASE: &str = "https://via.placeholder.com/300x200/3498db/white";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerAffordance {
    pub enabled: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(&'static str),
    NoResults(&'static str),
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Error(message) | Notice::NoResults(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    AllAvailable,
    Missing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCard {
    pub name: String,
    pub image_url: Option<String>,
    pub matching_count: u32,
    pub total_count: u32,
    pub score: String,
    pub availability: Availability,
    pub substitutions: Option<String>,
    pub instructions: Option<String>,
}

impl RecipeCard {
    pub fn match_line(&self) -> String {
        format!(
            "Matching: {}/{} ingredients (Score: {})",
            self.matching_count, self.total_count, self.score
        )
    }

    /// The card as plain text, one line per field.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = vec![self.name.clone(), self.match_line()];
        match &self.availability {
            Availability::AllAvailable => lines.push(ALL_AVAILABLE_NOTE.to_string()),
            Availability::Missing(gaps) => lines.push(format!("Missing: {}", gaps)),
        }
        if let Some(substitutions) = &self.substitutions {
            lines.push(format!("Suggestions: {}", substitutions));
        }
        if let Some(instructions) = &self.instructions {
            lines.push(instructions.clone());
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplementsSection {
    pub tags: Vec<String>,
    pub note: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub working: bool,
    pub trigger: TriggerAffordance,
    pub notice: Option<Notice>,
    pub strategy: Option<&'static str>,
    pub cards: Vec<RecipeCard>,
    pub complements: Option<ComplementsSection>,
}

impl DisplayModel {
    fn empty() -> Self {
        Self {
            working: false,
            trigger: TriggerAffordance {
                enabled: true,
                label: TRIGGER_LABEL,
            },
            notice: None,
            strategy: None,
            cards: Vec::new(),
            complements: None,
        }
    }
}

pub fn render(state: &RequestState) -> DisplayModel {
    match state {
        RequestState::Idle => DisplayModel::empty(),
        RequestState::Loading => DisplayModel {
            working: true,
            trigger: TriggerAffordance {
                enabled: false,
                label: TRIGGER_WORKING_LABEL,
            },
            ..DisplayModel::empty()
        },
        RequestState::Failed(_) => DisplayModel {
            notice: Some(Notice::Error(ERROR_MESSAGE)),
            ..DisplayModel::empty()
        },
        RequestState::Success(response) => render_response(response),
    }
}

fn render_response(response: &SuggestionResponse) -> DisplayModel {
    let mut model = DisplayModel {
        strategy: response.strategy.map(strategy_label),
        complements: render_complements(&response.complementary_ingredients),
        ..DisplayModel::empty()
    };
    if response.suggestions.is_empty() {
        model.notice = Some(Notice::NoResults(NO_RESULTS_MESSAGE));
    } else {
        model.cards = response.suggestions.iter().map(render_card).collect();
    }
    model
}

fn render_card(suggestion: &Suggestion) -> RecipeCard {
    let availability = if suggestion.gaps.is_empty() {
        Availability::AllAvailable
    } else {
        Availability::Missing(suggestion.gaps.join(", "))
    };
    let substitutions = if suggestion.substitutions.is_empty() {
        None
    } else {
        Some(
            suggestion
                .substitutions
                .iter()
                .map(|(missing, substitute)| format!("{} → {}", missing, substitute))
                .collect::<Vec<_>>()
                .join(", "),
        )
    };

    RecipeCard {
        name: suggestion.name.clone(),
        image_url: placeholder_image_url(&suggestion.name),
        matching_count: suggestion.matching_count,
        total_count: suggestion.total_count,
        score: format_score(suggestion.enhanced_score),
        availability,
        substitutions,
        instructions: suggestion
            .instructions
            .as_ref()
            .filter(|text| !text.trim().is_empty())
            .cloned(),
    }
}

fn render_complements(complements: &[String]) -> Option<ComplementsSection> {
    if complements.is_empty() {
        return None;
    }
    Some(ComplementsSection {
        tags: complements.to_vec(),
        note: COMPLEMENTS_NOTE,
    })
}

fn strategy_label(strategy: SuggestionStrategy) -> &'static str {
    match strategy {
        SuggestionStrategy::Greedy => "Best individual matches",
        SuggestionStrategy::BacktrackingCombo => "Recipe combination using all your ingredients",
        SuggestionStrategy::Unknown => "Suggestions",
    }
}

/// One decimal place, halves rounded away from zero (7.25 -> "7.3").
fn format_score(score: f64) -> String {
    let rounded = (score * 10.0).round() / 10.0;
    format!("{:.1}", rounded)
}

fn placeholder_image_url(name: &str) -> Option<String> {
    Url::parse_with_params(PLACEHOLDER_IMAGE_BASE, &[("text", name)])
        .ok()
        .map(String::from)
}
