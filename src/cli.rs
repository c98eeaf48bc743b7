use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tokio::fs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Suggest recipes from the ingredients you have", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["ingredients", "ingredients_file", "interactive"])))]
pub struct Cli {
    /// Comma-separated ingredients, e.g. "tomato, onion, garlic"
    #[arg(short, long)]
    pub ingredients: Option<String>,

    /// Path to a text file holding the comma-separated ingredients
    #[arg(short = 'f', long)]
    pub ingredients_file: Option<String>,

    /// Read one ingredient list per line from stdin
    #[arg(long)]
    pub interactive: bool,

    /// Ask the service for a recipe combination using all ingredients
    #[arg(short, long)]
    pub backtracking: bool,

    /// Base URL of the suggestion service (overrides RECIPE_SUGGEST_SERVER_URL)
    #[arg(long)]
    pub server_url: Option<String>,

    /// Request timeout in seconds (overrides RECIPE_SUGGEST_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

impl Cli {
    /// The raw ingredient text for one-shot mode, if any.
    pub async fn one_shot_input(&self) -> Result<Option<String>> {
        if let Some(text) = &self.ingredients {
            return Ok(Some(text.clone()));
        }
        if let Some(path) = &self.ingredients_file {
            // Line breaks separate ingredients as well as commas do.
            let content = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read ingredients file '{}'", path))?;
            return Ok(Some(content.lines().collect::<Vec<_>>().join(",")));
        }
        Ok(None)
    }
}
