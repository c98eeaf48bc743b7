use anyhow::{Context, Result};
use recipe_suggest::api_connection::HttpSuggestionClient;
use recipe_suggest::cli::{parse_args, Cli};
use recipe_suggest::config::SuggestConfig;
use recipe_suggest::presenter::{Presenter, TextPresenter};
use recipe_suggest::result_renderer::render;
use recipe_suggest::suggestion_orchestrator::SuggestionOrchestrator;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "recipe_suggest=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Submits one line of input, showing the working indicator while the request is in flight.
async fn run_submission(orchestrator: &SuggestionOrchestrator, raw_text: &str, use_backtracking: bool) -> Result<()> {
    let mut states = orchestrator.subscribe();
    let mut presenter = TextPresenter::stdout();

    let submission = orchestrator.submit(raw_text, use_backtracking);
    tokio::pin!(submission);
    loop {
        tokio::select! {
            submitted = &mut submission => {
                if let Err(busy) = submitted {
                    error!("{}", busy);
                    return Ok(());
                }
                let model = render(&orchestrator.state());
                return presenter.present(&model).context("Failed to write suggestions");
            }
            Ok(()) = states.changed() => {
                let model = render(&states.borrow_and_update());
                if model.working {
                    presenter.present(&model).context("Failed to write progress")?;
                }
            }
        }
    }
}

async fn run_interactive(orchestrator: &SuggestionOrchestrator, use_backtracking: bool) -> Result<()> {
    println!("Enter comma-separated ingredients, one list per line (Ctrl-D to quit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        run_submission(orchestrator, &line, use_backtracking).await?;
        println!();
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = SuggestConfig::load()
        .context("Failed to load configuration")?
        .with_overrides(cli.server_url.clone(), cli.timeout_secs)
        .context("Invalid command-line overrides")?;
    info!(server_url = %config.server_url, timeout_secs = config.request_timeout_secs, "configuration loaded");

    let client = HttpSuggestionClient::new(&config.server_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let orchestrator = SuggestionOrchestrator::with_timeout(Arc::new(client), config.request_timeout());

    match cli.one_shot_input().await? {
        Some(raw_text) => run_submission(&orchestrator, &raw_text, cli.backtracking).await,
        None => run_interactive(&orchestrator, cli.backtracking).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli_args = parse_args();
    run(cli_args).await
}
