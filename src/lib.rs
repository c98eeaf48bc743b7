pub mod api_connection;
pub mod cli;
pub mod config;
pub mod ingredient_parser;
pub mod presenter;
pub mod result_renderer;
pub mod suggestion_orchestrator;
