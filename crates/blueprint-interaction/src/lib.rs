//! Clients for the external services Blueprint talks to: the Gemini
//! generative API and the PlantUML diagram server.

pub mod diagram_fetcher;
pub mod gemini_api_client;

pub use diagram_fetcher::DiagramFetcher;
pub use gemini_api_client::GeminiApiClient;
