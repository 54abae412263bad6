#![warn(missing_docs)]
#![warn(clippy::all)]

//! llamainsight - AI summaries of GitHub repositories and uploaded documents
//!
//! This library fetches GitHub repository metadata or extracts text from an
//! uploaded PDF, Markdown or plain text file, then asks a hosted Gemini model
//! for a structured analysis: summary, features, technologies, use cases and
//! insights.
//!
//! ## Features
//! - Repository metadata from the GitHub REST API (info, contributors, languages, README)
//! - PDF text extraction through an ordered fallback chain: hosted reader,
//!   Gemini vision transcription, local page-by-page parsing
//! - Heuristic validation that rejects garbled extraction output
//! - Deterministic statistical analysis when the model reply is unusable
//! - Chart data for stars/forks, contributors and language shares
//! - An axum HTTP server and a command-line client
//!
//! ## Usage
//! ```rust,ignore
//! use llamainsight::{api::InsightService, Config};
//!
//! async fn example() -> llamainsight::Result<()> {
//!     let service = InsightService::new(Config::load()?)?;
//!     let response = service.analyze_repository("https://github.com/rust-lang/cargo").await?;
//!     println!("{}", response.analysis.summary);
//!     Ok(())
//! }
//! ```

/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
/// Logging configuration and utilities
pub mod logging;
/// Heuristics that decide whether extracted text is usable
pub mod validation;
/// Text extraction strategies for uploaded documents
pub mod extractors;
/// Gemini client, document statistics and analysis
pub mod agents;
/// Prompt templates
pub mod prompts;
/// GitHub repository metadata
pub mod github;
/// Chart data derived from repository metadata
pub mod charts;
/// Request/response types and the analysis service
pub mod api;
/// HTTP server
pub mod server;

pub use agents::AnalysisResult;
pub use config::Config;
pub use error::{InsightError, Result};
pub use extractors::{ExtractionMethod, UploadedDocument};
pub use github::RepositoryMetadata;
