//! CognOS - plain-language command assistant for the shell.
//!
//! Each input line is either run as-is through the shell or interpreted by a
//! language model into a proposed command. Proposals pass through a safety
//! policy: read-only commands run immediately, deny-listed ones are refused,
//! and everything else is explained and confirmed before it runs.
//!
//! # Architecture
//!
//! - [`classifier`] - Shell command or natural-language request?
//! - [`agent`] - Prompts the model and runs the tool calls it asks for
//! - [`response`] - Structured proposals and the model-output parser
//! - [`tools`] - Tool registry and the built-in tools
//! - [`safety`] - Auto-approve, confirm or block a command
//! - [`explain`] - One-sentence description of a pending command
//! - [`confirm`] - The yes/no prompt
//! - [`dispatch`] - Ties the above together for one input line
//! - [`executor`] - Runs commands through the host shell
//! - [`model`] - Language-model backends
//! - [`http_client`] - HTTP client abstraction
//! - [`providers`] - Host context (working directory, user, OS)
//! - [`config`] - Configuration (API keys, shell, tools)
//!
//! # Example
//!
//! ```no_run
//! use cognos::config::Config;
//! use cognos::dispatch::Dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let dispatcher = Dispatcher::from_config(&config)?;
//!
//!     let result = dispatcher.handle_line("show me the files here").await?;
//!     std::process::exit(result.exit_code);
//! }
//! ```

pub mod agent;
pub mod classifier;
pub mod config;
pub mod confirm;
pub mod dispatch;
pub mod executor;
pub mod explain;
pub mod http_client;
pub mod model;
pub mod providers;
pub mod response;
pub mod safety;
pub mod tools;
