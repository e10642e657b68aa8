//! Result envelope and printing for CLI commands.
//!
//! With `--format json` every command prints one envelope on stdout:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "ok": true,
//!   "command": "generate",
//!   "data": { ... },
//!   "timings": { "durationMs": 812 }
//! }
//! ```
//!
//! Failures carry `"ok": false` and an `error` object instead of `data`.
//! Text format prints the command's human-readable rendering instead.

#[cfg(test)]
mod tests;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON result envelope
	Json,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Text => write!(f, "text"),
			OutputFormat::Json => write!(f, "json"),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,

	pub ok: bool,

	/// Command name (e.g., "generate", "history.search")
	pub command: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Invalid input provided
	InvalidInput,
	/// API key missing, malformed, or rejected
	AuthError,
	/// The generation service failed or returned nothing
	RemoteError,
	/// Requested history entry does not exist
	NotFound,
	/// File I/O error
	IoError,
	/// Unknown/internal error
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::AuthError => write!(f, "AUTH_ERROR"),
			ErrorCode::RemoteError => write!(f, "REMOTE_ERROR"),
			ErrorCode::NotFound => write!(f, "NOT_FOUND"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Timings {
			duration_ms: duration.as_millis() as u64,
		}
	}
}

/// Builder for constructing command results
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self::started_at(command, Instant::now())
	}

	/// Builder whose timing starts at `start` rather than now.
	pub fn started_at(command: impl Into<String>, start: Instant) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: start,
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok: self.error.is_none() && self.data.is_some(),
			command: self.command,
			data: self.data,
			error: self.error,
			timings: Some(Timings::from(self.start_time.elapsed())),
		}
	}
}

/// Prints a result. `text` is the human rendering used for successful
/// results in text format; errors always go to stderr in text format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat, text: &str) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			if let Some(error) = &result.error {
				eprintln!("{} {}", "error:".red().bold(), error.message);
				return;
			}
			let mut stdout = io::stdout().lock();
			let _ = writeln!(stdout, "{}", text.trim_end_matches('\n'));
		}
	}
}
