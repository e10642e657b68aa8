#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for aa.
#[derive(Parser, Debug)]
#[command(name = "aa")]
#[command(about = "Generate support answers from captured text, and manage autoanswer settings and history")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default) or json
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Storage file (default: $XDG_CONFIG_HOME/autoanswer/storage.json)
	#[arg(long, global = true, value_name = "PATH")]
	pub store: Option<PathBuf>,

	/// Workspace tab to use instead of the stored current tab
	#[arg(long, global = true, value_name = "ID", value_parser = clap::value_parser!(u32).range(1..))]
	pub tab: Option<u32>,

	/// Base URL of the OpenAI-compatible API
	#[arg(long, global = true, value_name = "URL")]
	pub api_url: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Generate an answer for a question (reads stdin when TEXT is omitted).
	Generate(GenerateArgs),
	/// Rewrite an answer according to correction instructions.
	Refine(RefineArgs),
	/// Check that an API key is accepted by the service.
	TestApi(TestApiArgs),
	/// Show and change settings.
	Settings(SettingsArgs),
	/// Browse and manage the answer history of the current tab.
	History(HistoryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
	/// Question text; stdin is read when omitted.
	#[arg(value_name = "TEXT")]
	pub text: Option<String>,

	/// Model for this request only.
	#[arg(long, value_name = "MODEL")]
	pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RefineArgs {
	/// How to change the answer.
	#[arg(short, long, value_name = "TEXT")]
	pub instructions: String,

	/// Answer to refine (default: the last generated answer).
	#[arg(value_name = "ANSWER")]
	pub answer: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TestApiArgs {
	/// Key to test instead of the configured one.
	#[arg(long, value_name = "KEY")]
	pub api_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
	#[command(subcommand)]
	pub action: SettingsAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
	/// Show the current settings (the API key is masked).
	Show,
	/// Store the API key.
	SetKey {
		#[arg(value_name = "KEY")]
		key: String,
	},
	/// Change prompt settings of the current tab.
	Set {
		#[arg(long, value_name = "MODEL")]
		model: Option<String>,
		/// Instructions the answer must follow (empty string clears).
		#[arg(long, value_name = "TEXT")]
		positive: Option<String>,
		/// Things the answer must avoid (empty string clears).
		#[arg(long, value_name = "TEXT")]
		negative: Option<String>,
	},
	/// Load a text file as the knowledge base.
	LoadBase {
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
	/// Remove the knowledge base.
	ClearBase,
	/// List supported models.
	Models,
}

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
	#[command(subcommand)]
	pub action: HistoryAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
	/// List the most recent days.
	List {
		#[arg(long, value_name = "N", default_value_t = autoanswer::history::RECENT_DAYS)]
		days: usize,
	},
	/// Find entries whose question or answer contains QUERY.
	Search {
		#[arg(value_name = "QUERY")]
		query: String,
	},
	/// Print one entry in full.
	Show {
		/// Day as YYYY-MM-DD
		#[arg(value_name = "DATE")]
		date: String,
		#[arg(value_name = "INDEX")]
		index: usize,
	},
	/// Delete one entry.
	Delete {
		/// Day as YYYY-MM-DD
		#[arg(value_name = "DATE")]
		date: String,
		#[arg(value_name = "INDEX")]
		index: usize,
	},
	/// Write the whole history as JSON.
	Export {
		#[arg(short, long, value_name = "FILE")]
		output: Option<PathBuf>,
	},
	/// Delete the whole history of the tab.
	Clear,
	/// Entry counts for today, the last week, and overall.
	Stats,
}
