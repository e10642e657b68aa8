mod generate;
mod history;
mod refine;
mod settings;
mod test_api;

use autoanswer::generate::{DEFAULT_API_BASE, GenerationClient};
use autoanswer::{Settings, tabs};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Commands, HistoryAction, SettingsAction};
use crate::error::Result;
use crate::store::{FileStore, default_store_path};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Shared state for one command invocation.
pub struct CommandContext {
	pub store: FileStore,
	pub tab_id: u32,
	api_base: String,
}

impl CommandContext {
	pub async fn from_cli(cli: &Cli) -> Result<Self> {
		let store = FileStore::new(cli.store.clone().unwrap_or_else(default_store_path));
		let tab_id = match cli.tab {
			Some(id) => id,
			None => tabs::current_tab_id(&store).await?,
		};
		let api_base = cli.api_url.clone().unwrap_or_else(|| DEFAULT_API_BASE.to_string());

		debug!(target = "autoanswer", store = %store.path().display(), tab_id, api_base = %api_base, "command context");
		Ok(Self { store, tab_id, api_base })
	}

	/// Key from `explicit`, then `OPENAI_API_KEY`, then the store.
	pub async fn api_key(&self, explicit: Option<&str>) -> Result<String> {
		if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
			return Ok(key.to_string());
		}
		if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
			return Ok(key.trim().to_string());
		}
		let settings = Settings::load(&self.store).await?;
		Ok(settings.require_api_key()?.to_string())
	}

	pub fn client(&self, api_key: &str) -> GenerationClient {
		GenerationClient::with_base_url(api_key, self.api_base.as_str())
	}
}

/// What a command produced: structured data plus its text rendering.
pub struct CommandOutput {
	pub data: Value,
	pub text: String,
}

impl CommandOutput {
	pub fn new(data: Value, text: impl Into<String>) -> Self {
		Self {
			data,
			text: text.into(),
		}
	}
}

/// Dotted command name used in the result envelope.
pub fn command_name(command: &Commands) -> &'static str {
	match command {
		Commands::Generate(_) => "generate",
		Commands::Refine(_) => "refine",
		Commands::TestApi(_) => "test-api",
		Commands::Settings(args) => match args.action {
			SettingsAction::Show => "settings.show",
			SettingsAction::SetKey { .. } => "settings.set-key",
			SettingsAction::Set { .. } => "settings.set",
			SettingsAction::LoadBase { .. } => "settings.load-base",
			SettingsAction::ClearBase => "settings.clear-base",
			SettingsAction::Models => "settings.models",
		},
		Commands::History(args) => match args.action {
			HistoryAction::List { .. } => "history.list",
			HistoryAction::Search { .. } => "history.search",
			HistoryAction::Show { .. } => "history.show",
			HistoryAction::Delete { .. } => "history.delete",
			HistoryAction::Export { .. } => "history.export",
			HistoryAction::Clear => "history.clear",
			HistoryAction::Stats => "history.stats",
		},
	}
}

pub async fn dispatch(cli: Cli) -> Result<CommandOutput> {
	let ctx = CommandContext::from_cli(&cli).await?;

	match cli.command {
		Commands::Generate(args) => generate::execute(&ctx, args).await,
		Commands::Refine(args) => refine::execute(&ctx, args).await,
		Commands::TestApi(args) => test_api::execute(&ctx, args).await,
		Commands::Settings(args) => settings::execute(&ctx, args.action).await,
		Commands::History(args) => history::execute(&ctx, args.action).await,
	}
}
