//! User settings persisted in the key-value store.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::generate::PromptConfig;
use crate::store::{KeyValueStore, StoreMap, get_value, set_value};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Knowledge-base content past this many chars is dropped from prompts.
pub const KNOWLEDGE_BASE_LIMIT: usize = 20_000;

/// Storage keys shared by every extension context and the CLI.
pub mod keys {
	pub const API_KEY: &str = "apiKey";
	pub const GPT_MODEL: &str = "gptModel";
	pub const POSITIVE_PROMPT: &str = "positivePrompt";
	pub const NEGATIVE_PROMPT: &str = "negativePrompt";
	pub const BASE_CONTENT: &str = "baseContent";
	pub const BASE_FILE_NAME: &str = "baseFileName";
	pub const LAST_SELECTED_TEXT: &str = "lastSelectedText";
	pub const LAST_GENERATED_ANSWER: &str = "lastGeneratedAnswer";

	pub const ALL_SETTINGS: [&str; 6] = [API_KEY, GPT_MODEL, POSITIVE_PROMPT, NEGATIVE_PROMPT, BASE_CONTENT, BASE_FILE_NAME];
}

/// A model offered in the settings picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
	pub id: &'static str,
	pub description: &'static str,
}

pub const MODELS: &[ModelInfo] = &[
	ModelInfo {
		id: "gpt-3.5-turbo",
		description: "Fast and cheap, fine for simple questions and testing.",
	},
	ModelInfo {
		id: "gpt-4o-mini",
		description: "Best price/quality balance for everyday answers.",
	},
	ModelInfo {
		id: "gpt-4o",
		description: "Strong general model for complex questions and analysis.",
	},
	ModelInfo {
		id: "gpt-4-turbo",
		description: "Highest accuracy, for critical and difficult tasks.",
	},
];

pub fn model_info(id: &str) -> Option<&'static ModelInfo> {
	MODELS.iter().find(|m| m.id == id)
}

/// Checks the shape of an OpenAI API key.
pub fn validate_api_key(key: &str) -> Result<()> {
	let key = key.trim();
	if key.is_empty() {
		return Err(Error::InvalidApiKey("key is empty"));
	}
	if !key.starts_with("sk-") {
		return Err(Error::InvalidApiKey("key must start with \"sk-\""));
	}
	Ok(())
}

/// Flat settings document. Every field maps to one storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_key: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gpt_model: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub positive_prompt: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub negative_prompt: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub base_content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub base_file_name: Option<String>,
}

impl Settings {
	pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
		let found = store.get(&keys::ALL_SETTINGS).await?;
		Ok(serde_json::from_value(serde_json::Value::Object(found))?)
	}

	/// Writes every present field. Absent fields are left untouched in the store.
	pub async fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<()> {
		let items = match serde_json::to_value(self)? {
			serde_json::Value::Object(map) => map,
			_ => StoreMap::new(),
		};
		store.set(items).await
	}

	pub fn model(&self) -> &str {
		self.gpt_model.as_deref().filter(|m| !m.is_empty()).unwrap_or(DEFAULT_MODEL)
	}

	/// API key, or [`Error::MissingApiKey`] when unset or blank.
	pub fn require_api_key(&self) -> Result<&str> {
		self.api_key
			.as_deref()
			.map(str::trim)
			.filter(|k| !k.is_empty())
			.ok_or(Error::MissingApiKey)
	}

	pub fn prompt_config(&self) -> PromptConfig {
		PromptConfig {
			model: self.model().to_string(),
			positive_prompt: self.positive_prompt.clone(),
			negative_prompt: self.negative_prompt.clone(),
			knowledge_base: self.base_content.clone(),
		}
	}
}

/// Outcome of loading a knowledge-base file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeBaseReport {
	pub chars: usize,
	/// True when prompts will only see the first [`KNOWLEDGE_BASE_LIMIT`] chars.
	pub truncated_in_prompts: bool,
}

/// Stores a knowledge-base file's name and content.
pub async fn load_knowledge_base<S: KeyValueStore + ?Sized>(
	store: &S,
	file_name: &str,
	content: &str,
) -> Result<KnowledgeBaseReport> {
	let mut items = StoreMap::new();
	items.insert(keys::BASE_FILE_NAME.into(), file_name.into());
	items.insert(keys::BASE_CONTENT.into(), content.into());
	store.set(items).await?;

	let chars = content.chars().count();
	let truncated_in_prompts = chars > KNOWLEDGE_BASE_LIMIT;
	if truncated_in_prompts {
		warn!(target = "autoanswer", file_name, chars, limit = KNOWLEDGE_BASE_LIMIT, "knowledge base exceeds prompt limit");
	} else {
		info!(target = "autoanswer", file_name, chars, "knowledge base loaded");
	}
	Ok(KnowledgeBaseReport {
		chars,
		truncated_in_prompts,
	})
}

pub async fn clear_knowledge_base<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
	store.remove(&[keys::BASE_FILE_NAME, keys::BASE_CONTENT]).await
}

pub async fn last_selected_text<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<String>> {
	get_value(store, keys::LAST_SELECTED_TEXT).await
}

pub async fn set_last_selected_text<S: KeyValueStore + ?Sized>(store: &S, text: &str) -> Result<()> {
	set_value(store, keys::LAST_SELECTED_TEXT, text).await
}

pub async fn last_generated_answer<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<String>> {
	get_value(store, keys::LAST_GENERATED_ANSWER).await
}

pub async fn set_last_generated_answer<S: KeyValueStore + ?Sized>(store: &S, answer: &str) -> Result<()> {
	set_value(store, keys::LAST_GENERATED_ANSWER, answer).await
}
