//! Workspace tabs: independent question/answer slots, each with its own
//! prompt settings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::settings::keys;
use crate::store::{KeyValueStore, StoreMap, get_value, set_value};

pub const CURRENT_TAB_KEY: &str = "currentTabId";
pub const DEFAULT_TAB_ID: u32 = 1;

pub fn data_key(tab_id: u32) -> String {
	format!("tab_{tab_id}_data")
}

/// Stored state of one workspace tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabData {
	pub input_text: String,
	pub answer_text: String,
	pub positive_prompt: String,
	pub negative_prompt: String,
	pub gpt_model: String,
	pub base_file_name: String,
	pub base_content: String,
}

/// A single editable field of [`TabData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabField {
	InputText,
	AnswerText,
	PositivePrompt,
	NegativePrompt,
	GptModel,
	BaseFileName,
	BaseContent,
}

impl TabField {
	/// Global settings key mirrored on update, for prompt settings fields.
	pub fn global_key(self) -> Option<&'static str> {
		match self {
			TabField::InputText | TabField::AnswerText => None,
			TabField::PositivePrompt => Some(keys::POSITIVE_PROMPT),
			TabField::NegativePrompt => Some(keys::NEGATIVE_PROMPT),
			TabField::GptModel => Some(keys::GPT_MODEL),
			TabField::BaseFileName => Some(keys::BASE_FILE_NAME),
			TabField::BaseContent => Some(keys::BASE_CONTENT),
		}
	}

	fn slot(self, data: &mut TabData) -> &mut String {
		match self {
			TabField::InputText => &mut data.input_text,
			TabField::AnswerText => &mut data.answer_text,
			TabField::PositivePrompt => &mut data.positive_prompt,
			TabField::NegativePrompt => &mut data.negative_prompt,
			TabField::GptModel => &mut data.gpt_model,
			TabField::BaseFileName => &mut data.base_file_name,
			TabField::BaseContent => &mut data.base_content,
		}
	}
}

pub async fn current_tab_id<S: KeyValueStore + ?Sized>(store: &S) -> Result<u32> {
	Ok(get_value::<u32, _>(store, CURRENT_TAB_KEY)
		.await?
		.filter(|id| *id > 0)
		.unwrap_or(DEFAULT_TAB_ID))
}

pub async fn set_current_tab_id<S: KeyValueStore + ?Sized>(store: &S, tab_id: u32) -> Result<()> {
	set_value(store, CURRENT_TAB_KEY, &tab_id).await
}

/// Record of `tab_id`, empty when the tab was never written.
pub async fn load<S: KeyValueStore + ?Sized>(store: &S, tab_id: u32) -> Result<TabData> {
	Ok(get_value(store, &data_key(tab_id)).await?.unwrap_or_default())
}

pub async fn save<S: KeyValueStore + ?Sized>(store: &S, tab_id: u32, data: &TabData) -> Result<()> {
	set_value(store, &data_key(tab_id), data).await
}

/// Sets one field of the tab record.
///
/// Prompt settings fields are written to their global key in the same batch.
/// An empty value removes the global key instead.
pub async fn update_field<S: KeyValueStore + ?Sized>(
	store: &S,
	tab_id: u32,
	field: TabField,
	value: &str,
) -> Result<TabData> {
	let mut data = load(store, tab_id).await?;
	*field.slot(&mut data) = value.to_string();

	let mut items = StoreMap::new();
	items.insert(data_key(tab_id), serde_json::to_value(&data)?);

	match field.global_key() {
		Some(global) if value.is_empty() => {
			store.set(items).await?;
			store.remove(&[global]).await?;
		}
		Some(global) => {
			items.insert(global.to_string(), Value::String(value.to_string()));
			store.set(items).await?;
		}
		None => store.set(items).await?,
	}

	debug!(target = "autoanswer", tab_id, ?field, "tab field updated");
	Ok(data)
}
