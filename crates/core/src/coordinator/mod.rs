//! Service-worker side request handling.
//!
//! The [`Coordinator`] owns no browser APIs itself. Tabs are reached through a
//! [`TabChannel`], persistence through a [`KeyValueStore`], and the popup
//! panel through an optional [`PanelPort`].

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::collections::HashMap;

use autoanswer_protocol::{PanelMessage, RuntimeRequest, RuntimeResponse, SelectorCommand};
use tracing::{debug, info, warn};

use crate::connect::{ChannelError, ConnectPolicy, TabChannel, TabInfo, deliver_to_tab};
use crate::error::{Error, Result};
use crate::generate::{DEFAULT_API_BASE, GenerationClient, PromptConfig};
use crate::history::HistoryLog;
use crate::settings::{self, DEFAULT_MODEL};
use crate::store::KeyValueStore;
use crate::tabs;

pub const SUPERSEDED_MESSAGE: &str = "Superseded by a newer selector command";

/// Long-lived connection to the popup panel.
pub trait PanelPort {
	fn post(&self, message: &PanelMessage) -> std::result::Result<(), ChannelError>;
}

pub struct Coordinator<C, S> {
	channel: C,
	store: S,
	policy: ConnectPolicy,
	api_base: String,
	panel: RefCell<Option<Box<dyn PanelPort>>>,
	/// Per-tab counter of selector commands and the newest command, used to
	/// detect superseded enables.
	epochs: RefCell<HashMap<i32, (u64, SelectorCommand)>>,
}

impl<C: TabChannel, S: KeyValueStore> Coordinator<C, S> {
	pub fn new(channel: C, store: S) -> Self {
		Self {
			channel,
			store,
			policy: ConnectPolicy::default(),
			api_base: DEFAULT_API_BASE.to_string(),
			panel: RefCell::new(None),
			epochs: RefCell::new(HashMap::new()),
		}
	}

	pub fn with_policy(mut self, policy: ConnectPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
		self.api_base = api_base.into();
		self
	}

	pub fn channel(&self) -> &C {
		&self.channel
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Replaces any previously connected panel.
	pub fn connect_panel(&self, port: Box<dyn PanelPort>) {
		info!(target = "autoanswer", "panel connected");
		self.panel.replace(Some(port));
	}

	pub fn disconnect_panel(&self) {
		if self.panel.take().is_some() {
			info!(target = "autoanswer", "panel disconnected");
		}
	}

	pub fn has_panel(&self) -> bool {
		self.panel.borrow().is_some()
	}

	/// Handles one runtime request. Failures become `success: false` responses.
	pub async fn handle(&self, request: RuntimeRequest) -> RuntimeResponse {
		let action = request.action();
		debug!(target = "autoanswer", action, "runtime request");

		let result = match request {
			RuntimeRequest::EnableSelector => self.selector_command(SelectorCommand::EnableSelector).await,
			RuntimeRequest::DisableSelector => self.selector_command(SelectorCommand::DisableSelector).await,
			RuntimeRequest::ElementSelected { text } => self.element_selected(text).await,
			RuntimeRequest::TestApi { api_key } => self.test_api(&api_key).await,
			RuntimeRequest::GenerateAnswer {
				text,
				api_key,
				model,
				positive_prompt,
				negative_prompt,
				base_content,
			} => {
				let config = PromptConfig {
					model: pick_model(model),
					positive_prompt,
					negative_prompt,
					knowledge_base: base_content,
				};
				self.generate_answer(&text, &api_key, &config).await
			}
			RuntimeRequest::RefineAnswer {
				answer,
				instructions,
				api_key,
				model,
			} => self.refine_answer(&answer, &instructions, &api_key, &pick_model(model)).await,
		};

		result.unwrap_or_else(|err| {
			warn!(target = "autoanswer", action, error = %err, "request failed");
			RuntimeResponse::failed(err.status_line())
		})
	}

	async fn selector_command(&self, command: SelectorCommand) -> Result<RuntimeResponse> {
		let tab = self.channel.active_tab().await?.ok_or(Error::NoActiveTab)?;
		let epoch = self.bump_epoch(tab.id, command);

		let delivered = deliver_to_tab(&self.channel, &tab, command, self.policy).await;

		if command == SelectorCommand::EnableSelector {
			if let Some(latest) = self.latest_command(tab.id, epoch) {
				info!(target = "autoanswer", tab_id = tab.id, "enable superseded by a later command");
				let activated = matches!(&delivered, Ok(response) if response.success);
				if activated && latest == SelectorCommand::DisableSelector {
					self.revert_enable(&tab).await;
				}
				return Ok(RuntimeResponse::failed(SUPERSEDED_MESSAGE));
			}
		}

		let response = delivered?;
		Ok(RuntimeResponse {
			success: response.success,
			message: response.message,
			error: response.error,
			answer: None,
		})
	}

	/// Disables a controller that a stale enable switched on after the user disabled it.
	async fn revert_enable(&self, tab: &TabInfo) {
		match deliver_to_tab(&self.channel, tab, SelectorCommand::DisableSelector, self.policy).await {
			Ok(_) => debug!(target = "autoanswer", tab_id = tab.id, "stale enable reverted"),
			Err(err) => warn!(target = "autoanswer", tab_id = tab.id, error = %err, "failed to revert stale enable"),
		}
	}

	async fn element_selected(&self, text: String) -> Result<RuntimeResponse> {
		info!(target = "autoanswer", chars = text.chars().count(), "text captured");
		settings::set_last_selected_text(&self.store, &text).await?;

		if let Some(panel) = self.panel.borrow().as_ref() {
			if let Err(err) = panel.post(&PanelMessage::ElementSelected { text }) {
				warn!(target = "autoanswer", error = %err, "failed to relay capture to panel");
			}
		}
		Ok(RuntimeResponse::with_message("Text received"))
	}

	async fn test_api(&self, api_key: &str) -> Result<RuntimeResponse> {
		let models = self.client(api_key)?.test_connection().await?;
		Ok(RuntimeResponse::with_message(format!("Connected! Available models: {models}")))
	}

	async fn generate_answer(&self, text: &str, api_key: &str, config: &PromptConfig) -> Result<RuntimeResponse> {
		let answer = self.client(api_key)?.generate(text, config).await?;

		settings::set_last_generated_answer(&self.store, &answer).await?;
		if let Err(err) = self.record_history(text, &answer).await {
			warn!(target = "autoanswer", error = %err, "failed to save history entry");
		}
		Ok(RuntimeResponse::answer(answer))
	}

	async fn refine_answer(&self, answer: &str, instructions: &str, api_key: &str, model: &str) -> Result<RuntimeResponse> {
		let refined = self.client(api_key)?.refine(answer, instructions, model).await?;
		Ok(RuntimeResponse::answer(refined))
	}

	async fn record_history(&self, question: &str, answer: &str) -> Result<()> {
		let tab_id = tabs::current_tab_id(&self.store).await?;
		HistoryLog::new(&self.store, tab_id).append(question, answer).await?;
		Ok(())
	}

	fn client(&self, api_key: &str) -> Result<GenerationClient> {
		let api_key = api_key.trim();
		if api_key.is_empty() {
			return Err(Error::MissingApiKey);
		}
		Ok(GenerationClient::with_base_url(api_key, self.api_base.as_str()))
	}

	fn bump_epoch(&self, tab_id: i32, command: SelectorCommand) -> u64 {
		let mut epochs = self.epochs.borrow_mut();
		let slot = epochs.entry(tab_id).or_insert((0, command));
		slot.0 += 1;
		slot.1 = command;
		slot.0
	}

	/// The newest command for `tab_id` when one arrived after `epoch`.
	fn latest_command(&self, tab_id: i32, epoch: u64) -> Option<SelectorCommand> {
		self.epochs
			.borrow()
			.get(&tab_id)
			.filter(|(current, _)| *current != epoch)
			.map(|(_, command)| *command)
	}
}

fn pick_model(model: Option<String>) -> String {
	model
		.filter(|m| !m.trim().is_empty())
		.unwrap_or_else(|| DEFAULT_MODEL.to_string())
}
