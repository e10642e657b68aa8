//! Message types for extension runtime messaging.
//!
//! The extension has three execution contexts that only talk by value:
//!
//! 1. The popup panel sends [`RuntimeRequest`]s to the service worker
//! 2. The service worker forwards [`SelectorCommand`]s to the page controller,
//!    which answers with a [`CommandResponse`]
//! 3. The page controller reports a capture with [`RuntimeRequest::ElementSelected`]
//! 4. The service worker relays captures to a connected panel as [`PanelMessage`]s
//!
//! All requests are tagged by an `action` field and use camelCase fields.

use serde::{Deserialize, Serialize};

/// Command sent from the service worker to the page-embedded selector controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SelectorCommand {
	/// Switch the controller into element-picking mode.
	EnableSelector,
	/// Leave element-picking mode without capturing anything.
	DisableSelector,
}

impl SelectorCommand {
	/// Wire name of the command, as it appears in the `action` field.
	pub fn action(self) -> &'static str {
		match self {
			SelectorCommand::EnableSelector => "enableSelector",
			SelectorCommand::DisableSelector => "disableSelector",
		}
	}
}

/// Reply from the page controller to a [`SelectorCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
	/// Whether the command took effect.
	pub success: bool,
	/// Human-readable confirmation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Human-readable failure reason.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl CommandResponse {
	pub fn ok(message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: Some(message.into()),
			error: None,
		}
	}

	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			success: false,
			message: None,
			error: Some(error.into()),
		}
	}
}

/// Request handled by the service worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeRequest {
	/// Enable the selector in the active tab.
	EnableSelector,
	/// Disable the selector in the active tab.
	DisableSelector,
	/// A page controller captured text from an element.
	ElementSelected {
		/// Normalized, length-capped element text.
		text: String,
	},
	/// Verify an API key against the generation service.
	#[serde(rename = "testAPI", rename_all = "camelCase")]
	TestApi { api_key: String },
	/// Generate an answer for `text`.
	#[serde(rename_all = "camelCase")]
	GenerateAnswer {
		text: String,
		api_key: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		model: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		positive_prompt: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		negative_prompt: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		base_content: Option<String>,
	},
	/// Rewrite a previous answer according to free-form instructions.
	#[serde(rename_all = "camelCase")]
	RefineAnswer {
		answer: String,
		instructions: String,
		api_key: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		model: Option<String>,
	},
}

impl RuntimeRequest {
	/// Wire name of the request, for logging.
	pub fn action(&self) -> &'static str {
		match self {
			RuntimeRequest::EnableSelector => "enableSelector",
			RuntimeRequest::DisableSelector => "disableSelector",
			RuntimeRequest::ElementSelected { .. } => "elementSelected",
			RuntimeRequest::TestApi { .. } => "testAPI",
			RuntimeRequest::GenerateAnswer { .. } => "generateAnswer",
			RuntimeRequest::RefineAnswer { .. } => "refineAnswer",
		}
	}
}

/// Reply to a [`RuntimeRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeResponse {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Generated or refined text.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub answer: Option<String>,
}

impl RuntimeResponse {
	pub fn ok() -> Self {
		Self {
			success: true,
			..Default::default()
		}
	}

	pub fn with_message(message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: Some(message.into()),
			..Default::default()
		}
	}

	pub fn answer(answer: impl Into<String>) -> Self {
		Self {
			success: true,
			answer: Some(answer.into()),
			..Default::default()
		}
	}

	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			success: false,
			error: Some(error.into()),
			..Default::default()
		}
	}
}

/// Message pushed from the service worker to a connected popup panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PanelMessage {
	/// Text captured in a page, forwarded so the panel can fill its input.
	ElementSelected { text: String },
}
