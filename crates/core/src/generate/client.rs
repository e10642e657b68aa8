use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::prompt::{PromptConfig, build_refine_prompt, build_system_prompt};
use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const TEMPERATURE: f32 = 0.7;
const ANSWER_MAX_TOKENS: u32 = 1500;
const REFINE_MAX_TOKENS: u32 = 800;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
	model: &'a str,
	messages: [ChatMessage<'a>; 2],
	temperature: f32,
	max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
	role: &'static str,
	content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
	#[serde(default)]
	choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
	message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
	#[serde(default)]
	content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
	#[serde(default)]
	data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
	error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	message: String,
}

/// Client for an OpenAI-compatible chat-completions service.
#[derive(Debug, Clone)]
pub struct GenerationClient {
	api_key: String,
	base_url: String,
	http: reqwest::Client,
}

impl GenerationClient {
	pub fn new(api_key: impl Into<String>) -> Self {
		Self::with_base_url(api_key, DEFAULT_API_BASE)
	}

	/// Client for a custom endpoint base such as `http://localhost:8080/v1`.
	pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			base_url: base_url.into().trim_end_matches('/').to_string(),
			http: reqwest::Client::new(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Answers `question` with the system prompt derived from `config`.
	pub async fn generate(&self, question: &str, config: &PromptConfig) -> Result<String> {
		let system = build_system_prompt(config);
		info!(target = "autoanswer", model = %config.model, question_chars = question.chars().count(), "requesting answer");
		self.chat(&config.model, &system, question, ANSWER_MAX_TOKENS).await
	}

	/// Rewrites `answer` following the user's correction `instructions`.
	pub async fn refine(&self, answer: &str, instructions: &str, model: &str) -> Result<String> {
		let (system, user) = build_refine_prompt(answer, instructions);
		info!(target = "autoanswer", model, "requesting refinement");
		self.chat(model, &system, &user, REFINE_MAX_TOKENS).await
	}

	/// Lists models to verify the key; returns how many the service offers.
	pub async fn test_connection(&self) -> Result<usize> {
		let response = self
			.http
			.get(format!("{}/models", self.base_url))
			.bearer_auth(&self.api_key)
			.send()
			.await?;
		let response = check_status(response, "Invalid API key").await?;
		let models: ModelList = response.json().await?;
		info!(target = "autoanswer", models = models.data.len(), "API connection verified");
		Ok(models.data.len())
	}

	async fn chat(&self, model: &str, system: &str, user: &str, max_tokens: u32) -> Result<String> {
		let request = ChatRequest {
			model,
			messages: [
				ChatMessage {
					role: "system",
					content: system,
				},
				ChatMessage {
					role: "user",
					content: user,
				},
			],
			temperature: TEMPERATURE,
			max_tokens,
		};

		let response = self
			.http
			.post(format!("{}/chat/completions", self.base_url))
			.bearer_auth(&self.api_key)
			.json(&request)
			.send()
			.await?;
		let response = check_status(response, "Failed to generate answer").await?;

		let body: ChatResponse = response.json().await?;
		let answer = body
			.choices
			.into_iter()
			.next()
			.and_then(|c| c.message.content)
			.filter(|text| !text.trim().is_empty())
			.ok_or(Error::EmptyAnswer)?;

		debug!(target = "autoanswer", chars = answer.chars().count(), "answer received");
		Ok(answer)
	}
}

/// Maps a non-success response to [`Error::RemoteService`], preferring the
/// service's own `error.message`.
async fn check_status(response: reqwest::Response, fallback: &str) -> Result<reqwest::Response> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	let message = serde_json::from_str::<ErrorEnvelope>(&body)
		.map(|e| e.error.message)
		.unwrap_or_else(|_| format!("{fallback} (HTTP {})", status.as_u16()));

	warn!(target = "autoanswer", status = status.as_u16(), message = %message, "generation service error");
	Err(Error::RemoteService {
		status: Some(status.as_u16()),
		message,
	})
}
