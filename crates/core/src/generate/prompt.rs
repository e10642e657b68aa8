use tracing::{debug, warn};

use crate::settings::{DEFAULT_MODEL, KNOWLEDGE_BASE_LIMIT};
use crate::text::truncate_chars;

const DEFAULT_INSTRUCTIONS: &str =
	"You are a professional customer support assistant. Give accurate, helpful and polite answers.";

const REFINE_SYSTEM_PROMPT: &str = "You are an assistant that edits texts.\n\n\
	Correct the provided text according to the user's instructions. Keep the original meaning \
	but apply the requested changes.";

/// Everything that shapes a generation besides the question itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
	pub model: String,
	pub positive_prompt: Option<String>,
	pub negative_prompt: Option<String>,
	pub knowledge_base: Option<String>,
}

impl Default for PromptConfig {
	fn default() -> Self {
		Self {
			model: DEFAULT_MODEL.to_string(),
			positive_prompt: None,
			negative_prompt: None,
			knowledge_base: None,
		}
	}
}

fn non_blank(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|v| !v.trim().is_empty())
}

/// System message: knowledge base, then instructions, then restrictions.
pub fn build_system_prompt(config: &PromptConfig) -> String {
	let mut prompt = String::new();

	if let Some(base) = non_blank(&config.knowledge_base) {
		let (base, cut) = truncate_chars(base, KNOWLEDGE_BASE_LIMIT);
		if cut {
			warn!(target = "autoanswer", limit = KNOWLEDGE_BASE_LIMIT, "knowledge base truncated for prompt");
		}
		prompt.push_str("KNOWLEDGE BASE (use this information when answering):\n\n");
		prompt.push_str(base);
		prompt.push_str("\n\n---\n\n");
	}

	match non_blank(&config.positive_prompt) {
		Some(instructions) => {
			prompt.push_str("INSTRUCTIONS:\n");
			prompt.push_str(instructions);
			prompt.push_str("\n\n");
		}
		None => {
			prompt.push_str(DEFAULT_INSTRUCTIONS);
			prompt.push_str("\n\n");
		}
	}

	if let Some(restrictions) = non_blank(&config.negative_prompt) {
		prompt.push_str("DO NOT (follow these restrictions strictly):\n");
		prompt.push_str(restrictions);
		prompt.push_str("\n\n");
	}

	debug!(target = "autoanswer", chars = prompt.chars().count(), "system prompt built");
	prompt
}

/// System and user messages for rewriting `answer` per `instructions`.
pub fn build_refine_prompt(answer: &str, instructions: &str) -> (String, String) {
	let user = format!(
		"Current text:\n{answer}\n\nCorrection instructions:\n{instructions}\n\n\
		 Apply the corrections and return only the corrected text."
	);
	(REFINE_SYSTEM_PROMPT.to_string(), user)
}
