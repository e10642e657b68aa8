use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use autoanswer::settings::{self, MODELS, model_info, validate_api_key};
use autoanswer::tabs::{self, TabField};
use autoanswer::{Settings, store};
use colored::Colorize;
use serde_json::json;

use super::{CommandContext, CommandOutput};
use crate::cli::SettingsAction;
use crate::error::{AppError, Result};

pub async fn execute(ctx: &CommandContext, action: SettingsAction) -> Result<CommandOutput> {
	match action {
		SettingsAction::Show => show(ctx).await,
		SettingsAction::SetKey { key } => set_key(ctx, &key).await,
		SettingsAction::Set {
			model,
			positive,
			negative,
		} => set(ctx, model, positive, negative).await,
		SettingsAction::LoadBase { file } => load_base(ctx, &file).await,
		SettingsAction::ClearBase => clear_base(ctx).await,
		SettingsAction::Models => Ok(models(&Settings::load(&ctx.store).await?)),
	}
}

/// `sk-...abcd`, or a fixed mask for short keys.
pub fn mask_key(key: &str) -> String {
	let chars: Vec<char> = key.chars().collect();
	if chars.len() <= 8 {
		return "****".to_string();
	}
	let head: String = chars[..3].iter().collect();
	let tail: String = chars[chars.len() - 4..].iter().collect();
	format!("{head}...{tail}")
}

async fn show(ctx: &CommandContext) -> Result<CommandOutput> {
	let stored = Settings::load(&ctx.store).await?;
	let masked = stored.api_key.as_deref().map(mask_key);
	let base_chars = stored.base_content.as_deref().map(|c| c.chars().count());

	let mut text = String::new();
	let none = "(not set)".dimmed().to_string();
	let _ = writeln!(text, "{:<16}{}", "API key".bold(), masked.clone().unwrap_or_else(|| none.clone()));
	let _ = writeln!(text, "{:<16}{}", "Model".bold(), stored.model());
	let _ = writeln!(
		text,
		"{:<16}{}",
		"Instructions".bold(),
		stored.positive_prompt.clone().unwrap_or_else(|| none.clone())
	);
	let _ = writeln!(
		text,
		"{:<16}{}",
		"Restrictions".bold(),
		stored.negative_prompt.clone().unwrap_or_else(|| none.clone())
	);
	let base = match (&stored.base_file_name, base_chars) {
		(Some(name), Some(chars)) => format!("{name} ({chars} chars)"),
		_ => none.clone(),
	};
	let _ = writeln!(text, "{:<16}{}", "Knowledge base".bold(), base);
	let _ = write!(text, "{:<16}{}", "Tab".bold(), ctx.tab_id);

	Ok(CommandOutput::new(
		json!({
			"apiKey": masked,
			"gptModel": stored.model(),
			"positivePrompt": stored.positive_prompt,
			"negativePrompt": stored.negative_prompt,
			"baseFileName": stored.base_file_name,
			"baseContentChars": base_chars,
			"tabId": ctx.tab_id,
		}),
		text,
	))
}

async fn set_key(ctx: &CommandContext, key: &str) -> Result<CommandOutput> {
	let key = key.trim();
	validate_api_key(key)?;
	store::set_value(&ctx.store, settings::keys::API_KEY, key).await?;

	Ok(CommandOutput::new(
		json!({ "apiKey": mask_key(key) }),
		format!("{} API key saved", "ok".green().bold()),
	))
}

async fn set(
	ctx: &CommandContext,
	model: Option<String>,
	positive: Option<String>,
	negative: Option<String>,
) -> Result<CommandOutput> {
	if model.is_none() && positive.is_none() && negative.is_none() {
		return Err(AppError::InvalidInput("nothing to set; pass --model, --positive or --negative".into()));
	}

	let mut changed = Vec::new();
	if let Some(model) = model {
		if model_info(&model).is_none() {
			let known: Vec<_> = MODELS.iter().map(|m| m.id).collect();
			return Err(AppError::InvalidInput(format!(
				"unknown model '{model}' (expected one of: {})",
				known.join(", ")
			)));
		}
		tabs::update_field(&ctx.store, ctx.tab_id, TabField::GptModel, &model).await?;
		changed.push("gptModel");
	}
	if let Some(positive) = positive {
		tabs::update_field(&ctx.store, ctx.tab_id, TabField::PositivePrompt, positive.trim()).await?;
		changed.push("positivePrompt");
	}
	if let Some(negative) = negative {
		tabs::update_field(&ctx.store, ctx.tab_id, TabField::NegativePrompt, negative.trim()).await?;
		changed.push("negativePrompt");
	}

	Ok(CommandOutput::new(
		json!({ "updated": changed, "tabId": ctx.tab_id }),
		format!("{} updated {}", "ok".green().bold(), changed.join(", ")),
	))
}

async fn load_base(ctx: &CommandContext, file: &Path) -> Result<CommandOutput> {
	let content = std::fs::read_to_string(file)
		.with_context(|| format!("failed to read knowledge base {}", file.display()))?;
	let name = file
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| file.display().to_string());

	let report = settings::load_knowledge_base(&ctx.store, &name, &content).await?;
	let mut tab = tabs::load(&ctx.store, ctx.tab_id).await?;
	tab.base_file_name = name.clone();
	tab.base_content = content;
	tabs::save(&ctx.store, ctx.tab_id, &tab).await?;

	let mut text = format!("{} loaded {name} ({} chars)", "ok".green().bold(), report.chars);
	if report.truncated_in_prompts {
		let _ = write!(
			text,
			"\n{} only the first {} chars are sent with prompts",
			"warning:".yellow().bold(),
			settings::KNOWLEDGE_BASE_LIMIT
		);
	}

	Ok(CommandOutput::new(
		json!({
			"baseFileName": name,
			"chars": report.chars,
			"truncatedInPrompts": report.truncated_in_prompts,
		}),
		text,
	))
}

async fn clear_base(ctx: &CommandContext) -> Result<CommandOutput> {
	settings::clear_knowledge_base(&ctx.store).await?;
	let mut tab = tabs::load(&ctx.store, ctx.tab_id).await?;
	tab.base_file_name.clear();
	tab.base_content.clear();
	tabs::save(&ctx.store, ctx.tab_id, &tab).await?;

	Ok(CommandOutput::new(
		json!({ "cleared": true }),
		format!("{} knowledge base removed", "ok".green().bold()),
	))
}

fn models(stored: &Settings) -> CommandOutput {
	let current = stored.model();
	let mut text = String::new();
	for model in MODELS {
		let marker = if model.id == current { "*".green().bold().to_string() } else { " ".to_string() };
		let _ = writeln!(text, "{marker} {:<14} {}", model.id, model.description.dimmed());
	}

	let list: Vec<_> = MODELS
		.iter()
		.map(|m| json!({ "id": m.id, "description": m.description, "current": m.id == current }))
		.collect();
	CommandOutput::new(json!({ "models": list }), text)
}
