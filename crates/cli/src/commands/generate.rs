use std::io::Read;

use anyhow::Context;
use autoanswer::history::HistoryLog;
use autoanswer::tabs::{self, TabField};
use autoanswer::{Settings, settings};
use serde_json::json;
use tracing::info;

use super::{CommandContext, CommandOutput};
use crate::cli::GenerateArgs;
use crate::error::{AppError, Result};

pub async fn execute(ctx: &CommandContext, args: GenerateArgs) -> Result<CommandOutput> {
	let question = match args.text {
		Some(text) => text,
		None => {
			let mut buf = String::new();
			std::io::stdin()
				.read_to_string(&mut buf)
				.context("failed to read question from stdin")?;
			buf
		}
	};
	let question = question.trim();
	if question.is_empty() {
		return Err(AppError::InvalidInput("question text is empty".into()));
	}

	let stored = Settings::load(&ctx.store).await?;
	let api_key = ctx.api_key(None).await?;
	let mut config = stored.prompt_config();
	if let Some(model) = args.model {
		config.model = model;
	}

	let answer = ctx.client(&api_key).generate(question, &config).await?;

	settings::set_last_generated_answer(&ctx.store, &answer).await?;
	tabs::update_field(&ctx.store, ctx.tab_id, TabField::InputText, question).await?;
	tabs::update_field(&ctx.store, ctx.tab_id, TabField::AnswerText, &answer).await?;
	let entry = HistoryLog::new(&ctx.store, ctx.tab_id).append(question, &answer).await?;
	info!(target = "autoanswer", tab_id = ctx.tab_id, time = %entry.time, "answer saved");

	Ok(CommandOutput::new(
		json!({
			"answer": answer,
			"model": config.model,
			"tabId": ctx.tab_id,
		}),
		answer.clone(),
	))
}
