use autoanswer::{Settings, settings};
use serde_json::json;

use super::{CommandContext, CommandOutput};
use crate::cli::RefineArgs;
use crate::error::{AppError, Result};

pub async fn execute(ctx: &CommandContext, args: RefineArgs) -> Result<CommandOutput> {
	let instructions = args.instructions.trim();
	if instructions.is_empty() {
		return Err(AppError::InvalidInput("refinement instructions are empty".into()));
	}

	let answer = match args.answer {
		Some(answer) => answer,
		None => settings::last_generated_answer(&ctx.store)
			.await?
			.ok_or(AppError::NothingToDo("refine: no answer given and none generated yet"))?,
	};

	let stored = Settings::load(&ctx.store).await?;
	let api_key = ctx.api_key(None).await?;
	let refined = ctx.client(&api_key).refine(&answer, instructions, stored.model()).await?;
	settings::set_last_generated_answer(&ctx.store, &refined).await?;

	Ok(CommandOutput::new(
		json!({
			"answer": refined,
			"model": stored.model(),
		}),
		refined.clone(),
	))
}
