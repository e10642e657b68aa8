use autoanswer::settings::validate_api_key;
use colored::Colorize;
use serde_json::json;

use super::{CommandContext, CommandOutput};
use crate::cli::TestApiArgs;
use crate::error::Result;

pub async fn execute(ctx: &CommandContext, args: TestApiArgs) -> Result<CommandOutput> {
	let api_key = ctx.api_key(args.api_key.as_deref()).await?;
	validate_api_key(&api_key)?;

	let models = ctx.client(&api_key).test_connection().await?;

	Ok(CommandOutput::new(
		json!({ "connected": true, "models": models }),
		format!("{} Available models: {models}", "Connected!".green().bold()),
	))
}
