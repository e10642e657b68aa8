use std::time::Instant;

use autoanswer_cli::cli::Cli;
use autoanswer_cli::commands;
use autoanswer_cli::logging;
use autoanswer_cli::output::{ResultBuilder, print_result};
use clap::Parser;
use serde_json::Value;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = commands::command_name(&cli.command);
	let started = Instant::now();

	match commands::dispatch(cli).await {
		Ok(out) => {
			let result = ResultBuilder::started_at(command, started).data(out.data).build();
			print_result(&result, format, &out.text);
		}
		Err(err) => {
			tracing::debug!(target = "autoanswer", error = ?err, "command failed");
			let result: autoanswer_cli::output::CommandResult<Value> =
				ResultBuilder::started_at(command, started).error(err.to_command_error()).build();
			print_result(&result, format, "");
			std::process::exit(1);
		}
	}
}
