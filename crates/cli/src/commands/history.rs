use std::fmt::Write as _;
use std::path::Path;

use autoanswer::history::{self, HistoryDay, HistoryLog, today_utc};
use chrono::NaiveDate;
use colored::Colorize;
use serde_json::{Value, json};

use super::{CommandContext, CommandOutput};
use crate::cli::HistoryAction;
use crate::error::{AppError, Result};
use crate::store::FileStore;

pub async fn execute(ctx: &CommandContext, action: HistoryAction) -> Result<CommandOutput> {
	let log = HistoryLog::new(&ctx.store, ctx.tab_id);

	match action {
		HistoryAction::List { days } => {
			let days = log.recent(days).await?;
			Ok(render_days(&days, "History is empty"))
		}
		HistoryAction::Search { query } => {
			let days = log.search(&query).await?;
			Ok(render_days(&days, "Nothing found"))
		}
		HistoryAction::Show { date, index } => show(&log, &date, index).await,
		HistoryAction::Delete { date, index } => {
			let date = parse_date_arg(&date)?;
			let removed = log.delete(date, index).await?;
			Ok(CommandOutput::new(
				json!({ "date": date.to_string(), "index": index, "deleted": removed }),
				format!("{} deleted \"{}\"", "ok".green().bold(), removed.preview()),
			))
		}
		HistoryAction::Export { output } => export(&log, output.as_deref()).await,
		HistoryAction::Clear => {
			let days = log.clear().await?;
			Ok(CommandOutput::new(
				json!({ "daysRemoved": days, "tabId": ctx.tab_id }),
				format!("{} removed {days} day(s) of history from tab {}", "ok".green().bold(), ctx.tab_id),
			))
		}
		HistoryAction::Stats => {
			let stats = log.stats(today_utc()).await?;
			Ok(CommandOutput::new(
				serde_json::to_value(stats)?,
				format!("today: {}  week: {}  total: {}", stats.today, stats.week, stats.total),
			))
		}
	}
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
	history::parse_date(raw).ok_or_else(|| AppError::InvalidInput(format!("'{raw}' is not a YYYY-MM-DD date")))
}

async fn show(log: &HistoryLog<'_, FileStore>, date: &str, index: usize) -> Result<CommandOutput> {
	let date = parse_date_arg(date)?;
	let entry = log.entry(date, index).await?;

	let text = format!(
		"{} {}\n\n{}\n{}\n\n{}\n{}",
		history::day_label(date, today_utc()).bold(),
		entry.time.dimmed(),
		"Question".cyan().bold(),
		entry.question,
		"Answer".cyan().bold(),
		entry.answer
	);
	Ok(CommandOutput::new(serde_json::to_value(&entry)?, text))
}

async fn export(log: &HistoryLog<'_, FileStore>, output: Option<&Path>) -> Result<CommandOutput> {
	let exported = log.export().await?;

	match output {
		Some(path) => {
			if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
				std::fs::create_dir_all(parent)?;
			}
			std::fs::write(path, &exported)?;
			Ok(CommandOutput::new(
				json!({ "path": path.display().to_string() }),
				format!("{} history written to {}", "ok".green().bold(), path.display()),
			))
		}
		None => {
			let data: Value = serde_json::from_str(&exported)?;
			Ok(CommandOutput::new(data, exported))
		}
	}
}

fn render_days(days: &[HistoryDay], empty: &str) -> CommandOutput {
	let today = today_utc();

	let mut text = String::new();
	if days.is_empty() {
		text.push_str(&empty.dimmed().to_string());
	}
	for day in days {
		let _ = writeln!(
			text,
			"{} {} {}",
			history::day_label(day.date, today).bold(),
			day.date.to_string().dimmed(),
			format!("({})", day.entries.len()).dimmed()
		);
		// Newest first, keeping the stored index for `show` and `delete`.
		for (index, entry) in day.entries.iter().enumerate().rev() {
			let _ = writeln!(text, "  [{index}] {} {}", entry.time.cyan(), entry.preview());
		}
	}

	let data: Vec<Value> = days
		.iter()
		.map(|day| {
			json!({
				"date": day.date.to_string(),
				"key": day.key,
				"entries": day.entries,
			})
		})
		.collect();
	CommandOutput::new(json!({ "days": data }), text)
}
