use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_generate_with_text() {
	let cli = Cli::try_parse_from(["aa", "generate", "Where is my order?"]).unwrap();

	match cli.command {
		Commands::Generate(args) => {
			assert_eq!(args.text.as_deref(), Some("Where is my order?"));
			assert_eq!(args.model, None);
		}
		_ => panic!("Expected Generate command"),
	}
	assert_eq!(cli.format, OutputFormat::Text);
	assert_eq!(cli.verbose, 0);
}

#[test]
fn parse_generate_reads_stdin_when_text_missing() {
	let cli = Cli::try_parse_from(["aa", "generate"]).unwrap();
	assert!(matches!(cli.command, Commands::Generate(GenerateArgs { text: None, .. })));
}

#[test]
fn parse_global_flags_after_subcommand() {
	let cli = Cli::try_parse_from([
		"aa",
		"history",
		"stats",
		"--store",
		"/tmp/aa.json",
		"--tab",
		"3",
		"-vv",
		"-f",
		"json",
	])
	.unwrap();

	assert_eq!(cli.store, Some(PathBuf::from("/tmp/aa.json")));
	assert_eq!(cli.tab, Some(3));
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.format, OutputFormat::Json);
	assert!(matches!(
		cli.command,
		Commands::History(HistoryArgs {
			action: HistoryAction::Stats
		})
	));
}

#[test]
fn tab_zero_is_rejected() {
	assert!(Cli::try_parse_from(["aa", "--tab", "0", "history", "list"]).is_err());
}

#[test]
fn refine_requires_instructions() {
	assert!(Cli::try_parse_from(["aa", "refine", "Some answer"]).is_err());

	let cli = Cli::try_parse_from(["aa", "refine", "-i", "shorter"]).unwrap();
	match cli.command {
		Commands::Refine(args) => {
			assert_eq!(args.instructions, "shorter");
			assert_eq!(args.answer, None);
		}
		_ => panic!("Expected Refine command"),
	}
}

#[test]
fn parse_settings_set() {
	let cli = Cli::try_parse_from(["aa", "settings", "set", "--model", "gpt-4o", "--negative", ""]).unwrap();

	match cli.command {
		Commands::Settings(SettingsArgs {
			action: SettingsAction::Set {
				model,
				positive,
				negative,
			},
		}) => {
			assert_eq!(model.as_deref(), Some("gpt-4o"));
			assert_eq!(positive, None);
			assert_eq!(negative.as_deref(), Some(""));
		}
		_ => panic!("Expected Settings Set command"),
	}
}

#[test]
fn parse_history_list_defaults_to_recent_days() {
	let cli = Cli::try_parse_from(["aa", "history", "list"]).unwrap();
	assert!(matches!(
		cli.command,
		Commands::History(HistoryArgs {
			action: HistoryAction::List { days: 5 }
		})
	));
}

#[test]
fn parse_history_show() {
	let cli = Cli::try_parse_from(["aa", "history", "show", "2026-10-17", "2"]).unwrap();
	match cli.command {
		Commands::History(HistoryArgs {
			action: HistoryAction::Show { date, index },
		}) => {
			assert_eq!(date, "2026-10-17");
			assert_eq!(index, 2);
		}
		_ => panic!("Expected History Show command"),
	}
}

#[test]
fn parse_test_api_key_override() {
	let cli = Cli::try_parse_from(["aa", "test-api", "--api-key", "sk-abc"]).unwrap();
	assert!(matches!(
		cli.command,
		Commands::TestApi(TestApiArgs { api_key: Some(ref k) }) if k == "sk-abc"
	));
}
