//! Integration tests for the store-only commands (no network).

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{Days, Utc};
use serde_json::{Value, json};
use tempfile::TempDir;

fn aa_binary() -> PathBuf {
	PathBuf::from(env!("CARGO_BIN_EXE_aa"))
}

fn run(store: &Path, args: &[&str]) -> Output {
	Command::new(aa_binary())
		.arg("--store")
		.arg(store)
		.args(args)
		.env_remove("OPENAI_API_KEY")
		.env_remove("RUST_LOG")
		.output()
		.expect("failed to execute aa")
}

fn run_json(store: &Path, args: &[&str]) -> Value {
	let mut full = vec!["-f", "json"];
	full.extend_from_slice(args);
	let output = run(store, &full);
	let stdout = String::from_utf8_lossy(&output.stdout);
	serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

fn read_store(store: &Path) -> Value {
	serde_json::from_str(&std::fs::read_to_string(store).unwrap()).unwrap()
}

fn date_key(days_ago: u64) -> String {
	let date = Utc::now().date_naive().checked_sub_days(Days::new(days_ago)).unwrap();
	date.format("%Y-%m-%d").to_string()
}

fn entry(question: &str, answer: &str) -> Value {
	json!({
		"time": "10:00",
		"question": question,
		"answer": answer,
		"timestamp": "2026-10-17T10:00:00+00:00"
	})
}

/// Store with history on tab 1: two entries today, one three days ago, one
/// thirty days ago. Tab 2 has one entry today.
fn seeded_store(dir: &TempDir) -> PathBuf {
	let path = dir.path().join("storage.json");
	let mut doc = serde_json::Map::new();
	doc.insert(
		format!("tab_1_history_{}", date_key(0)),
		json!([entry("How do I reset my password?", "Use the reset link."), entry("Refund?", "Within 14 days.")]),
	);
	doc.insert(
		format!("tab_1_history_{}", date_key(3)),
		json!([entry("Shipping time", "About a week, refunds excluded.")]),
	);
	doc.insert(format!("tab_1_history_{}", date_key(30)), json!([entry("Old question", "Old answer")]));
	doc.insert(format!("tab_2_history_{}", date_key(0)), json!([entry("Other tab", "Other")]));
	std::fs::write(&path, serde_json::to_string_pretty(&Value::Object(doc)).unwrap()).unwrap();
	path
}

#[test]
fn set_key_rejects_malformed_key() {
	let dir = TempDir::new().unwrap();
	let store = dir.path().join("storage.json");

	let output = run(&store, &["settings", "set-key", "pk-not-openai"]);

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("invalid API key"), "stderr: {stderr}");
	assert!(!store.exists());
}

#[test]
fn set_key_then_show_masks_key() {
	let dir = TempDir::new().unwrap();
	let store = dir.path().join("storage.json");

	assert!(run(&store, &["settings", "set-key", "sk-test1234567890wxyz"]).status.success());
	assert_eq!(read_store(&store)["apiKey"], "sk-test1234567890wxyz");

	let shown = run_json(&store, &["settings", "show"]);
	assert_eq!(shown["ok"], true);
	assert_eq!(shown["command"], "settings.show");
	assert_eq!(shown["data"]["apiKey"], "sk-...wxyz");
	assert_eq!(shown["data"]["gptModel"], "gpt-4o-mini");
}

#[test]
fn settings_set_writes_tab_record_and_global_keys() {
	let dir = TempDir::new().unwrap();
	let store = dir.path().join("storage.json");

	let output = run(
		&store,
		&["--tab", "2", "settings", "set", "--model", "gpt-4o", "--positive", "Answer briefly"],
	);
	assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

	let doc = read_store(&store);
	assert_eq!(doc["gptModel"], "gpt-4o");
	assert_eq!(doc["positivePrompt"], "Answer briefly");
	assert_eq!(doc["tab_2_data"]["gptModel"], "gpt-4o");
	assert_eq!(doc["tab_2_data"]["positivePrompt"], "Answer briefly");
}

#[test]
fn settings_set_rejects_unknown_model() {
	let dir = TempDir::new().unwrap();
	let store = dir.path().join("storage.json");

	let result = run_json(&store, &["settings", "set", "--model", "davinci"]);

	assert_eq!(result["ok"], false);
	assert_eq!(result["error"]["code"], "INVALID_INPUT");
}

#[test]
fn knowledge_base_load_and_clear() {
	let dir = TempDir::new().unwrap();
	let store = dir.path().join("storage.json");
	let base = dir.path().join("faq.txt");
	std::fs::write(&base, "We ship worldwide.").unwrap();

	let loaded = run_json(&store, &["settings", "load-base", base.to_str().unwrap()]);
	assert_eq!(loaded["data"]["baseFileName"], "faq.txt");
	assert_eq!(loaded["data"]["chars"], 18);
	assert_eq!(loaded["data"]["truncatedInPrompts"], false);
	assert_eq!(read_store(&store)["baseContent"], "We ship worldwide.");

	assert!(run(&store, &["settings", "clear-base"]).status.success());
	let doc = read_store(&store);
	assert!(doc.get("baseContent").is_none());
	assert_eq!(doc["tab_1_data"]["baseContent"], "");
}

#[test]
fn knowledge_base_missing_file_is_io_error() {
	let dir = TempDir::new().unwrap();
	let store = dir.path().join("storage.json");
	let missing = dir.path().join("nope.txt");

	let result = run_json(&store, &["settings", "load-base", missing.to_str().unwrap()]);

	assert_eq!(result["ok"], false);
	assert_eq!(result["error"]["code"], "IO_ERROR");
	let message = result["error"]["message"].as_str().unwrap();
	assert!(message.starts_with("failed to read knowledge base"), "{message}");
	assert!(!store.exists());
}

#[test]
fn history_list_shows_recent_days_newest_first() {
	let dir = TempDir::new().unwrap();
	let store = seeded_store(&dir);

	let listed = run_json(&store, &["history", "list", "--days", "2"]);
	let days = listed["data"]["days"].as_array().unwrap();
	assert_eq!(days.len(), 2);
	assert_eq!(days[0]["date"], date_key(0));
	assert_eq!(days[1]["date"], date_key(3));

	let text = String::from_utf8_lossy(&run(&store, &["history", "list"]).stdout).to_string();
	assert!(text.contains("Today"), "{text}");
	assert!(text.contains("How do I reset my password?"), "{text}");
	assert!(!text.contains("Other tab"), "{text}");
}

#[test]
fn history_search_matches_question_and_answer() {
	let dir = TempDir::new().unwrap();
	let store = seeded_store(&dir);

	let found = run_json(&store, &["history", "search", "REFUND"]);
	let questions: Vec<String> = found["data"]["days"]
		.as_array()
		.unwrap()
		.iter()
		.flat_map(|d| d["entries"].as_array().unwrap().clone())
		.map(|e| e["question"].as_str().unwrap().to_string())
		.collect();
	assert_eq!(questions, vec!["Refund?", "Shipping time"]);
}

#[test]
fn history_show_and_delete_entry() {
	let dir = TempDir::new().unwrap();
	let store = seeded_store(&dir);
	let old = date_key(3);

	let shown = run_json(&store, &["history", "show", &old, "0"]);
	assert_eq!(shown["data"]["question"], "Shipping time");

	let deleted = run_json(&store, &["history", "delete", &old, "0"]);
	assert_eq!(deleted["ok"], true);
	assert!(read_store(&store).get(format!("tab_1_history_{old}")).is_none());

	let missing = run_json(&store, &["history", "show", &old, "0"]);
	assert_eq!(missing["ok"], false);
	assert_eq!(missing["error"]["code"], "NOT_FOUND");
}

#[test]
fn history_show_rejects_bad_date() {
	let dir = TempDir::new().unwrap();
	let store = seeded_store(&dir);

	let result = run_json(&store, &["history", "show", "17/10/2026", "0"]);
	assert_eq!(result["error"]["code"], "INVALID_INPUT");
}

#[test]
fn history_stats_counts_per_tab() {
	let dir = TempDir::new().unwrap();
	let store = seeded_store(&dir);

	let stats = run_json(&store, &["history", "stats"]);
	assert_eq!(stats["data"], json!({ "total": 4, "week": 3, "today": 2 }));

	let other = run_json(&store, &["--tab", "2", "history", "stats"]);
	assert_eq!(other["data"]["total"], 1);
}

#[test]
fn history_export_and_clear() {
	let dir = TempDir::new().unwrap();
	let store = seeded_store(&dir);
	let out = dir.path().join("export/history.json");

	assert!(run(&store, &["history", "export", "--output", out.to_str().unwrap()]).status.success());
	let exported: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
	assert_eq!(exported.as_object().unwrap().len(), 3);

	let cleared = run_json(&store, &["history", "clear"]);
	assert_eq!(cleared["data"]["daysRemoved"], 3);
	let doc = read_store(&store);
	assert_eq!(doc.as_object().unwrap().len(), 1, "only tab 2 history should remain");
}

#[test]
fn generate_without_key_fails_with_auth_error() {
	let dir = TempDir::new().unwrap();
	let store = dir.path().join("storage.json");

	let result = run_json(&store, &["generate", "hello"]);

	assert_eq!(result["ok"], false);
	assert_eq!(result["error"]["code"], "AUTH_ERROR");
	assert_eq!(result["error"]["message"], "API key is not configured");
}
