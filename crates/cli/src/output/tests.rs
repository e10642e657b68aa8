use serde_json::json;

use super::*;

#[test]
fn result_builder_success() {
	let result = ResultBuilder::new("generate").data(json!({ "answer": "Hi" })).build();

	assert!(result.ok);
	assert_eq!(result.command, "generate");
	assert_eq!(result.schema_version, Some(SCHEMA_VERSION));
	assert!(result.error.is_none());
	assert!(result.timings.is_some());
}

#[test]
fn result_builder_error() {
	let result: CommandResult<serde_json::Value> = ResultBuilder::new("history.show")
		.error(CommandError {
			code: ErrorCode::NotFound,
			message: "history entry not found".into(),
		})
		.build();

	assert!(!result.ok);
	assert!(result.data.is_none());
	assert_eq!(result.error.as_ref().map(|e| e.code), Some(ErrorCode::NotFound));
}

#[test]
fn result_without_data_is_not_ok() {
	let result: CommandResult<serde_json::Value> = ResultBuilder::new("noop").build();
	assert!(!result.ok);
}

#[test]
fn envelope_serializes_camel_case() {
	let result = ResultBuilder::new("settings.show").data(json!({})).build();
	let value = serde_json::to_value(&result).unwrap();

	assert_eq!(value["schemaVersion"], 1);
	assert!(value["timings"]["durationMs"].is_u64());
	assert!(value.get("error").is_none());
}

#[test]
fn error_codes_are_screaming_snake_case() {
	assert_eq!(serde_json::to_value(ErrorCode::AuthError).unwrap(), json!("AUTH_ERROR"));
	assert_eq!(ErrorCode::RemoteError.to_string(), "REMOTE_ERROR");
}
