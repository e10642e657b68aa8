use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
	/// Bad arguments or input that clap could not reject on its own.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("nothing to {0}")]
	NothingToDo(&'static str),

	#[error(transparent)]
	Core(#[from] autoanswer::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	/// Local file or stream failure, with the operation as context.
	#[error("{0:#}")]
	Anyhow(#[from] anyhow::Error),
}

impl AppError {
	pub fn code(&self) -> ErrorCode {
		use autoanswer::Error as Core;

		match self {
			AppError::InvalidInput(_) | AppError::NothingToDo(_) => ErrorCode::InvalidInput,
			AppError::Core(Core::MissingApiKey | Core::InvalidApiKey(_)) => ErrorCode::AuthError,
			AppError::Core(Core::RemoteService { status: Some(401 | 403), .. }) => ErrorCode::AuthError,
			AppError::Core(err) if err.is_remote() => ErrorCode::RemoteError,
			AppError::Core(Core::HistoryEntryNotFound { .. }) => ErrorCode::NotFound,
			AppError::Core(Core::Storage(_)) | AppError::Io(_) | AppError::Anyhow(_) => ErrorCode::IoError,
			_ => ErrorCode::InternalError,
		}
	}

	/// Message shown to the user. Core errors use their short status line.
	pub fn message(&self) -> String {
		match self {
			AppError::Core(err) => err.status_line(),
			other => other.to_string(),
		}
	}

	pub fn to_command_error(&self) -> CommandError {
		CommandError {
			code: self.code(),
			message: self.message(),
		}
	}
}
