use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("no active tab found")]
	NoActiveTab,

	/// The active page cannot host the selector (extension pages, `chrome://`, etc.).
	#[error("selector is unavailable on this page: {url}")]
	UnsupportedPage { url: String },

	/// Selector command could not be delivered, even after injecting the controller.
	#[error("failed to reach the selector controller: {reason}")]
	CoordinatorUnreachable { reason: String },

	/// Non-success response from the generation service.
	///
	/// `message` is the service's own error text when it sent one.
	#[error("{message}")]
	RemoteService { status: Option<u16>, message: String },

	#[error("the generation service returned no answer")]
	EmptyAnswer,

	#[error("API key is not configured")]
	MissingApiKey,

	#[error("invalid API key: {0}")]
	InvalidApiKey(&'static str),

	#[error("history entry not found: {key}[{index}]")]
	HistoryEntryNotFound { key: String, index: usize },

	#[error("storage failed: {0}")]
	Storage(String),

	#[error(transparent)]
	Http(#[from] reqwest::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Short single-line status suitable for the user-visible layer.
	pub fn status_line(&self) -> String {
		match self {
			Error::NoActiveTab => "No active tab found".to_string(),
			Error::UnsupportedPage { .. } => "Selector is not available on this page".to_string(),
			Error::CoordinatorUnreachable { reason } => format!("Could not initialize the selector: {reason}"),
			Error::RemoteService { message, .. } => message.clone(),
			Error::Http(err) => format!("Connection error: {err}"),
			other => other.to_string(),
		}
	}

	/// True for errors that come from the hosted generation service or the way to it.
	pub fn is_remote(&self) -> bool {
		matches!(self, Error::RemoteService { .. } | Error::EmptyAnswer | Error::Http(_))
	}
}
