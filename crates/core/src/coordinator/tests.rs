use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use autoanswer_protocol::CommandResponse;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::connect::TabInfo;
use crate::history::today_utc;
use crate::store::MemoryStore;

#[derive(Default)]
struct FakeTabs {
	url: String,
	loaded: Cell<bool>,
	controller_active: Cell<bool>,
	injections: Cell<usize>,
	/// Makes enable commands yield once so another request can interleave.
	slow_enable: bool,
}

impl FakeTabs {
	fn on(url: &str) -> Self {
		Self {
			url: url.to_string(),
			..Default::default()
		}
	}
}

#[async_trait(?Send)]
impl TabChannel for FakeTabs {
	async fn active_tab(&self) -> Result<Option<TabInfo>> {
		Ok(Some(TabInfo {
			id: 4,
			url: Some(self.url.clone()),
		}))
	}

	async fn send_command(&self, _tab_id: i32, command: SelectorCommand) -> std::result::Result<CommandResponse, ChannelError> {
		if command == SelectorCommand::EnableSelector && self.slow_enable {
			tokio::task::yield_now().await;
		}
		if !self.loaded.get() {
			return Err(ChannelError::Delivery("Could not establish connection.".into()));
		}
		self.controller_active.set(command == SelectorCommand::EnableSelector);
		Ok(CommandResponse::ok(match command {
			SelectorCommand::EnableSelector => "Selector enabled",
			SelectorCommand::DisableSelector => "Selector disabled",
		}))
	}

	async fn inject_controller(&self, _tab_id: i32) -> std::result::Result<(), ChannelError> {
		self.injections.set(self.injections.get() + 1);
		self.loaded.set(true);
		Ok(())
	}

	async fn pause(&self, _delay: Duration) {}
}

#[derive(Clone, Default)]
struct RecordingPanel(Rc<RefCell<Vec<PanelMessage>>>);

impl PanelPort for RecordingPanel {
	fn post(&self, message: &PanelMessage) -> std::result::Result<(), ChannelError> {
		self.0.borrow_mut().push(message.clone());
		Ok(())
	}
}

fn coordinator(tabs: FakeTabs) -> Coordinator<FakeTabs, MemoryStore> {
	Coordinator::new(tabs, MemoryStore::new())
}

#[tokio::test]
async fn enable_injects_controller_when_missing() {
	let coord = coordinator(FakeTabs::on("https://shop.example/help"));

	let response = coord.handle(RuntimeRequest::EnableSelector).await;

	assert!(response.success, "{response:?}");
	assert_eq!(response.message.as_deref(), Some("Selector enabled"));
	assert_eq!(coord.channel().injections.get(), 1);
	assert!(coord.channel().controller_active.get());
}

#[tokio::test]
async fn enable_on_unsupported_page_reports_status_line() {
	let coord = coordinator(FakeTabs::on("chrome://newtab"));

	let response = coord.handle(RuntimeRequest::EnableSelector).await;

	assert!(!response.success);
	assert_eq!(response.error.as_deref(), Some("Selector is not available on this page"));
	assert_eq!(coord.channel().injections.get(), 0);
}

#[tokio::test]
async fn enable_superseded_by_disable_is_reported() {
	let tabs = FakeTabs {
		slow_enable: true,
		..FakeTabs::on("https://example.com")
	};
	tabs.loaded.set(true);
	let coord = coordinator(tabs);

	let (enable, disable) = tokio::join!(
		coord.handle(RuntimeRequest::EnableSelector),
		coord.handle(RuntimeRequest::DisableSelector)
	);

	assert!(disable.success);
	assert!(!enable.success);
	assert_eq!(enable.error.as_deref(), Some(SUPERSEDED_MESSAGE));
	assert!(!coord.channel().controller_active.get(), "stale enable must not leave the page active");
}

#[tokio::test]
async fn enable_superseded_by_enable_stays_active() {
	let tabs = FakeTabs {
		slow_enable: true,
		..FakeTabs::on("https://example.com")
	};
	tabs.loaded.set(true);
	let coord = coordinator(tabs);

	let (first, second) = tokio::join!(
		coord.handle(RuntimeRequest::EnableSelector),
		coord.handle(RuntimeRequest::EnableSelector)
	);

	assert_eq!(first.error.as_deref(), Some(SUPERSEDED_MESSAGE));
	assert!(second.success);
	assert!(coord.channel().controller_active.get());
}

#[tokio::test]
async fn element_selected_is_stored_and_relayed_to_panel() {
	let coord = coordinator(FakeTabs::on("https://example.com"));
	let panel = RecordingPanel::default();
	coord.connect_panel(Box::new(panel.clone()));

	let response = coord
		.handle(RuntimeRequest::ElementSelected {
			text: "How do I reset my password?".into(),
		})
		.await;

	assert!(response.success);
	assert_eq!(
		settings::last_selected_text(coord.store()).await.unwrap().as_deref(),
		Some("How do I reset my password?")
	);
	assert_eq!(
		panel.0.borrow().as_slice(),
		&[PanelMessage::ElementSelected {
			text: "How do I reset my password?".into()
		}]
	);
}

#[tokio::test]
async fn element_selected_without_panel_still_stores_text() {
	let coord = coordinator(FakeTabs::on("https://example.com"));
	coord.connect_panel(Box::new(RecordingPanel::default()));
	coord.disconnect_panel();
	assert!(!coord.has_panel());

	let response = coord.handle(RuntimeRequest::ElementSelected { text: "hi".into() }).await;

	assert!(response.success);
	assert_eq!(settings::last_selected_text(coord.store()).await.unwrap().as_deref(), Some("hi"));
}

#[tokio::test]
async fn generate_answer_saves_answer_and_history() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/chat/completions"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"choices": [{ "message": { "role": "assistant", "content": "Use the reset link." } }]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let coord = coordinator(FakeTabs::on("https://example.com")).with_api_base(server.uri());
	tabs::set_current_tab_id(coord.store(), 2).await.unwrap();

	let response = coord
		.handle(RuntimeRequest::GenerateAnswer {
			text: "Forgot password".into(),
			api_key: "sk-test".into(),
			model: None,
			positive_prompt: Some("Be short".into()),
			negative_prompt: None,
			base_content: None,
		})
		.await;

	assert_eq!(response.answer.as_deref(), Some("Use the reset link."));
	assert_eq!(
		settings::last_generated_answer(coord.store()).await.unwrap().as_deref(),
		Some("Use the reset link.")
	);

	let days = HistoryLog::new(coord.store(), 2).days().await.unwrap();
	assert_eq!(days.len(), 1);
	assert_eq!(days[0].entries[0].question, "Forgot password");
	assert_eq!(days[0].key, format!("tab_2_history_{}", today_utc().format("%Y-%m-%d")));
}

#[tokio::test]
async fn generate_without_key_fails_fast() {
	let coord = coordinator(FakeTabs::on("https://example.com"));

	let response = coord
		.handle(RuntimeRequest::GenerateAnswer {
			text: "q".into(),
			api_key: "  ".into(),
			model: None,
			positive_prompt: None,
			negative_prompt: None,
			base_content: None,
		})
		.await;

	assert!(!response.success);
	assert_eq!(response.error.as_deref(), Some("API key is not configured"));
}

#[tokio::test]
async fn test_api_reports_model_count() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/models"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "id": "a" }, { "id": "b" }] })))
		.mount(&server)
		.await;

	let coord = coordinator(FakeTabs::on("https://example.com")).with_api_base(server.uri());
	let response = coord.handle(RuntimeRequest::TestApi { api_key: "sk-x".into() }).await;

	assert!(response.success);
	assert_eq!(response.message.as_deref(), Some("Connected! Available models: 2"));
}

#[tokio::test]
async fn refine_remote_error_is_surfaced() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(429).set_body_json(json!({
			"error": { "message": "Rate limit reached" }
		})))
		.mount(&server)
		.await;

	let coord = coordinator(FakeTabs::on("https://example.com")).with_api_base(server.uri());
	let response = coord
		.handle(RuntimeRequest::RefineAnswer {
			answer: "hi".into(),
			instructions: "longer".into(),
			api_key: "sk-x".into(),
			model: Some("gpt-4o".into()),
		})
		.await;

	assert!(!response.success);
	assert_eq!(response.error.as_deref(), Some("Rate limit reached"));
}
