//! Core of the autoanswer browser extension.
//!
//! Platform-independent pieces shared by the wasm extension contexts and the
//! native `aa` CLI: the element selector state machine, command delivery to
//! page tabs, the service-worker coordinator, the answer generation client,
//! and the key-value backed settings, tabs and history.

pub mod connect;
pub mod coordinator;
pub mod error;
pub mod generate;
pub mod history;
pub mod selector;
pub mod settings;
pub mod store;
pub mod tabs;
pub mod text;

pub use autoanswer_protocol as protocol;
pub use connect::{ConnectOutcome, ConnectPolicy, TabChannel, TabInfo};
pub use coordinator::{Coordinator, PanelPort};
pub use error::{Error, Result};
pub use generate::{GenerationClient, PromptConfig};
pub use history::{HistoryEntry, HistoryLog};
pub use selector::SelectorController;
pub use settings::Settings;
pub use store::{KeyValueStore, MemoryStore};
