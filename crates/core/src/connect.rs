//! Delivery of selector commands from the coordinator to the page controller.
//!
//! The controller may not be loaded in the page yet. Delivery is an explicit
//! two-step protocol: probe with the command, and on failure inject the
//! controller, wait a settle delay, then retry once.

use std::time::Duration;

use async_trait::async_trait;
use autoanswer_protocol::{CommandResponse, SelectorCommand};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Wait between injecting the controller and resending the command.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

const ELIGIBLE_SCHEMES: [&str; 3] = ["http://", "https://", "file://"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
	pub id: i32,
	pub url: Option<String>,
}

/// Only regular web and file documents can host the selector.
pub fn check_page_eligible(url: &str) -> Result<()> {
	if ELIGIBLE_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
		Ok(())
	} else {
		Err(Error::UnsupportedPage { url: url.to_string() })
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
	/// No receiver in the tab, or the message port closed early.
	#[error("{0}")]
	Delivery(String),
	#[error("{0}")]
	Injection(String),
}

/// Browser-side transport to page tabs.
#[async_trait(?Send)]
pub trait TabChannel {
	/// The focused tab of the current window, if any.
	async fn active_tab(&self) -> Result<Option<TabInfo>>;

	async fn send_command(&self, tab_id: i32, command: SelectorCommand) -> std::result::Result<CommandResponse, ChannelError>;

	/// Loads the page controller script into the tab.
	async fn inject_controller(&self, tab_id: i32) -> std::result::Result<(), ChannelError>;

	async fn pause(&self, delay: Duration);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
	/// The controller answered.
	Connected(CommandResponse),
	/// No controller answered; the reason is the delivery failure.
	NeedsInjection(String),
	/// Delivery failed even after injection.
	Unreachable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectPolicy {
	pub settle_delay: Duration,
}

impl Default for ConnectPolicy {
	fn default() -> Self {
		Self {
			settle_delay: DEFAULT_SETTLE_DELAY,
		}
	}
}

/// First step: send the command to whatever is loaded in the tab.
pub async fn probe<C: TabChannel + ?Sized>(channel: &C, tab_id: i32, command: SelectorCommand) -> ConnectOutcome {
	match channel.send_command(tab_id, command).await {
		Ok(response) => ConnectOutcome::Connected(response),
		Err(err) => {
			debug!(target = "autoanswer", tab_id, action = command.action(), error = %err, "controller not reachable");
			ConnectOutcome::NeedsInjection(err.to_string())
		}
	}
}

/// Full protocol: probe, then inject, settle, and retry once.
pub async fn establish<C: TabChannel + ?Sized>(
	channel: &C,
	tab_id: i32,
	command: SelectorCommand,
	policy: ConnectPolicy,
) -> ConnectOutcome {
	let reason = match probe(channel, tab_id, command).await {
		ConnectOutcome::NeedsInjection(reason) => reason,
		done => return done,
	};

	info!(target = "autoanswer", tab_id, reason = %reason, "injecting selector controller");
	if let Err(err) = channel.inject_controller(tab_id).await {
		warn!(target = "autoanswer", tab_id, error = %err, "controller injection failed");
		return ConnectOutcome::Unreachable(err.to_string());
	}

	channel.pause(policy.settle_delay).await;

	match channel.send_command(tab_id, command).await {
		Ok(response) => {
			info!(target = "autoanswer", tab_id, action = command.action(), "command delivered after injection");
			ConnectOutcome::Connected(response)
		}
		Err(err) => {
			warn!(target = "autoanswer", tab_id, error = %err, "command failed after injection");
			ConnectOutcome::Unreachable(err.to_string())
		}
	}
}

/// Sends `command` to the active tab's controller.
///
/// Only enabling injects the controller. Disabling a tab without a controller
/// succeeds, since nothing there can be active.
pub async fn deliver_selector_command<C: TabChannel + ?Sized>(
	channel: &C,
	command: SelectorCommand,
	policy: ConnectPolicy,
) -> Result<CommandResponse> {
	let tab = channel.active_tab().await?.ok_or(Error::NoActiveTab)?;
	deliver_to_tab(channel, &tab, command, policy).await
}

/// Like [`deliver_selector_command`] for an already resolved tab.
pub async fn deliver_to_tab<C: TabChannel + ?Sized>(
	channel: &C,
	tab: &TabInfo,
	command: SelectorCommand,
	policy: ConnectPolicy,
) -> Result<CommandResponse> {
	check_page_eligible(tab.url.as_deref().unwrap_or_default())?;

	let outcome = match command {
		SelectorCommand::EnableSelector => establish(channel, tab.id, command, policy).await,
		SelectorCommand::DisableSelector => match probe(channel, tab.id, command).await {
			ConnectOutcome::NeedsInjection(_) => ConnectOutcome::Connected(CommandResponse::ok("Selector not loaded")),
			done => done,
		},
	};

	match outcome {
		ConnectOutcome::Connected(response) => Ok(response),
		ConnectOutcome::NeedsInjection(reason) | ConnectOutcome::Unreachable(reason) => {
			Err(Error::CoordinatorUnreachable { reason })
		}
	}
}
