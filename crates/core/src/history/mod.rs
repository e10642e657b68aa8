//! Per-tab question/answer history, bucketed by calendar day.
//!
//! Each day lives under its own key, `tab_{id}_history_{YYYY-MM-DD}`, holding a
//! JSON array of [`HistoryEntry`] in insertion order. Day keys use the UTC
//! date; the displayed `time` uses the caller's local offset.

#[cfg(test)]
mod tests;

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::{KeyValueStore, StoreMap, get_value, set_value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const PREVIEW_CHARS: usize = 50;

/// Days shown by the compact history widget.
pub const RECENT_DAYS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
	/// Local wall-clock time, `HH:MM`.
	pub time: String,
	pub question: String,
	pub answer: String,
	/// RFC 3339 creation instant.
	pub timestamp: String,
}

impl HistoryEntry {
	pub fn new(question: impl Into<String>, answer: impl Into<String>, now: DateTime<FixedOffset>) -> Self {
		Self {
			time: now.format("%H:%M").to_string(),
			question: question.into(),
			answer: answer.into(),
			timestamp: now.to_rfc3339(),
		}
	}

	pub fn matches(&self, needle_lower: &str) -> bool {
		self.question.to_lowercase().contains(needle_lower) || self.answer.to_lowercase().contains(needle_lower)
	}

	pub fn preview(&self) -> String {
		preview(&self.question)
	}
}

/// All entries of one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDay {
	pub key: String,
	pub date: NaiveDate,
	pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
	pub total: usize,
	/// Entries dated within the last seven days, today included.
	pub week: usize,
	pub today: usize,
}

/// Today's date as used in day keys.
pub fn today_utc() -> NaiveDate {
	Utc::now().date_naive()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// "Today", "Yesterday", or a short date such as "17 Oct 2026".
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
	if date == today {
		"Today".to_string()
	} else if today.pred_opt() == Some(date) {
		"Yesterday".to_string()
	} else {
		date.format("%-d %b %Y").to_string()
	}
}

pub fn preview(question: &str) -> String {
	crate::text::preview(question, PREVIEW_CHARS)
}

/// History of one workspace tab.
pub struct HistoryLog<'a, S: KeyValueStore + ?Sized> {
	store: &'a S,
	tab_id: u32,
}

impl<'a, S: KeyValueStore + ?Sized> HistoryLog<'a, S> {
	pub fn new(store: &'a S, tab_id: u32) -> Self {
		Self { store, tab_id }
	}

	pub fn tab_id(&self) -> u32 {
		self.tab_id
	}

	fn prefix(&self) -> String {
		format!("tab_{}_history_", self.tab_id)
	}

	pub fn day_key(&self, date: NaiveDate) -> String {
		format!("{}{}", self.prefix(), date.format(DATE_FORMAT))
	}

	/// Appends an entry stamped with the current time.
	pub async fn append(&self, question: &str, answer: &str) -> Result<HistoryEntry> {
		self.append_at(question, answer, Local::now().fixed_offset()).await
	}

	pub async fn append_at(&self, question: &str, answer: &str, now: DateTime<FixedOffset>) -> Result<HistoryEntry> {
		let key = self.day_key(now.with_timezone(&Utc).date_naive());
		let mut entries: Vec<HistoryEntry> = get_value(self.store, &key).await?.unwrap_or_default();

		let entry = HistoryEntry::new(question, answer, now);
		entries.push(entry.clone());
		set_value(self.store, &key, &entries).await?;

		info!(target = "autoanswer", key = %key, count = entries.len(), "history entry saved");
		Ok(entry)
	}

	/// Every stored day, newest first. Keys with an unparsable date are skipped.
	pub async fn days(&self) -> Result<Vec<HistoryDay>> {
		let prefix = self.prefix();
		let all = self.store.get_all().await?;

		let mut days = Vec::new();
		for (key, value) in all {
			let Some(raw_date) = key.strip_prefix(&prefix) else {
				continue;
			};
			let Some(date) = parse_date(raw_date) else {
				debug!(target = "autoanswer", key = %key, "skipping history key with malformed date");
				continue;
			};
			let entries: Vec<HistoryEntry> = match value {
				Value::Null => Vec::new(),
				other => serde_json::from_value(other)?,
			};
			if entries.is_empty() {
				continue;
			}
			days.push(HistoryDay { key, date, entries });
		}

		days.sort_by(|a, b| b.date.cmp(&a.date));
		Ok(days)
	}

	/// The `n` newest days.
	pub async fn recent(&self, n: usize) -> Result<Vec<HistoryDay>> {
		let mut days = self.days().await?;
		days.truncate(n);
		Ok(days)
	}

	pub async fn entry(&self, date: NaiveDate, index: usize) -> Result<HistoryEntry> {
		let key = self.day_key(date);
		let entries: Vec<HistoryEntry> = get_value(self.store, &key).await?.unwrap_or_default();
		entries
			.into_iter()
			.nth(index)
			.ok_or(Error::HistoryEntryNotFound { key, index })
	}

	/// Days containing at least one entry whose question or answer contains
	/// `query`, ignoring case. A blank query returns everything.
	pub async fn search(&self, query: &str) -> Result<Vec<HistoryDay>> {
		let days = self.days().await?;
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			return Ok(days);
		}

		Ok(days
			.into_iter()
			.filter_map(|mut day| {
				day.entries.retain(|e| e.matches(&needle));
				(!day.entries.is_empty()).then_some(day)
			})
			.collect())
	}

	/// Removes one entry. The day key itself goes away with its last entry.
	pub async fn delete(&self, date: NaiveDate, index: usize) -> Result<HistoryEntry> {
		let key = self.day_key(date);
		let mut entries: Vec<HistoryEntry> = get_value(self.store, &key).await?.unwrap_or_default();
		if index >= entries.len() {
			return Err(Error::HistoryEntryNotFound { key, index });
		}

		let removed = entries.remove(index);
		if entries.is_empty() {
			self.store.remove(&[key.as_str()]).await?;
		} else {
			set_value(self.store, &key, &entries).await?;
		}

		info!(target = "autoanswer", key = %key, index, remaining = entries.len(), "history entry deleted");
		Ok(removed)
	}

	/// Deletes every day of this tab; returns how many days were removed.
	pub async fn clear(&self) -> Result<usize> {
		let prefix = self.prefix();
		let keys: Vec<String> = self
			.store
			.get_all()
			.await?
			.into_iter()
			.map(|(key, _)| key)
			.filter(|key| key.starts_with(&prefix))
			.collect();

		let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
		if !refs.is_empty() {
			self.store.remove(&refs).await?;
		}

		info!(target = "autoanswer", tab_id = self.tab_id, days = keys.len(), "history cleared");
		Ok(keys.len())
	}

	pub async fn stats(&self, today: NaiveDate) -> Result<HistoryStats> {
		// Seven calendar days ending today.
		let week_start = today.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN);

		let mut stats = HistoryStats::default();
		for day in self.days().await? {
			let count = day.entries.len();
			stats.total += count;
			if day.date == today {
				stats.today += count;
			}
			if day.date >= week_start {
				stats.week += count;
			}
		}
		Ok(stats)
	}

	/// Pretty-printed JSON object of every day, keyed by storage key.
	pub async fn export(&self) -> Result<String> {
		let mut doc = StoreMap::new();
		for day in self.days().await? {
			doc.insert(day.key, serde_json::to_value(day.entries)?);
		}
		Ok(serde_json::to_string_pretty(&Value::Object(doc))?)
	}
}
