use chrono::TimeZone;

use super::*;
use crate::store::MemoryStore;

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<FixedOffset> {
	FixedOffset::east_opt(0)
		.and_then(|tz| tz.with_ymd_and_hms(y, m, d, hh, mm, 0).single())
		.unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn append_creates_dated_key_with_local_time() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 2);

	let entry = log.append_at("How to pay?", "By card.", at(2026, 10, 17, 9, 5)).await.unwrap();

	assert_eq!(entry.time, "09:05");
	assert!(entry.timestamp.starts_with("2026-10-17T09:05:00"));
	let snapshot = store.snapshot();
	let day = snapshot.get("tab_2_history_2026-10-17").unwrap();
	assert_eq!(day.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn day_key_uses_utc_date() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	let late_evening_west = FixedOffset::west_opt(5 * 3600)
		.and_then(|tz| tz.with_ymd_and_hms(2026, 10, 16, 22, 30, 0).single())
		.unwrap();

	let entry = log.append_at("q", "a", late_evening_west).await.unwrap();

	assert_eq!(entry.time, "22:30");
	assert!(store.snapshot().contains_key("tab_1_history_2026-10-17"));
}

#[tokio::test]
async fn days_are_newest_first_and_isolated_per_tab() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	log.append_at("old", "a", at(2026, 10, 1, 8, 0)).await.unwrap();
	log.append_at("new", "b", at(2026, 10, 17, 8, 0)).await.unwrap();
	log.append_at("mid", "c", at(2026, 10, 9, 8, 0)).await.unwrap();
	HistoryLog::new(&store, 2)
		.append_at("other tab", "d", at(2026, 10, 18, 8, 0))
		.await
		.unwrap();

	let dates: Vec<_> = log.days().await.unwrap().into_iter().map(|d| d.date).collect();
	assert_eq!(dates, vec![date(2026, 10, 17), date(2026, 10, 9), date(2026, 10, 1)]);

	let recent = log.recent(2).await.unwrap();
	assert_eq!(recent.len(), 2);
	assert_eq!(recent[0].entries[0].question, "new");
}

#[tokio::test]
async fn search_is_case_insensitive_over_question_and_answer() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	log.append_at("Refund policy?", "Within 14 days.", at(2026, 10, 16, 10, 0)).await.unwrap();
	log.append_at("Shipping time", "About a week", at(2026, 10, 16, 11, 0)).await.unwrap();
	log.append_at("Opening hours", "We offer a REFUND too", at(2026, 10, 17, 10, 0)).await.unwrap();

	let hits = log.search("refund").await.unwrap();
	let questions: Vec<_> = hits
		.iter()
		.flat_map(|d| d.entries.iter().map(|e| e.question.as_str()))
		.collect();
	assert_eq!(questions, vec!["Opening hours", "Refund policy?"]);

	assert!(log.search("nothing like this").await.unwrap().is_empty());
	assert_eq!(log.search("  ").await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_last_entry_removes_day_key() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	log.append_at("first", "a", at(2026, 10, 17, 10, 0)).await.unwrap();
	log.append_at("second", "b", at(2026, 10, 17, 11, 0)).await.unwrap();
	let day = date(2026, 10, 17);

	let removed = log.delete(day, 0).await.unwrap();
	assert_eq!(removed.question, "first");
	assert_eq!(log.entry(day, 0).await.unwrap().question, "second");

	log.delete(day, 0).await.unwrap();
	assert!(!store.snapshot().contains_key("tab_1_history_2026-10-17"));
}

#[tokio::test]
async fn missing_entry_is_reported() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);

	let err = log.delete(date(2026, 10, 17), 3).await.unwrap_err();
	assert!(matches!(err, Error::HistoryEntryNotFound { index: 3, .. }));
	assert!(log.entry(date(2026, 10, 17), 0).await.is_err());
}

#[tokio::test]
async fn stats_count_today_week_and_total() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	log.append_at("a", "a", at(2026, 10, 17, 9, 0)).await.unwrap();
	log.append_at("b", "b", at(2026, 10, 17, 10, 0)).await.unwrap();
	log.append_at("c", "c", at(2026, 10, 12, 10, 0)).await.unwrap();
	log.append_at("d", "d", at(2026, 9, 1, 10, 0)).await.unwrap();

	let stats = log.stats(date(2026, 10, 17)).await.unwrap();
	assert_eq!(
		stats,
		HistoryStats {
			total: 4,
			week: 3,
			today: 2
		}
	);
}

#[tokio::test]
async fn week_covers_seven_calendar_days_including_today() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	log.append_at("six days back", "a", at(2026, 10, 11, 10, 0)).await.unwrap();
	log.append_at("seven days back", "b", at(2026, 10, 10, 10, 0)).await.unwrap();

	let stats = log.stats(date(2026, 10, 17)).await.unwrap();
	assert_eq!(
		stats,
		HistoryStats {
			total: 2,
			week: 1,
			today: 0
		}
	);
}

#[tokio::test]
async fn clear_only_touches_own_tab() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	log.append_at("a", "a", at(2026, 10, 16, 9, 0)).await.unwrap();
	log.append_at("b", "b", at(2026, 10, 17, 9, 0)).await.unwrap();
	HistoryLog::new(&store, 3).append_at("c", "c", at(2026, 10, 17, 9, 0)).await.unwrap();

	assert_eq!(log.clear().await.unwrap(), 2);
	assert!(log.days().await.unwrap().is_empty());
	assert_eq!(HistoryLog::new(&store, 3).days().await.unwrap().len(), 1);
}

#[tokio::test]
async fn export_is_keyed_by_storage_key() {
	let store = MemoryStore::new();
	let log = HistoryLog::new(&store, 1);
	log.append_at("q", "a", at(2026, 10, 17, 9, 0)).await.unwrap();

	let exported: serde_json::Value = serde_json::from_str(&log.export().await.unwrap()).unwrap();
	assert_eq!(exported["tab_1_history_2026-10-17"][0]["question"], "q");
}

#[test]
fn day_labels() {
	let today = date(2026, 10, 17);
	assert_eq!(day_label(today, today), "Today");
	assert_eq!(day_label(date(2026, 10, 16), today), "Yesterday");
	assert_eq!(day_label(date(2026, 10, 3), today), "3 Oct 2026");
}

#[test]
fn preview_cuts_long_questions() {
	let long = "q".repeat(80);
	let shown = preview(&long);
	assert_eq!(shown.chars().count(), 53);
	assert!(shown.ends_with("..."));
	assert_eq!(preview("short"), "short");
}
