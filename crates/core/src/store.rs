//! Abstract key-value persistence.
//!
//! Mirrors the `chrome.storage.local` surface: JSON values under flat string
//! keys, last write wins. The extension backs it with browser storage, the CLI
//! with a JSON file, and tests with [`MemoryStore`].

use std::cell::RefCell;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

pub type StoreMap = serde_json::Map<String, Value>;

#[async_trait(?Send)]
pub trait KeyValueStore {
	/// Returns the subset of `keys` that exist.
	async fn get(&self, keys: &[&str]) -> Result<StoreMap>;

	async fn get_all(&self) -> Result<StoreMap>;

	/// Writes every entry of `items`, replacing existing values.
	async fn set(&self, items: StoreMap) -> Result<()>;

	/// Deletes `keys`. Missing keys are ignored.
	async fn remove(&self, keys: &[&str]) -> Result<()>;
}

/// Reads and deserializes one key. `null` and missing keys yield `None`.
pub async fn get_value<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
	T: DeserializeOwned,
	S: KeyValueStore + ?Sized,
{
	let mut found = store.get(&[key]).await?;
	match found.remove(key) {
		None | Some(Value::Null) => Ok(None),
		Some(value) => Ok(Some(serde_json::from_value(value)?)),
	}
}

/// Serializes and writes one key.
pub async fn set_value<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
	T: Serialize + ?Sized,
	S: KeyValueStore + ?Sized,
{
	let mut items = StoreMap::new();
	items.insert(key.to_string(), serde_json::to_value(value)?);
	store.set(items).await
}

/// In-process store; also the reference behaviour for other backends.
#[derive(Debug, Default)]
pub struct MemoryStore {
	data: RefCell<StoreMap>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_map(data: StoreMap) -> Self {
		Self {
			data: RefCell::new(data),
		}
	}

	pub fn snapshot(&self) -> StoreMap {
		self.data.borrow().clone()
	}
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
	async fn get(&self, keys: &[&str]) -> Result<StoreMap> {
		let data = self.data.borrow();
		Ok(keys
			.iter()
			.filter_map(|k| data.get(*k).map(|v| (k.to_string(), v.clone())))
			.collect())
	}

	async fn get_all(&self) -> Result<StoreMap> {
		Ok(self.snapshot())
	}

	async fn set(&self, items: StoreMap) -> Result<()> {
		self.data.borrow_mut().extend(items);
		Ok(())
	}

	async fn remove(&self, keys: &[&str]) -> Result<()> {
		let mut data = self.data.borrow_mut();
		for key in keys {
			data.remove(*key);
		}
		Ok(())
	}
}
