//! File-backed key-value store for the CLI.
//!
//! The whole store is one JSON object on disk with the same key layout as the
//! extension's `chrome.storage.local`, so settings and history can be moved
//! between the two by copying values.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use autoanswer::store::{KeyValueStore, StoreMap};
use tracing::debug;

use crate::error::Result;

/// Default location: `$XDG_CONFIG_HOME/autoanswer/storage.json`.
pub fn default_store_path() -> PathBuf {
	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
		.unwrap_or_else(|| PathBuf::from("."));

	config_home.join("autoanswer").join("storage.json")
}

#[derive(Debug, Clone)]
pub struct FileStore {
	path: PathBuf,
}

impl FileStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read(&self) -> Result<StoreMap> {
		Ok(load_json::<StoreMap>(&self.path)?.unwrap_or_default())
	}

	fn write(&self, data: &StoreMap) -> Result<()> {
		save_private_json(&self.path, data)?;
		debug!(target = "autoanswer", path = %self.path.display(), keys = data.len(), "store written");
		Ok(())
	}
}

fn core_err(err: crate::error::AppError) -> autoanswer::Error {
	autoanswer::Error::Storage(err.to_string())
}

#[async_trait(?Send)]
impl KeyValueStore for FileStore {
	async fn get(&self, keys: &[&str]) -> autoanswer::Result<StoreMap> {
		let mut data = self.read().map_err(core_err)?;
		Ok(keys
			.iter()
			.filter_map(|k| data.remove(*k).map(|v| (k.to_string(), v)))
			.collect())
	}

	async fn get_all(&self) -> autoanswer::Result<StoreMap> {
		self.read().map_err(core_err)
	}

	async fn set(&self, items: StoreMap) -> autoanswer::Result<()> {
		let mut data = self.read().map_err(core_err)?;
		data.extend(items);
		self.write(&data).map_err(core_err)
	}

	async fn remove(&self, keys: &[&str]) -> autoanswer::Result<()> {
		let mut data = self.read().map_err(core_err)?;
		let before = data.len();
		for key in keys {
			data.remove(*key);
		}
		if data.len() == before {
			return Ok(());
		}
		self.write(&data).map_err(core_err)
	}
}

/// Missing files read as `None`; unreadable or corrupt ones are errors.
fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
	match fs::read_to_string(path) {
		Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(err) => Err(err.into()),
	}
}

/// The store holds the API key, so it is written owner-only.
fn save_private_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, serde_json::to_string_pretty(data)?)?;
	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
	}
	Ok(())
}
