use async_trait::async_trait;
use autoanswer::store::{KeyValueStore, StoreMap};
use autoanswer::{Error, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::{chrome, from_js, stringify_js_error, to_js};

/// [`KeyValueStore`] over `chrome.storage.local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

fn storage_error(err: JsValue) -> Error {
    Error::Storage(stringify_js_error(&err))
}

async fn settle(promise: std::result::Result<js_sys::Promise, JsValue>) -> Result<JsValue> {
    let promise = promise.map_err(storage_error)?;
    JsFuture::from(promise).await.map_err(storage_error)
}

#[async_trait(?Send)]
impl KeyValueStore for ChromeStorage {
    async fn get(&self, keys: &[&str]) -> Result<StoreMap> {
        let keys = to_js(keys).map_err(storage_error)?;
        let items = settle(chrome::storage_local_get(&keys)).await?;
        from_js(items).map_err(storage_error)
    }

    async fn get_all(&self) -> Result<StoreMap> {
        let items = settle(chrome::storage_local_get(&JsValue::NULL)).await?;
        from_js(items).map_err(storage_error)
    }

    async fn set(&self, items: StoreMap) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let items = to_js(&items).map_err(storage_error)?;
        settle(chrome::storage_local_set(&items)).await?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let keys = to_js(keys).map_err(storage_error)?;
        settle(chrome::storage_local_remove(&keys)).await?;
        Ok(())
    }
}
