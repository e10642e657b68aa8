use std::time::Duration;

use async_trait::async_trait;
use autoanswer::connect::{ChannelError, TabChannel, TabInfo};
use autoanswer::{Error, Result};
use autoanswer_ext_bridge::{chrome, from_js, sleep, stringify_js_error, to_js};
use autoanswer_protocol::{CommandResponse, SelectorCommand, CONTENT_SCRIPT_FILE};
use serde::Deserialize;
use serde_json::json;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

#[derive(Debug, Deserialize)]
struct Tab {
    id: Option<i32>,
    url: Option<String>,
}

/// [`TabChannel`] over `chrome.tabs` and `chrome.scripting`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

async fn settle(
    promise: std::result::Result<js_sys::Promise, JsValue>,
) -> std::result::Result<JsValue, String> {
    let promise = promise.map_err(|e| stringify_js_error(&e))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| stringify_js_error(&e))
}

#[async_trait(?Send)]
impl TabChannel for ChromeTabs {
    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        let unreachable = |reason: String| Error::CoordinatorUnreachable { reason };

        let query = to_js(&json!({ "active": true, "currentWindow": true }))
            .map_err(|e| unreachable(stringify_js_error(&e)))?;
        let found = JsFuture::from(chrome::tabs_query(&query))
            .await
            .map_err(|e| unreachable(stringify_js_error(&e)))?;
        let tabs: Vec<Tab> = from_js(found).map_err(|e| unreachable(stringify_js_error(&e)))?;

        Ok(tabs
            .into_iter()
            .find_map(|tab| Some(TabInfo { id: tab.id?, url: tab.url })))
    }

    async fn send_command(
        &self,
        tab_id: i32,
        command: SelectorCommand,
    ) -> std::result::Result<CommandResponse, ChannelError> {
        let message = to_js(&command).map_err(|e| ChannelError::Delivery(stringify_js_error(&e)))?;
        let reply = settle(chrome::tabs_send_message(tab_id, &message))
            .await
            .map_err(ChannelError::Delivery)?;
        if reply.is_undefined() || reply.is_null() {
            return Err(ChannelError::Delivery("selector sent no response".into()));
        }
        from_js(reply).map_err(|e| ChannelError::Delivery(stringify_js_error(&e)))
    }

    async fn inject_controller(&self, tab_id: i32) -> std::result::Result<(), ChannelError> {
        let injection = to_js(&json!({
            "target": { "tabId": tab_id },
            "files": [CONTENT_SCRIPT_FILE],
        }))
        .map_err(|e| ChannelError::Injection(stringify_js_error(&e)))?;
        settle(chrome::scripting_execute_script(&injection))
            .await
            .map_err(ChannelError::Injection)?;
        Ok(())
    }

    async fn pause(&self, delay: Duration) {
        sleep(delay).await;
    }
}
