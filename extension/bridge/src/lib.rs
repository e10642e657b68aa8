//! Browser glue shared by the extension's wasm contexts.
//!
//! The core crate only knows traits ([`autoanswer::KeyValueStore`],
//! [`autoanswer::TabChannel`], ...). This crate supplies the `chrome.*`
//! bindings and the small conversions both the content script and the service
//! worker need to implement them.

pub mod chrome;
mod logging;
mod storage;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub use logging::{init_logging, ConsoleMakeWriter};
pub use storage::ChromeStorage;

pub fn stringify_js_error(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        return message;
    }
    if let Some(message) = js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return message;
    }
    js_sys::JSON::stringify(err)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Converts to a plain JS value. Maps become objects, not `Map`s.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

/// Resolves after `delay` via `setTimeout`.
pub async fn sleep(delay: Duration) {
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        chrome::set_timeout(&resolve, millis);
    });
    let _ = JsFuture::from(promise).await;
}

/// Sends one message to the extension runtime and decodes the reply.
pub async fn send_runtime_message<Req, Resp>(request: &Req) -> Result<Resp, JsValue>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let message = to_js(request)?;
    let reply = JsFuture::from(chrome::runtime_send_message(&message)?).await?;
    from_js(reply)
}

/// Runs `work` in the background and passes its output to `send_response`.
///
/// Listeners using this must return `true` so the channel stays open.
pub fn respond_later<T, F>(send_response: js_sys::Function, work: F)
where
    T: Serialize,
    F: Future<Output = T> + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        let reply = work.await;
        respond_now(&send_response, &reply);
    });
}

pub fn respond_now<T: Serialize>(send_response: &js_sys::Function, reply: &T) {
    match to_js(reply) {
        Ok(value) => {
            if let Err(err) = send_response.call1(&JsValue::UNDEFINED, &value) {
                tracing::warn!(target = "autoanswer", error = %stringify_js_error(&err), "sendResponse failed");
            }
        }
        Err(err) => {
            tracing::error!(target = "autoanswer", error = %stringify_js_error(&err), "reply not serializable");
        }
    }
}
