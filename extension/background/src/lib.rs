//! Service worker: hosts the [`Coordinator`] and wires it to `chrome.runtime`.

mod tabs;

use std::cell::RefCell;
use std::rc::Rc;

use autoanswer::connect::ChannelError;
use autoanswer::{Coordinator, PanelPort};
use autoanswer_ext_bridge::chrome::{self, Port};
use autoanswer_ext_bridge::{
    from_js, init_logging, respond_later, stringify_js_error, to_js, ChromeStorage,
};
use autoanswer_protocol::{PanelMessage, RuntimeRequest, PANEL_PORT_NAME};
use js_sys::Reflect;
use tracing::{debug, info, Level};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::tabs::ChromeTabs;

type Service = Coordinator<ChromeTabs, ChromeStorage>;

thread_local! {
    static COORDINATOR: RefCell<Option<Rc<Service>>> = const { RefCell::new(None) };
}

fn coordinator() -> Rc<Service> {
    COORDINATOR.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| Rc::new(Coordinator::new(ChromeTabs, ChromeStorage)))
            .clone()
    })
}

/// The popup's long-lived port.
struct PanelConnection(Port);

impl PanelPort for PanelConnection {
    fn post(&self, message: &PanelMessage) -> Result<(), ChannelError> {
        let value = to_js(message).map_err(|e| ChannelError::Delivery(stringify_js_error(&e)))?;
        self.0
            .post_message(&value)
            .map_err(|e| ChannelError::Delivery(stringify_js_error(&e)))
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    init_logging(Level::INFO);

    // Runtime requests
    {
        let on_message = Closure::<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>::new(
            |message: JsValue, _sender: JsValue, send_response: js_sys::Function| {
                let request = match from_js::<RuntimeRequest>(message) {
                    Ok(request) => request,
                    Err(err) => {
                        debug!(target = "autoanswer", error = %stringify_js_error(&err), "ignoring message");
                        return JsValue::FALSE;
                    }
                };
                let coordinator = coordinator();
                respond_later(send_response, async move { coordinator.handle(request).await });
                JsValue::TRUE
            },
        );
        chrome::runtime_on_message_add_listener(&on_message);
        on_message.forget();
    }

    // Panel connections
    {
        let on_connect = Closure::<dyn FnMut(Port)>::new(|port: Port| {
            if port.name() != PANEL_PORT_NAME {
                debug!(target = "autoanswer", name = %port.name(), "ignoring port");
                return;
            }

            let on_disconnect = Closure::<dyn FnMut(JsValue)>::new(|_| {
                coordinator().disconnect_panel();
            });
            port.on_disconnect()
                .add_listener(on_disconnect.as_ref().unchecked_ref());
            on_disconnect.forget();

            coordinator().connect_panel(Box::new(PanelConnection(port)));
        });
        chrome::runtime_on_connect_add_listener(&on_connect);
        on_connect.forget();
    }

    {
        let on_installed = Closure::<dyn FnMut(JsValue)>::new(|details: JsValue| {
            let reason = Reflect::get(&details, &JsValue::from_str("reason"))
                .ok()
                .and_then(|r| r.as_string())
                .unwrap_or_default();
            info!(target = "autoanswer", %reason, "extension installed");
        });
        chrome::runtime_on_installed_add_listener(&on_installed);
        on_installed.forget();
    }

    info!(target = "autoanswer", "service worker started");
}
