//! Content script: hosts the element selector inside a page.
//!
//! The service worker injects this module on demand, so it may be evaluated
//! more than once per page. Only the first evaluation wires anything up.

mod surface;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use autoanswer::selector::{Capture, CaptureSink, SelectorController};
use autoanswer_ext_bridge::{
    chrome, from_js, init_logging, respond_now, send_runtime_message, stringify_js_error,
};
use autoanswer_protocol::{CommandResponse, RuntimeRequest, RuntimeResponse, SelectorCommand};
use js_sys::Reflect;
use tracing::{debug, info, warn, Level};
use wasm_bindgen::prelude::*;

use crate::surface::DomSurface;

const LOADED_FLAG: &str = "__autoAnswerSelectorLoaded";

pub(crate) type Controller = SelectorController<DomSurface, RuntimeSink>;
pub(crate) type ControllerHandle = Weak<RefCell<Controller>>;

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<RefCell<Controller>>>> = const { RefCell::new(None) };
}

/// Forwards captured text to the service worker.
pub struct RuntimeSink;

impl CaptureSink for RuntimeSink {
    fn deliver(&mut self, capture: Capture) {
        wasm_bindgen_futures::spawn_local(async move {
            let request = RuntimeRequest::ElementSelected { text: capture.text };
            match send_runtime_message::<_, RuntimeResponse>(&request).await {
                Ok(reply) if reply.success => debug!(target = "autoanswer", "capture delivered"),
                Ok(reply) => {
                    warn!(target = "autoanswer", error = ?reply.error, "capture rejected")
                }
                Err(err) => warn!(
                    target = "autoanswer",
                    error = %stringify_js_error(&err),
                    "failed to send captured text"
                ),
            }
        });
    }
}

/// Runs `f` on the live controller. `None` when it is gone or already borrowed.
pub(crate) fn with_controller<R>(
    handle: &ControllerHandle,
    f: impl FnOnce(&mut Controller) -> R,
) -> Option<R> {
    let controller = handle.upgrade()?;
    let mut controller = controller.try_borrow_mut().ok()?;
    Some(f(&mut controller))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_logging(Level::INFO);

    let window = web_sys::window().ok_or("no window")?;
    let flag = JsValue::from_str(LOADED_FLAG);
    if Reflect::get(&window, &flag)?.is_truthy() {
        debug!(target = "autoanswer", "selector already loaded in this page");
        return Ok(());
    }
    Reflect::set(&window, &flag, &JsValue::TRUE)?;

    let document = window.document().ok_or("no document")?;
    let controller = Rc::new_cyclic(|handle: &ControllerHandle| {
        RefCell::new(SelectorController::new(
            DomSurface::new(document, handle.clone()),
            RuntimeSink,
        ))
    });
    listen_for_commands(Rc::downgrade(&controller));
    CONTROLLER.with(|slot| slot.replace(Some(controller)));

    info!(target = "autoanswer", "selector loaded");
    Ok(())
}

fn listen_for_commands(handle: ControllerHandle) {
    let on_message = Closure::<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>::new(
        move |message: JsValue, _sender: JsValue, send_response: js_sys::Function| {
            let Ok(command) = from_js::<SelectorCommand>(message) else {
                return JsValue::FALSE;
            };
            let response = with_controller(&handle, |c| apply(c, command))
                .unwrap_or_else(|| CommandResponse::failed("Selector is busy"));
            respond_now(&send_response, &response);
            JsValue::FALSE
        },
    );
    chrome::runtime_on_message_add_listener(&on_message);
    on_message.forget();
}

fn apply(controller: &mut Controller, command: SelectorCommand) -> CommandResponse {
    debug!(target = "autoanswer", action = command.action(), "selector command");
    match command {
        SelectorCommand::EnableSelector => match controller.enable() {
            Ok(_) => CommandResponse::ok("Selector enabled"),
            Err(err) => CommandResponse::failed(err.to_string()),
        },
        SelectorCommand::DisableSelector => {
            controller.disable();
            CommandResponse::ok("Selector disabled")
        }
    }
}
