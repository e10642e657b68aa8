//! `web_sys` implementation of the selector's page surface.

use autoanswer::selector::{
    Highlight, KeyDisposition, PageSurface, Rect, SurfaceError, TargetKind, OVERLAY_ATTR,
    UI_ATTR,
};
use autoanswer_ext_bridge::stringify_js_error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent, Node};

use crate::{with_controller, ControllerHandle};

const HIGHLIGHT_STYLE: &str = "position: fixed; z-index: 2147483647; pointer-events: none; \
     border: 2px solid #667eea; background: rgba(102, 126, 234, 0.15); \
     box-sizing: border-box; border-radius: 4px; display: none;";

/// Page events the selector listens to while active, in capture phase.
const LISTENED_EVENTS: [&str; 3] = ["mousemove", "click", "keydown"];

struct Listeners {
    pointer: Closure<dyn FnMut(MouseEvent)>,
    click: Closure<dyn FnMut(MouseEvent)>,
    key: Closure<dyn FnMut(KeyboardEvent)>,
}

impl Listeners {
    fn new(handle: &ControllerHandle) -> Self {
        let pointer = {
            let handle = handle.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                let target = event_element(&event);
                with_controller(&handle, |c| c.on_pointer_move(target.as_ref()));
            })
        };

        let click = {
            let handle = handle.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                let target = event_element(&event);
                let disposition = with_controller(&handle, |c| c.on_click(target.as_ref()));
                if disposition.is_some_and(|d| d.cancels_default()) {
                    event.prevent_default();
                    event.stop_propagation();
                }
            })
        };

        let key = {
            let handle = handle.clone();
            Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let consumed = with_controller(&handle, |c| c.on_key(&key))
                    .is_some_and(|d| d == KeyDisposition::Consumed);
                if consumed {
                    event.prevent_default();
                    event.stop_propagation();
                }
            })
        };

        Self {
            pointer,
            click,
            key,
        }
    }

    fn bindings(&self) -> [(&'static str, &js_sys::Function); 3] {
        let [pointer, click, key] = LISTENED_EVENTS;
        [
            (pointer, self.pointer.as_ref().unchecked_ref()),
            (click, self.click.as_ref().unchecked_ref()),
            (key, self.key.as_ref().unchecked_ref()),
        ]
    }
}

fn event_element(event: &web_sys::Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

pub struct DomSurface {
    document: Document,
    controller: ControllerHandle,
    highlight: Option<HtmlElement>,
    listeners: Option<Listeners>,
    // Detached while one of them may still be running; dropped on next attach.
    retired: Vec<Listeners>,
}

impl DomSurface {
    pub fn new(document: Document, controller: ControllerHandle) -> Self {
        Self {
            document,
            controller,
            highlight: None,
            listeners: None,
            retired: Vec::new(),
        }
    }

    fn unregister(&self, listeners: &Listeners) {
        for (event, callback) in listeners.bindings() {
            let _ = self
                .document
                .remove_event_listener_with_callback_and_bool(event, callback, true);
        }
    }
}

impl PageSurface for DomSurface {
    type Element = Element;

    fn set_picking_cursor(&mut self, picking: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        let style = body.style();
        let _ = if picking {
            style.set_property("cursor", "crosshair")
        } else {
            style.remove_property("cursor").map(|_| ())
        };
    }

    fn attach_listeners(&mut self) -> Result<(), SurfaceError> {
        if self.listeners.is_some() {
            return Ok(());
        }
        self.retired.clear();

        let listeners = Listeners::new(&self.controller);
        for (event, callback) in listeners.bindings() {
            if let Err(err) = self
                .document
                .add_event_listener_with_callback_and_bool(event, callback, true)
            {
                self.unregister(&listeners);
                return Err(SurfaceError(format!(
                    "{event} listener: {}",
                    stringify_js_error(&err)
                )));
            }
        }
        self.listeners = Some(listeners);
        Ok(())
    }

    fn detach_listeners(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            self.unregister(&listeners);
            self.retired.push(listeners);
        }
    }

    fn mount_highlight(&mut self) -> Result<(), SurfaceError> {
        if self.highlight.is_some() {
            return Ok(());
        }
        let surface_error = |err: JsValue| SurfaceError(stringify_js_error(&err));

        let element = self
            .document
            .create_element("div")
            .map_err(surface_error)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SurfaceError("highlight is not an HTML element".into()))?;
        element
            .set_attribute(OVERLAY_ATTR, "")
            .map_err(surface_error)?;
        element.style().set_css_text(HIGHLIGHT_STYLE);

        let parent = self
            .document
            .body()
            .map(Element::from)
            .or_else(|| self.document.document_element())
            .ok_or_else(|| SurfaceError("page has no root element".into()))?;
        parent.append_child(&element).map_err(surface_error)?;

        self.highlight = Some(element);
        Ok(())
    }

    fn unmount_highlight(&mut self) {
        if let Some(element) = self.highlight.take() {
            element.remove();
        }
    }

    fn render_highlight(&mut self, highlight: Highlight) {
        let Some(element) = &self.highlight else {
            return;
        };
        let style = element.style();
        match highlight {
            Highlight::Hidden => {
                let _ = style.set_property("display", "none");
            }
            Highlight::Shown(rect) => {
                let _ = style.set_property("top", &format!("{}px", rect.top));
                let _ = style.set_property("left", &format!("{}px", rect.left));
                let _ = style.set_property("width", &format!("{}px", rect.width));
                let _ = style.set_property("height", &format!("{}px", rect.height));
                let _ = style.set_property("display", "block");
            }
        }
    }

    fn classify(&self, element: &Element) -> TargetKind {
        let node: &Node = element;
        if self
            .document
            .document_element()
            .is_some_and(|root| root.is_same_node(Some(node)))
        {
            return TargetKind::Root;
        }
        if self
            .document
            .body()
            .is_some_and(|body| body.is_same_node(Some(node)))
        {
            return TargetKind::Body;
        }
        let own_ui = format!("[{OVERLAY_ATTR}], [{UI_ATTR}]");
        if element.closest(&own_ui).ok().flatten().is_some() {
            return TargetKind::OwnUi;
        }
        TargetKind::Content
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let r = element.get_bounding_client_rect();
        Rect::new(r.top(), r.left(), r.width(), r.height())
    }

    fn inner_text(&self, element: &Element) -> String {
        element
            .dyn_ref::<HtmlElement>()
            .map(|e| e.inner_text())
            .filter(|text| !text.trim().is_empty())
            .or_else(|| element.text_content())
            .unwrap_or_default()
    }

    fn same_element(&self, a: &Element, b: &Element) -> bool {
        let b: &Node = b;
        a.is_same_node(Some(b))
    }
}

#[cfg(test)]
mod tests {
    use super::LISTENED_EVENTS;

    #[test]
    fn pointer_tracking_follows_every_move() {
        assert_eq!(LISTENED_EVENTS[0], "mousemove");
        assert!(!LISTENED_EVENTS.contains(&"mouseover"));
    }
}
