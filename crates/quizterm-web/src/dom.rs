#![forbid(unsafe_code)]

//! [`PageHost`] over the live DOM.

use std::cell::RefCell;
use std::rc::Weak;

use quizterm_core::{ArmedListener, Console, DomIds, HostError, InputEvent, ListenerId, PageHost};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlInputElement, KeyboardEvent};

pub(crate) type SharedConsole = RefCell<Console<DomHost>>;

type ListenerClosure = Closure<dyn FnMut(web_sys::Event)>;

struct AttachedListener {
    id: ListenerId,
    event: &'static str,
    target: HtmlInputElement,
    closure: ListenerClosure,
}

impl AttachedListener {
    fn remove(&self) -> Result<(), HostError> {
        self.target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref())
            .map_err(js_error)
    }
}

/// DOM-backed page host.
///
/// Listener closures call back into the console that owns this host, so the
/// host keeps a weak handle to it.
pub(crate) struct DomHost {
    document: Document,
    ids: DomIds,
    console: Weak<SharedConsole>,
    attached: Option<AttachedListener>,
    /// Detached closures wait here until the next attach: a listener detaches
    /// itself from inside its own dispatch, where it must not be dropped.
    retired: Vec<AttachedListener>,
}

impl DomHost {
    pub(crate) fn new(document: Document, ids: DomIds, console: Weak<SharedConsole>) -> Self {
        Self {
            document,
            ids,
            console,
            attached: None,
            retired: Vec::new(),
        }
    }

    fn element(&self, id: &str) -> Result<Element, HostError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| HostError::MissingElement(id.to_owned()))
    }

    fn input(&self) -> Result<HtmlInputElement, HostError> {
        self.element(&self.ids.input)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| HostError::Js(format!("#{} is not an <input>", self.ids.input)))
    }

    fn listener_closure(&self, id: ListenerId) -> ListenerClosure {
        let console = self.console.clone();
        Closure::new(move |event: web_sys::Event| {
            let Some(console) = console.upgrade() else {
                return;
            };
            let input_event = match event.dyn_ref::<KeyboardEvent>() {
                Some(key) => InputEvent::KeyPress { key: key.key() },
                None => InputEvent::Change,
            };
            let Ok(mut console) = console.try_borrow_mut() else {
                warn!(target: "quizterm_web::dom", listener = %id, "console busy, event dropped");
                return;
            };
            console.dispatch(id, input_event);
        })
    }
}

impl PageHost for DomHost {
    fn console_log(&mut self, text: &str) {
        web_sys::console::log_1(&JsValue::from_str(text));
    }

    fn append_output_html(&mut self, html: &str) -> Result<(), HostError> {
        self.element(&self.ids.output)?
            .insert_adjacent_html("beforeend", html)
            .map_err(js_error)
    }

    fn append_output_text(&mut self, text: &str) -> Result<(), HostError> {
        self.element(&self.ids.output)?
            .append_with_str_1(text)
            .map_err(js_error)
    }

    fn append_output_break(&mut self) -> Result<(), HostError> {
        let br = self.document.create_element("br").map_err(js_error)?;
        self.element(&self.ids.output)?
            .append_child(&br)
            .map_err(js_error)?;
        Ok(())
    }

    fn clear_output(&mut self) -> Result<(), HostError> {
        let output = self.element(&self.ids.output)?;
        output.set_inner_html("");
        output.scroll_into_view();
        Ok(())
    }

    fn set_prompt_html(&mut self, html: &str) -> Result<(), HostError> {
        self.element(&self.ids.input_prompt)?.set_inner_html(html);
        Ok(())
    }

    fn input_value(&self) -> Result<String, HostError> {
        Ok(self.input()?.value())
    }

    fn set_input_value(&mut self, value: &str) -> Result<(), HostError> {
        self.input()?.set_value(value);
        Ok(())
    }

    fn scroll_input_into_view(&mut self) -> Result<(), HostError> {
        self.input()?.scroll_into_view();
        Ok(())
    }

    fn attach_listener(&mut self, listener: &ArmedListener) -> Result<(), HostError> {
        let target = self.input()?;
        self.retired.clear();
        if let Some(previous) = self.attached.take() {
            previous.remove()?;
        }

        let event = listener.trigger.dom_event();
        let closure = self.listener_closure(listener.id);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        debug!(target: "quizterm_web::dom", listener = %listener.id, event, "listener attached");

        self.attached = Some(AttachedListener {
            id: listener.id,
            event,
            target,
            closure,
        });
        Ok(())
    }

    fn detach_listener(&mut self, id: ListenerId) -> Result<(), HostError> {
        let Some(attached) = self.attached.take_if(|a| a.id == id) else {
            return Ok(());
        };
        let removed = attached.remove();
        self.retired.push(attached);
        removed
    }

    fn set_document_title(&mut self, title: &str) -> Result<(), HostError> {
        self.document.set_title(title);
        Ok(())
    }

    fn close_window(&mut self) -> Result<(), HostError> {
        web_sys::window()
            .ok_or(HostError::Unsupported("close_window without a window"))?
            .close()
            .map_err(js_error)
    }
}

impl Drop for DomHost {
    fn drop(&mut self) {
        if let Some(attached) = self.attached.take()
            && let Err(err) = attached.remove()
        {
            warn!(target: "quizterm_web::dom", %err, "failed to remove listener on drop");
        }
    }
}

fn js_error(err: JsValue) -> HostError {
    HostError::Js(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
