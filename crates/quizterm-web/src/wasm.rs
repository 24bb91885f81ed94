#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for [`QuizConsole`].
//!
//! Method names are the function names the backend calls, so the page glue
//! can expose them one-to-one.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise, Reflect};
use quizterm_core::{Console, ConsoleConfig};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom::{DomHost, SharedConsole};
use crate::logging::{init_browser_tracing, parse_level};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("panic at {}:{}:{}: {info}", loc.file(), loc.line(), loc.column()),
                None => format!("panic: {info}"),
            };
            console_error(&msg);
        }));
    });
}

/// Install browser-console tracing at `level` (`"info"` when omitted).
///
/// Returns `false` when a subscriber was already installed.
#[wasm_bindgen(js_name = initTracing)]
pub fn init_tracing(level: Option<String>) -> bool {
    install_panic_hook();
    init_browser_tracing(parse_level(level.as_deref()))
}

/// The console page controller.
///
/// ```js
/// const console = new QuizConsole();
/// eel.expose((t) => console.print(t), "print");
/// eel.expose((p) => console.get_input(p), "get_input");
/// ```
#[wasm_bindgen]
pub struct QuizConsole {
    inner: Rc<SharedConsole>,
}

impl QuizConsole {
    fn with<T: Default>(&self, op: &'static str, f: impl FnOnce(&mut Console<DomHost>) -> T) -> T {
        match self.inner.try_borrow_mut() {
            Ok(mut console) => f(&mut console),
            Err(_) => {
                warn!(target: "quizterm_web::exports", op, "console busy, call skipped");
                T::default()
            }
        }
    }
}

#[wasm_bindgen]
impl QuizConsole {
    /// Create a console bound to the current document.
    ///
    /// `config_json` is an optional JSON `ConsoleConfig`; omitted fields
    /// keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<QuizConsole, JsValue> {
        install_panic_hook();
        let config = match config_json.as_deref() {
            Some(json) => ConsoleConfig::from_json_str(json),
            None => Ok(ConsoleConfig::default()),
        }
        .and_then(ConsoleConfig::validated)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("QuizConsole needs a window with a document"))?;

        let ids = config.dom.clone();
        let inner = Rc::new_cyclic(|weak| {
            RefCell::new(Console::new(config, DomHost::new(document, ids, weak.clone())))
        });
        Ok(Self { inner })
    }

    pub fn print(&self, text: &str) {
        self.with("print", |c| c.print(text));
    }

    pub fn clear_screen(&self) {
        self.with("clear_screen", Console::clear_screen);
    }

    /// Show `prompt` and return the input buffer (empty until the player
    /// commits). The backend polls this until it is non-empty.
    pub fn get_input(&self, prompt: &str) -> String {
        self.with("get_input", |c| c.get_input(prompt))
    }

    /// Show `prompt` and resolve with the next committed line.
    pub fn get_input_async(&self, prompt: &str) -> Promise {
        let next = self.with("get_input_async", |c| Some(c.get_input_async(prompt)));
        wasm_bindgen_futures::future_to_promise(async move {
            match next {
                Some(next) => Ok(JsValue::from_str(&next.await)),
                None => Err(JsValue::from_str("console busy")),
            }
        })
    }

    pub fn clear_input_buffer(&self) {
        self.with("clear_input_buffer", Console::clear_input_buffer);
    }

    /// The field's live text, without consuming it.
    pub fn force_get_input(&self) -> String {
        self.with("force_get_input", |c| c.force_get_input())
    }

    /// Commit `id` as the player's choice, as if typed and entered.
    pub fn choose_item(&self, id: &str) {
        self.with("choose_item", |c| c.choose_item(id));
    }

    pub fn set_title(&self, title: &str) {
        self.with("set_title", |c| c.set_title(title));
    }

    pub fn close_window(&self) {
        self.with("close_window", Console::close_window);
    }
}
