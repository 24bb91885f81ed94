#![forbid(unsafe_code)]

//! The controller behind the backend-callable functions.
//!
//! [`Console`] owns the print sink, the input bridge, and the page host. Each
//! public method corresponds to one function exposed to the backend and,
//! like those functions, never fails: problems are logged and the call
//! degrades to a no-op.

use tracing::{debug, warn};

use crate::colour::ColourTable;
use crate::config::ConsoleConfig;
use crate::host::PageHost;
use crate::input_bridge::{EventOutcome, InputBridge, InputEvent};
use crate::oneshot::{ArmedListener, ListenerId, NextCommit};
use crate::print_sink::PrintSink;

/// Print, prompt, and input state for one page.
#[derive(Debug)]
pub struct Console<H> {
    config: ConsoleConfig,
    sink: PrintSink,
    bridge: InputBridge,
    host: H,
}

impl<H: PageHost> Console<H> {
    /// Build a console using the built-in table named by `config`.
    pub fn new(config: ConsoleConfig, host: H) -> Self {
        let table = ColourTable::from_kind(config.colour_table);
        Self::with_table(config, table, host)
    }

    /// Build a console with a custom token table.
    pub fn with_table(config: ConsoleConfig, table: ColourTable, host: H) -> Self {
        let sink = PrintSink::new(table, config.render_mode);
        let bridge = InputBridge::new(config.input.clone());
        Self {
            config,
            sink,
            bridge,
            host,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    #[must_use]
    pub fn table(&self) -> &ColourTable {
        self.sink.table()
    }

    /// The pending input listener, if any.
    #[must_use]
    pub fn armed_listener(&self) -> Option<ArmedListener> {
        self.bridge.armed()
    }

    pub fn print(&mut self, text: &str) {
        self.sink.print(text, &mut self.host);
    }

    pub fn clear_screen(&mut self) {
        self.sink.clear_screen(&mut self.host);
    }

    /// Show `prompt`, make sure a listener is armed, and return the buffer.
    pub fn get_input(&mut self, prompt: &str) -> String {
        let prompt_html = if self.config.translate_prompt {
            self.sink.table().translate(prompt)
        } else {
            prompt.to_owned()
        };
        self.bridge.get_input(&prompt_html, &mut self.host)
    }

    /// Like [`Self::get_input`], but resolves on the next commit instead of
    /// returning the current buffer.
    pub fn get_input_async(&mut self, prompt: &str) -> NextCommit {
        let next = self.bridge.next_commit();
        let _ = self.get_input(prompt);
        next
    }

    pub fn clear_input_buffer(&mut self) {
        self.bridge.clear_input_buffer(&mut self.host);
    }

    #[must_use]
    pub fn force_get_input(&self) -> String {
        self.bridge.force_get_input()
    }

    pub fn choose_item(&mut self, id: &str) {
        self.bridge.choose_item(id, &mut self.host);
    }

    /// Route a page event from listener `id` into the input bridge.
    pub fn dispatch(&mut self, id: ListenerId, event: InputEvent) -> EventOutcome {
        self.bridge.handle_event(id, event, &mut self.host)
    }

    pub fn set_title(&mut self, title: &str) {
        let full = format!("{}{title}", self.config.title_prefix);
        match self.host.set_document_title(&full) {
            Ok(()) => debug!(target: "quizterm_core::window", title = %full, "title set"),
            Err(err) => warn!(target: "quizterm_core::window", %err, "failed to set title"),
        }
    }

    pub fn close_window(&mut self) {
        debug!(target: "quizterm_core::window", "closing window");
        if let Err(err) = self.host.close_window() {
            warn!(target: "quizterm_core::window", %err, "failed to close window");
        }
    }
}

impl<H: PageHost + Default> Default for Console<H> {
    fn default() -> Self {
        Self::new(ConsoleConfig::default(), H::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::input_bridge::COMMIT_KEY;
    use crate::print_sink::RenderMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_is_translated() {
        let mut console = Console::<MemoryHost>::default();
        console.get_input("[33mPick:");
        assert_eq!(
            console.host().prompt,
            "<span class=\"colour-code-yellow\">Pick:</span>"
        );
    }

    #[test]
    fn prompt_translation_can_be_disabled() {
        let config = ConsoleConfig {
            translate_prompt: false,
            ..ConsoleConfig::default()
        };
        let mut console = Console::new(config, MemoryHost::new());
        console.get_input("[33mPick:");
        assert_eq!(console.host().prompt, "[33mPick:");
    }

    #[test]
    fn title_gets_prefix() {
        let mut console = Console::<MemoryHost>::default();
        console.set_title("Main Menu");
        assert_eq!(console.host().title, "Quiz Game UI | Main Menu");
    }

    #[test]
    fn close_window_reaches_host() {
        let mut console = Console::<MemoryHost>::default();
        console.close_window();
        let host = console.into_host();
        assert!(host.closed);
        assert!(host.output.is_empty());
    }

    #[test]
    fn custom_table_drives_print_and_prompt() {
        let table = ColourTable::new([("HIGHLIGHT", "{hl}")]).unwrap();
        let mut console = Console::with_table(ConsoleConfig::default(), table, MemoryHost::new());
        console.print("{hl}x");
        assert_eq!(
            console.host().output,
            "<span class=\"colour-code-highlight\">x</span><br>"
        );
        assert_eq!(console.table().len(), 1);
    }

    #[test]
    fn escape_table_from_config() {
        let config = ConsoleConfig {
            colour_table: crate::colour::TableKind::Escape,
            render_mode: RenderMode::Tokens,
            ..ConsoleConfig::default()
        };
        let mut console = Console::new(config, MemoryHost::new());
        console.print("\u{1b}[1mbold");
        assert_eq!(
            console.host().output,
            "<span class=\"colour-code-bold\">bold</span><br>"
        );
    }

    #[test]
    fn dispatch_routes_to_bridge() {
        let mut console = Console::<MemoryHost>::default();
        console.get_input("?");
        let id = console.armed_listener().unwrap().id;
        console.host_mut().input = "7".into();
        assert_eq!(
            console.dispatch(id, InputEvent::key(COMMIT_KEY)),
            EventOutcome::Committed("7".into())
        );
        assert_eq!(console.get_input("?"), "7");
    }
}
