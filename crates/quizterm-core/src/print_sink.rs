#![forbid(unsafe_code)]

//! Line output into the page's scrollback container.

use tracing::{trace, warn};

use crate::colour::ColourTable;
use crate::host::PageHost;
use crate::sgr::SgrConverter;

/// Line break appended after every printed line.
pub const LINE_BREAK: &str = "<br>";

/// How printed text becomes markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum RenderMode {
    /// Token table translation ([`ColourTable::translate`]).
    #[default]
    Tokens,
    /// Stateful SGR parsing with HTML escaping ([`SgrConverter`]).
    Sgr,
    /// Raw text, no colour handling.
    Plain,
}

/// Renders backend text and appends it to the output container.
#[derive(Debug, Clone, Default)]
pub struct PrintSink {
    table: ColourTable,
    mode: RenderMode,
    sgr: SgrConverter,
}

impl PrintSink {
    #[must_use]
    pub fn new(table: ColourTable, mode: RenderMode) -> Self {
        Self {
            table,
            mode,
            sgr: SgrConverter::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &ColourTable {
        &self.table
    }

    #[must_use]
    pub const fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Markup for one line, without the trailing break.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        match self.mode {
            RenderMode::Tokens => self.table.translate(text),
            RenderMode::Sgr => self.sgr.convert(text),
            RenderMode::Plain => text.to_owned(),
        }
    }

    /// Log `text`, then append its rendering and a line break.
    ///
    /// Falls back to appending the literal text and a separate break element
    /// when the markup append is rejected. If the break cannot be added the
    /// text ends in `\n`, which the page collapses; if the text cannot be
    /// added the line is logged and dropped.
    pub fn print(&self, text: &str, host: &mut impl PageHost) {
        host.console_log(text);

        let mut html = self.render(text);
        html.push_str(LINE_BREAK);
        trace!(target: "quizterm_core::print", mode = ?self.mode, bytes = html.len(), "append line");

        let Err(err) = host.append_output_html(&html) else {
            return;
        };
        warn!(target: "quizterm_core::print", %err, "markup append failed, appending text");

        if let Err(err) = host.append_output_text(text) {
            warn!(target: "quizterm_core::print", %err, "dropping printed line");
            return;
        }
        if let Err(err) = host.append_output_break() {
            warn!(target: "quizterm_core::print", %err, "line break append failed");
            if let Err(err) = host.append_output_text("\n") {
                warn!(target: "quizterm_core::print", %err, "line left unterminated");
            }
        }
    }

    /// Empty the output container.
    pub fn clear_screen(&self, host: &mut impl PageHost) {
        if let Err(err) = host.clear_output() {
            warn!(target: "quizterm_core::print", %err, "failed to clear output");
        }
    }
}
