#![forbid(unsafe_code)]

//! Tracing output routed to the browser console.
//!
//! `tracing-subscriber`'s fmt layer writes through [`std::io::Write`];
//! [`LineWriter`] buffers those bytes and hands each complete line to a
//! callback, which in the browser is `console.log`.

use std::io::{self, Write};
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

/// Default verbosity when the page does not ask for one.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

/// Line-buffering writer that forwards complete lines to `emit`.
///
/// A trailing partial line is emitted on `flush` or drop.
pub struct LineWriter<F: FnMut(&str)> {
    emit: F,
    buffer: Vec<u8>,
}

impl<F: FnMut(&str)> LineWriter<F> {
    pub fn new(emit: F) -> Self {
        Self {
            emit,
            buffer: Vec::with_capacity(256),
        }
    }

    fn emit_buffer(&mut self) {
        {
            let line = String::from_utf8_lossy(&self.buffer);
            (self.emit)(line.trim_end_matches('\r'));
        }
        self.buffer.clear();
    }
}

impl<F: FnMut(&str)> Write for LineWriter<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if byte == b'\n' {
                self.emit_buffer();
            } else {
                self.buffer.push(byte);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.emit_buffer();
        }
        Ok(())
    }
}

impl<F: FnMut(&str)> Drop for LineWriter<F> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Parse a level name (`"debug"`, `"warn"`, `"off"`, …), falling back to
/// [`DEFAULT_LEVEL`] for missing or unknown names.
#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|name| LevelFilter::from_str(name.trim()).ok())
        .unwrap_or(DEFAULT_LEVEL)
}

#[cfg(target_arch = "wasm32")]
pub use browser::init_browser_tracing;

#[cfg(target_arch = "wasm32")]
mod browser {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::Layer;
    use tracing_subscriber::fmt::{self, MakeWriter};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use wasm_bindgen::JsValue;

    use super::LineWriter;

    fn console_log(line: &str) {
        web_sys::console::log_1(&JsValue::from_str(line));
    }

    struct ConsoleMakeWriter;

    impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
        type Writer = LineWriter<fn(&str)>;

        fn make_writer(&'a self) -> Self::Writer {
            LineWriter::new(console_log as fn(&str))
        }
    }

    /// Install a global subscriber printing to the browser console.
    ///
    /// Returns `false` if a global subscriber was already set.
    pub fn init_browser_tracing(level: LevelFilter) -> bool {
        let layer = fmt::layer()
            .with_writer(ConsoleMakeWriter)
            .without_time()
            .with_target(true)
            .with_filter(level);
        tracing_subscriber::registry().with(layer).try_init().is_ok()
    }
}
