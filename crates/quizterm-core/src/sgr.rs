#![forbid(unsafe_code)]

//! Stateful ANSI SGR to HTML conversion.
//!
//! Unlike [`crate::ColourTable::translate`], which swaps literal tokens for
//! span openers, [`SgrConverter`] parses `ESC [ params m` sequences, tracks
//! the active attributes, escapes the text, and emits one balanced span per
//! styled run. Classes reuse the `colour-code-<name>` vocabulary so the same
//! stylesheet serves both renderers.
//!
//! Non-SGR control sequences and stray `ESC` bytes are not interpreted; they
//! pass through as text.

use std::fmt::Write as _;

use bitflags::bitflags;
use v_htmlescape::escape;

use crate::colour::CLASS_PREFIX;

const ESC: u8 = 0x1b;

bitflags! {
    /// Text attributes toggled by SGR parameters.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SgrAttrs: u8 {
        const BOLD          = 0b0000_0001;
        const DIM           = 0b0000_0010;
        const ITALIC        = 0b0000_0100;
        const UNDERLINE     = 0b0000_1000;
        const BLINK         = 0b0001_0000;
        const INVERT        = 0b0010_0000;
        const STRIKETHROUGH = 0b0100_0000;
    }
}

static ATTR_CLASSES: [(SgrAttrs, &str); 7] = [
    (SgrAttrs::BOLD, "bold"),
    (SgrAttrs::DIM, "dim"),
    (SgrAttrs::ITALIC, "italic"),
    (SgrAttrs::UNDERLINE, "underline"),
    (SgrAttrs::BLINK, "blink"),
    (SgrAttrs::INVERT, "invert"),
    (SgrAttrs::STRIKETHROUGH, "strikethrough"),
];

const FG_CLASSES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

/// Active style between two SGR sequences.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SgrState {
    pub attrs: SgrAttrs,
    pub fg: Option<&'static str>,
}

impl SgrState {
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.attrs.is_empty() && self.fg.is_none()
    }

    /// Apply the parameter list of one SGR sequence.
    pub fn apply(&mut self, params: &str) {
        if params.is_empty() {
            *self = Self::default();
            return;
        }
        let mut values = params
            .split(';')
            .map(|p| if p.is_empty() { Some(0) } else { p.parse::<u16>().ok() });
        while let Some(value) = values.next() {
            let Some(value) = value else {
                continue;
            };
            match value {
                0 => *self = Self::default(),
                1 => self.attrs.insert(SgrAttrs::BOLD),
                2 => self.attrs.insert(SgrAttrs::DIM),
                3 => self.attrs.insert(SgrAttrs::ITALIC),
                4 => self.attrs.insert(SgrAttrs::UNDERLINE),
                5 | 6 => self.attrs.insert(SgrAttrs::BLINK),
                7 => self.attrs.insert(SgrAttrs::INVERT),
                9 => self.attrs.insert(SgrAttrs::STRIKETHROUGH),
                22 => self.attrs.remove(SgrAttrs::BOLD | SgrAttrs::DIM),
                23 => self.attrs.remove(SgrAttrs::ITALIC),
                24 => self.attrs.remove(SgrAttrs::UNDERLINE),
                25 => self.attrs.remove(SgrAttrs::BLINK),
                27 => self.attrs.remove(SgrAttrs::INVERT),
                29 => self.attrs.remove(SgrAttrs::STRIKETHROUGH),
                30..=37 => self.fg = Some(FG_CLASSES[usize::from(value - 30)]),
                39 => self.fg = None,
                90 => self.fg = Some("grey"),
                // Extended colours carry their own arguments; skip them so
                // `38;5;1` is not read as blink + bold.
                38 | 48 => match values.next().flatten() {
                    Some(5) => {
                        values.next();
                    }
                    Some(2) => {
                        values.next();
                        values.next();
                        values.next();
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    fn write_open_tag(&self, out: &mut String) {
        out.push_str("<span class=\"");
        let mut first = true;
        let names = ATTR_CLASSES
            .iter()
            .filter(|(flag, _)| self.attrs.contains(*flag))
            .map(|(_, name)| *name)
            .chain(self.fg);
        for name in names {
            if !first {
                out.push(' ');
            }
            first = false;
            out.push_str(CLASS_PREFIX);
            out.push_str(name);
        }
        out.push_str("\">");
    }
}

/// Converts text containing ANSI SGR sequences into escaped HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct SgrConverter;

impl SgrConverter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Convert one line. Style does not carry over between calls and the
    /// output always closes what it opens.
    #[must_use]
    pub fn convert(&self, text: &str) -> String {
        let mut writer = HtmlWriter::with_capacity(text.len() + 32);
        let bytes = text.as_bytes();
        let mut state = SgrState::default();
        let mut run_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != ESC {
                i += 1;
                continue;
            }
            match parse_sgr(&bytes[i..]) {
                Some((len, params)) => {
                    writer.write_run(&text[run_start..i], state);
                    // `params` is ASCII digits and ';' by construction.
                    state.apply(std::str::from_utf8(params).unwrap_or_default());
                    i += len;
                    run_start = i;
                }
                None => i += 1,
            }
        }
        writer.write_run(&text[run_start..], state);
        writer.finish()
    }
}

struct HtmlWriter {
    out: String,
    emitted: SgrState,
    open: bool,
}

impl HtmlWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            emitted: SgrState::default(),
            open: false,
        }
    }

    fn write_run(&mut self, run: &str, state: SgrState) {
        if run.is_empty() {
            return;
        }
        if state != self.emitted {
            if self.open {
                self.out.push_str("</span>");
                self.open = false;
            }
            if !state.is_plain() {
                state.write_open_tag(&mut self.out);
                self.open = true;
            }
            self.emitted = state;
        }
        let _ = write!(self.out, "{}", escape(run));
    }

    fn finish(mut self) -> String {
        if self.open {
            self.out.push_str("</span>");
        }
        self.out
    }
}

/// Match `ESC [ params m` at the start of `bytes`, returning the sequence
/// length and the parameter bytes. Any other CSI, or an unterminated one,
/// yields `None`.
fn parse_sgr(bytes: &[u8]) -> Option<(usize, &[u8])> {
    if bytes.len() < 3 || bytes[0] != ESC || bytes[1] != b'[' {
        return None;
    }
    let params_end = bytes[2..]
        .iter()
        .position(|b| !(b.is_ascii_digit() || *b == b';'))
        .map(|p| p + 2)?;
    (bytes[params_end] == b'm').then(|| (params_end + 1, &bytes[2..params_end]))
}
