#![forbid(unsafe_code)]

//! The page surface the console drives.
//!
//! [`PageHost`] is everything the console needs from the browser page: the
//! output container, the prompt label, the input field, listener
//! registration, and the window. `quizterm-web` implements it over the DOM;
//! [`MemoryHost`] implements it in memory for tests and headless hosts.

use crate::error::HostError;
use crate::oneshot::{ArmedListener, ListenerId};

/// Page operations used by [`crate::Console`].
pub trait PageHost {
    /// Write a line to the diagnostic console. Never fails.
    fn console_log(&mut self, text: &str);

    /// Append markup to the output container.
    fn append_output_html(&mut self, html: &str) -> Result<(), HostError>;

    /// Append text to the output container without interpreting markup.
    fn append_output_text(&mut self, text: &str) -> Result<(), HostError>;

    /// Append a line-break element to the output container without going
    /// through the markup parser.
    fn append_output_break(&mut self) -> Result<(), HostError>;

    /// Empty the output container and scroll it into view.
    fn clear_output(&mut self) -> Result<(), HostError>;

    /// Replace the prompt label's markup.
    fn set_prompt_html(&mut self, html: &str) -> Result<(), HostError>;

    /// Current value of the input field.
    fn input_value(&self) -> Result<String, HostError>;

    fn set_input_value(&mut self, value: &str) -> Result<(), HostError>;

    fn scroll_input_into_view(&mut self) -> Result<(), HostError>;

    /// Subscribe `listener` to its trigger event on the input field.
    fn attach_listener(&mut self, listener: &ArmedListener) -> Result<(), HostError>;

    /// Remove a listener previously attached. May be called from inside that
    /// listener's own event dispatch.
    fn detach_listener(&mut self, id: ListenerId) -> Result<(), HostError>;

    fn set_document_title(&mut self, title: &str) -> Result<(), HostError>;

    fn close_window(&mut self) -> Result<(), HostError>;
}

/// In-memory page used by tests and non-browser embedders.
///
/// Every field is public so tests can type into the field, inspect the
/// output, or inject failures.
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    /// Output container markup.
    pub output: String,
    /// Lines written through [`PageHost::console_log`].
    pub console: Vec<String>,
    pub prompt: String,
    pub input: String,
    pub title: String,
    pub closed: bool,
    /// Listeners currently attached.
    pub listeners: Vec<ArmedListener>,
    /// Total successful attachments.
    pub attach_count: usize,
    pub input_scrolls: usize,
    pub output_clears: usize,
    /// Make `append_output_html` fail.
    pub fail_html: bool,
    /// Make `append_output_text` fail.
    pub fail_text: bool,
    /// Make `append_output_break` fail.
    pub fail_break: bool,
    /// Make `attach_listener` fail.
    pub fail_attach: bool,
    /// Make every input-field operation fail as if `#input` were missing.
    pub missing_input: bool,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The single attached listener, if exactly one is attached.
    #[must_use]
    pub fn attached(&self) -> Option<ArmedListener> {
        match self.listeners.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    fn input_field(&self) -> Result<(), HostError> {
        if self.missing_input {
            Err(HostError::MissingElement("input".into()))
        } else {
            Ok(())
        }
    }
}

impl PageHost for MemoryHost {
    fn console_log(&mut self, text: &str) {
        self.console.push(text.to_owned());
    }

    fn append_output_html(&mut self, html: &str) -> Result<(), HostError> {
        if self.fail_html {
            return Err(HostError::Js("innerHTML assignment rejected".into()));
        }
        self.output.push_str(html);
        Ok(())
    }

    fn append_output_text(&mut self, text: &str) -> Result<(), HostError> {
        if self.fail_text {
            return Err(HostError::MissingElement("output".into()));
        }
        self.output.push_str(text);
        Ok(())
    }

    fn append_output_break(&mut self) -> Result<(), HostError> {
        if self.fail_break {
            return Err(HostError::Js("appendChild rejected".into()));
        }
        self.output.push_str("<br>");
        Ok(())
    }

    fn clear_output(&mut self) -> Result<(), HostError> {
        self.output.clear();
        self.output_clears += 1;
        Ok(())
    }

    fn set_prompt_html(&mut self, html: &str) -> Result<(), HostError> {
        html.clone_into(&mut self.prompt);
        Ok(())
    }

    fn input_value(&self) -> Result<String, HostError> {
        self.input_field()?;
        Ok(self.input.clone())
    }

    fn set_input_value(&mut self, value: &str) -> Result<(), HostError> {
        self.input_field()?;
        value.clone_into(&mut self.input);
        Ok(())
    }

    fn scroll_input_into_view(&mut self) -> Result<(), HostError> {
        self.input_field()?;
        self.input_scrolls += 1;
        Ok(())
    }

    fn attach_listener(&mut self, listener: &ArmedListener) -> Result<(), HostError> {
        self.input_field()?;
        if self.fail_attach {
            return Err(HostError::Js("addEventListener failed".into()));
        }
        self.listeners.push(*listener);
        self.attach_count += 1;
        Ok(())
    }

    fn detach_listener(&mut self, id: ListenerId) -> Result<(), HostError> {
        self.listeners.retain(|l| l.id != id);
        Ok(())
    }

    fn set_document_title(&mut self, title: &str) -> Result<(), HostError> {
        title.clone_into(&mut self.title);
        Ok(())
    }

    fn close_window(&mut self) -> Result<(), HostError> {
        self.closed = true;
        Ok(())
    }
}
