#![forbid(unsafe_code)]

//! Host-neutral core of the quiz console page.
//!
//! # Role in quizterm
//! The game backend drives a browser page through a handful of exposed
//! functions: print a line, clear the screen, read a line of input. This
//! crate implements those functions against the [`PageHost`] trait so the
//! same logic runs in the browser (`quizterm-web`) and in native tests
//! ([`MemoryHost`]).
//!
//! # Pieces
//! - [`ColourTable`]: colour-code tokens to `colour-code-*` span openers.
//! - [`SgrConverter`]: stateful, escaping ANSI SGR to HTML.
//! - [`PrintSink`]: renders and appends printed lines.
//! - [`InputBridge`]: polled line input over a one-shot commit listener.
//! - [`Console`]: ties the above to one page and one [`ConsoleConfig`].
//!
//! Everything runs on the page's single event-loop thread; the types use
//! `Rc`/`RefCell` and are not `Send`.

pub mod colour;
pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod input_bridge;
pub mod oneshot;
pub mod print_sink;
pub mod sgr;

pub use colour::{CLASS_PREFIX, ColourCode, ColourTable, TableKind, ThemeRole};
pub use config::{ConsoleConfig, DomIds};
pub use console::Console;
pub use error::{ColourTableError, ConfigError, HostError};
pub use host::{MemoryHost, PageHost};
pub use input_bridge::{EmptyCommitPolicy, EventOutcome, InputBridge, InputEvent, InputOptions};
pub use oneshot::{ArmedListener, CommitTrigger, ListenerId, ListenerState, NextCommit};
pub use print_sink::{PrintSink, RenderMode};
pub use sgr::SgrConverter;
