#![forbid(unsafe_code)]

//! Browser front end for the quiz console.
//!
//! [`QuizConsole`] is a `wasm-bindgen` export wrapping
//! `quizterm_core::Console` over the page's output, prompt and input
//! elements. The backend bridge calls its methods by name.
//!
//! Everything except [`logging`] is compiled for `wasm32` only; host-side
//! behaviour is tested in `quizterm-core` against `MemoryHost`.

pub mod logging;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{QuizConsole, init_tracing};
