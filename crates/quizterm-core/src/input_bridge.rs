#![forbid(unsafe_code)]

//! Polled line input over an event-driven text field.
//!
//! The backend cannot block on a DOM event, so it polls
//! [`InputBridge::get_input`] until the returned value is non-empty. Each
//! poll shows the prompt and, if no listener is pending, arms one. The value
//! returned is whatever the buffer holds at that moment: empty until the
//! first commit, then the last committed line until the backend clears it.
//!
//! ```text
//!   get_input ──(Idle)──► attach listener ──► Armed
//!        ▲                                      │ key/change event
//!        │                                      ▼
//!        └──────── Idle ◄── detach ◄── buffer ← field value
//! ```

use tracing::{debug, trace, warn};

use crate::host::PageHost;
use crate::oneshot::{ArmedListener, CommitSignal, CommitTrigger, ListenerId, NextCommit, OneShotListener};

/// The key whose `keypress` commits the line under [`CommitTrigger::EnterKey`].
pub const COMMIT_KEY: &str = "Enter";

/// What to store when the user commits an empty field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum EmptyCommitPolicy {
    /// Store the empty string; a backend looping until non-empty keeps waiting.
    Keep,
    /// Store a single space so a blank Enter still ends the backend's loop.
    #[default]
    Space,
}

/// Input-field behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InputOptions {
    pub trigger: CommitTrigger,
    pub empty_commit: EmptyCommitPolicy,
    /// Blank the field after each commit.
    pub clear_field_on_commit: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            trigger: CommitTrigger::EnterKey,
            empty_commit: EmptyCommitPolicy::Space,
            clear_field_on_commit: false,
        }
    }
}

/// A page event delivered to an armed listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress { key: String },
    Change,
}

impl InputEvent {
    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyPress { key: key.into() }
    }
}

/// Result of delivering an [`InputEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The listener id is not the armed one.
    Stale,
    /// The event does not concern this listener's trigger.
    Ignored,
    /// A non-commit key refreshed the live snapshot.
    SnapshotUpdated,
    /// The line was committed with this value.
    Committed(String),
}

/// Input buffer, live snapshot, and the one-shot listener that fills them.
#[derive(Debug, Default)]
pub struct InputBridge {
    options: InputOptions,
    buffer: String,
    snapshot: String,
    listener: OneShotListener,
    commits: CommitSignal,
}

impl InputBridge {
    #[must_use]
    pub fn new(options: InputOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> &InputOptions {
        &self.options
    }

    /// Last committed value (or empty).
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The pending listener, if any.
    #[must_use]
    pub fn armed(&self) -> Option<ArmedListener> {
        self.listener.armed()
    }

    /// Show `prompt_html`, arm a listener if none is pending, and return the
    /// current buffer.
    pub fn get_input(&mut self, prompt_html: &str, host: &mut impl PageHost) -> String {
        if let Err(err) = host.set_prompt_html(prompt_html) {
            warn!(target: "quizterm_core::input", %err, "failed to show prompt");
        }

        match self
            .listener
            .arm_with(self.options.trigger, |l| host.attach_listener(l))
        {
            Ok(Some(listener)) => debug!(
                target: "quizterm_core::input",
                listener = %listener.id,
                event = listener.trigger.dom_event(),
                "armed input listener"
            ),
            Ok(None) => {}
            Err(err) => warn!(
                target: "quizterm_core::input",
                %err,
                "failed to arm input listener, next poll retries"
            ),
        }

        self.buffer.clone()
    }

    /// Deliver a page event to the listener registered as `id`.
    pub fn handle_event(
        &mut self,
        id: ListenerId,
        event: InputEvent,
        host: &mut impl PageHost,
    ) -> EventOutcome {
        let Some(armed) = self.listener.armed().filter(|l| l.id == id) else {
            trace!(target: "quizterm_core::input", listener = %id, "event for stale listener");
            return EventOutcome::Stale;
        };

        match (armed.trigger, event) {
            (CommitTrigger::EnterKey, InputEvent::KeyPress { key }) => {
                self.snapshot = self.read_field(&*host);
                if key != COMMIT_KEY {
                    return EventOutcome::SnapshotUpdated;
                }
                let value = self.snapshot.clone();
                self.commit(id, value, host)
            }
            (CommitTrigger::Change, InputEvent::Change) => {
                self.snapshot = self.read_field(&*host);
                let value = self.snapshot.clone();
                self.commit(id, value, host)
            }
            _ => EventOutcome::Ignored,
        }
    }

    /// Empty the buffer, the snapshot, and the field. Leaves a pending
    /// listener armed.
    pub fn clear_input_buffer(&mut self, host: &mut impl PageHost) {
        self.buffer.clear();
        self.snapshot.clear();
        if let Err(err) = host.set_input_value("") {
            warn!(target: "quizterm_core::input", %err, "failed to clear input field");
        }
    }

    /// Live text of the field as of the last key event, without consuming it.
    #[must_use]
    pub fn force_get_input(&self) -> String {
        self.snapshot.clone()
    }

    /// Commit `id` as if the user had typed it, for clickable choices.
    pub fn choose_item(&mut self, id: &str, host: &mut impl PageHost) {
        id.clone_into(&mut self.buffer);
        id.clone_into(&mut self.snapshot);
        if let Err(err) = host.set_input_value(id) {
            warn!(target: "quizterm_core::input", %err, "failed to mirror choice into field");
        }
        if let Err(err) = host.scroll_input_into_view() {
            warn!(target: "quizterm_core::input", %err, "failed to scroll to input");
        }
        self.commits.notify(id);
        debug!(target: "quizterm_core::input", choice = id, "item chosen");
    }

    /// Future resolved with the next committed (or chosen) value.
    pub fn next_commit(&mut self) -> NextCommit {
        self.commits.subscribe()
    }

    fn read_field(&self, host: &impl PageHost) -> String {
        host.input_value().unwrap_or_else(|err| {
            warn!(target: "quizterm_core::input", %err, "failed to read input field");
            self.snapshot.clone()
        })
    }

    fn commit(&mut self, id: ListenerId, value: String, host: &mut impl PageHost) -> EventOutcome {
        let value = match self.options.empty_commit {
            EmptyCommitPolicy::Space if value.is_empty() => " ".to_owned(),
            _ => value,
        };
        value.clone_into(&mut self.buffer);

        if self.options.clear_field_on_commit
            && let Err(err) = host.set_input_value("")
        {
            warn!(target: "quizterm_core::input", %err, "failed to clear input field");
        }

        self.listener.fire(id);
        if let Err(err) = host.detach_listener(id) {
            warn!(target: "quizterm_core::input", listener = %id, %err, "failed to detach listener");
        }

        let woken = self.commits.notify(&value);
        debug!(
            target: "quizterm_core::input",
            listener = %id,
            len = value.len(),
            woken,
            "input committed"
        );
        EventOutcome::Committed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn armed_id(bridge: &InputBridge) -> ListenerId {
        bridge.armed().expect("listener armed").id
    }

    #[test]
    fn first_poll_arms_and_returns_empty() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        assert_eq!(bridge.get_input("Name?", &mut host), "");
        assert_eq!(host.prompt, "Name?");
        assert_eq!(host.attach_count, 1);
        assert!(bridge.armed().is_some());
    }

    #[test]
    fn repeated_polls_attach_once() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        for _ in 0..5 {
            assert_eq!(bridge.get_input("?", &mut host), "");
        }
        assert_eq!(host.attach_count, 1);
        assert_eq!(host.attached(), bridge.armed());
    }

    #[test]
    fn enter_commits_and_disarms() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        bridge.get_input("?", &mut host);
        let id = armed_id(&bridge);

        host.input = "Ada".into();
        assert_eq!(
            bridge.handle_event(id, InputEvent::key("a"), &mut host),
            EventOutcome::SnapshotUpdated
        );
        assert_eq!(bridge.force_get_input(), "Ada");
        assert_eq!(bridge.buffer(), "");

        assert_eq!(
            bridge.handle_event(id, InputEvent::key(COMMIT_KEY), &mut host),
            EventOutcome::Committed("Ada".into())
        );
        assert!(bridge.armed().is_none());
        assert!(host.listeners.is_empty());
        assert_eq!(bridge.get_input("?", &mut host), "Ada");
        assert_eq!(host.attach_count, 2);
    }

    #[test]
    fn blank_enter_becomes_space() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        bridge.get_input("?", &mut host);
        let id = armed_id(&bridge);
        assert_eq!(
            bridge.handle_event(id, InputEvent::key(COMMIT_KEY), &mut host),
            EventOutcome::Committed(" ".into())
        );
        assert_eq!(bridge.buffer(), " ");
    }

    #[test]
    fn keep_policy_stores_empty() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::new(InputOptions {
            empty_commit: EmptyCommitPolicy::Keep,
            ..InputOptions::default()
        });
        bridge.get_input("?", &mut host);
        let id = armed_id(&bridge);
        bridge.handle_event(id, InputEvent::key(COMMIT_KEY), &mut host);
        assert_eq!(bridge.buffer(), "");
    }

    #[test]
    fn change_trigger_ignores_keys() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::new(InputOptions {
            trigger: CommitTrigger::Change,
            clear_field_on_commit: true,
            ..InputOptions::default()
        });
        assert_eq!(bridge.options().trigger, CommitTrigger::Change);
        bridge.get_input("?", &mut host);
        let id = armed_id(&bridge);
        assert_eq!(host.attached().map(|l| l.trigger), Some(CommitTrigger::Change));
        host.input = "3".into();
        assert_eq!(
            bridge.handle_event(id, InputEvent::key(COMMIT_KEY), &mut host),
            EventOutcome::Ignored
        );
        assert_eq!(
            bridge.handle_event(id, InputEvent::Change, &mut host),
            EventOutcome::Committed("3".into())
        );
        assert_eq!(host.input, "");
    }

    #[test]
    fn stale_listener_events_are_dropped() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        bridge.get_input("?", &mut host);
        let old = armed_id(&bridge);
        bridge.handle_event(old, InputEvent::key(COMMIT_KEY), &mut host);
        bridge.get_input("?", &mut host);
        host.input = "late".into();
        assert_eq!(
            bridge.handle_event(old, InputEvent::key(COMMIT_KEY), &mut host),
            EventOutcome::Stale
        );
        assert_eq!(bridge.buffer(), " ");
    }

    #[test]
    fn clear_keeps_listener_armed() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        bridge.get_input("?", &mut host);
        let id = armed_id(&bridge);
        host.input = "x".into();
        bridge.handle_event(id, InputEvent::key("x"), &mut host);

        bridge.clear_input_buffer(&mut host);
        assert_eq!(bridge.force_get_input(), "");
        assert_eq!(host.input, "");
        assert_eq!(bridge.armed().map(|l| l.id), Some(id));
        assert_eq!(bridge.get_input("?", &mut host), "");
    }

    #[test]
    fn choose_item_fills_buffer_without_keys() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        bridge.choose_item("B", &mut host);
        assert_eq!(bridge.get_input("?", &mut host), "B");
        assert_eq!(bridge.force_get_input(), "B");
        assert_eq!(host.input, "B");
        assert_eq!(host.input_scrolls, 1);
    }

    #[traced_test]
    #[test]
    fn failed_attach_retries_on_next_poll() {
        let mut host = MemoryHost {
            fail_attach: true,
            ..MemoryHost::default()
        };
        let mut bridge = InputBridge::default();
        assert_eq!(bridge.get_input("?", &mut host), "");
        assert!(bridge.armed().is_none());
        assert!(logs_contain("failed to arm input listener"));

        host.fail_attach = false;
        bridge.get_input("?", &mut host);
        assert!(bridge.armed().is_some());
        assert_eq!(host.attach_count, 1);
    }

    #[traced_test]
    #[test]
    fn missing_field_falls_back_to_snapshot() {
        let mut host = MemoryHost::new();
        let mut bridge = InputBridge::default();
        bridge.get_input("?", &mut host);
        let id = armed_id(&bridge);
        host.input = "partial".into();
        bridge.handle_event(id, InputEvent::key("l"), &mut host);

        host.missing_input = true;
        assert_eq!(
            bridge.handle_event(id, InputEvent::key(COMMIT_KEY), &mut host),
            EventOutcome::Committed("partial".into())
        );
        assert!(logs_contain("failed to read input field"));
    }
}
