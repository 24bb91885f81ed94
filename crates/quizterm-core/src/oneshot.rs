#![forbid(unsafe_code)]

//! One-shot commit listeners.
//!
//! A listener is registered against the input field, fires once when the
//! user commits, and unregisters itself. [`OneShotListener`] makes the
//! `Idle`/`Armed` state explicit so a second registration while one is
//! pending is impossible to express, and tags each registration with a fresh
//! [`ListenerId`] so events from an already-removed listener are recognisable.
//!
//! [`CommitSignal`] is the awaitable counterpart: hosts that prefer a future
//! over polling get one resolved with the next committed value.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};

/// Identifier of one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Which page event finalizes the pending text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum CommitTrigger {
    /// A `keypress` whose key is `Enter`.
    #[default]
    EnterKey,
    /// The field's `change` event (value edited and focus left, or Enter).
    Change,
}

impl CommitTrigger {
    /// DOM event type the listener subscribes to.
    #[must_use]
    pub const fn dom_event(self) -> &'static str {
        match self {
            Self::EnterKey => "keypress",
            Self::Change => "change",
        }
    }
}

/// A registration currently waiting for its commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedListener {
    pub id: ListenerId,
    pub trigger: CommitTrigger,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListenerState {
    #[default]
    Idle,
    Armed(ArmedListener),
}

/// Register-fire-unregister state for a single input field.
#[derive(Debug, Default)]
pub struct OneShotListener {
    state: ListenerState,
    next_id: u64,
}

impl OneShotListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> ListenerState {
        self.state
    }

    #[must_use]
    pub const fn armed(&self) -> Option<ArmedListener> {
        match self.state {
            ListenerState::Armed(listener) => Some(listener),
            ListenerState::Idle => None,
        }
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        matches!(self.state, ListenerState::Armed(_))
    }

    /// Arm a new listener if none is pending.
    ///
    /// `attach` performs the actual registration; the state only moves to
    /// `Armed` when it succeeds. Returns `Ok(None)` when already armed.
    ///
    /// # Errors
    ///
    /// Propagates the error from `attach`, leaving the state `Idle`.
    pub fn arm_with<E>(
        &mut self,
        trigger: CommitTrigger,
        attach: impl FnOnce(&ArmedListener) -> Result<(), E>,
    ) -> Result<Option<ArmedListener>, E> {
        if self.is_armed() {
            return Ok(None);
        }
        let listener = ArmedListener {
            id: ListenerId(self.next_id),
            trigger,
        };
        attach(&listener)?;
        self.next_id += 1;
        self.state = ListenerState::Armed(listener);
        Ok(Some(listener))
    }

    /// Fire the armed listener if `id` is the one pending, returning it to
    /// `Idle`. Stale or unknown ids leave the state alone.
    pub fn fire(&mut self, id: ListenerId) -> Option<ArmedListener> {
        match self.state {
            ListenerState::Armed(listener) if listener.id == id => {
                self.state = ListenerState::Idle;
                Some(listener)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct CommitSlot {
    value: Option<String>,
    waker: Option<Waker>,
}

/// Future resolved with the next committed value.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct NextCommit {
    slot: Rc<RefCell<CommitSlot>>,
}

impl Future for NextCommit {
    type Output = String;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<String> {
        let mut slot = self.slot.borrow_mut();
        match slot.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Fan-out of commit values to pending [`NextCommit`] futures.
///
/// Holds only weak references, so dropping a future unsubscribes it.
#[derive(Debug, Default)]
pub struct CommitSignal {
    waiters: Vec<Weak<RefCell<CommitSlot>>>,
}

impl CommitSignal {
    pub fn subscribe(&mut self) -> NextCommit {
        self.waiters.retain(|w| w.strong_count() > 0);
        let slot = Rc::new(RefCell::new(CommitSlot::default()));
        self.waiters.push(Rc::downgrade(&slot));
        NextCommit { slot }
    }

    /// Resolve every live subscriber with `value`. Returns how many were
    /// woken.
    pub fn notify(&mut self, value: &str) -> usize {
        let mut woken = 0;
        for waiter in self.waiters.drain(..) {
            let Some(slot) = waiter.upgrade() else {
                continue;
            };
            let waker = {
                let mut slot = slot.borrow_mut();
                slot.value = Some(value.to_owned());
                slot.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake();
            }
            woken += 1;
        }
        woken
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.waiters.iter().filter(|w| w.strong_count() > 0).count()
    }
}
