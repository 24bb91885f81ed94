#![forbid(unsafe_code)]

//! End-to-end flows as the game backend drives them: print, prompt, poll
//! until the player commits, clear, repeat.

use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use pretty_assertions::assert_eq;
use quizterm_core::{
    CommitTrigger, Console, ConsoleConfig, EmptyCommitPolicy, EventOutcome, InputEvent,
    InputOptions, MemoryHost,
};

/// Backend-side read: poll `get_input` until it is non-empty, letting the
/// "page" run `between_polls` after each poll.
fn read_line(
    console: &mut Console<MemoryHost>,
    prompt: &str,
    mut between_polls: impl FnMut(&mut Console<MemoryHost>, usize),
) -> (String, usize) {
    let mut polls = 0;
    loop {
        let value = console.get_input(prompt);
        polls += 1;
        if !value.is_empty() {
            console.clear_input_buffer();
            return (value, polls);
        }
        assert!(polls < 100, "backend never saw a commit");
        between_polls(console, polls);
    }
}

fn type_and_press(console: &mut Console<MemoryHost>, text: &str) {
    let id = console.armed_listener().expect("poll armed a listener").id;
    let mut typed = String::new();
    for ch in text.chars() {
        console.dispatch(id, InputEvent::key(ch.to_string()));
        typed.push(ch);
        console.host_mut().input = typed.clone();
    }
    console.dispatch(id, InputEvent::key("Enter"));
}

#[test]
fn menu_round_trip() {
    let mut console = Console::<MemoryHost>::default();
    console.clear_screen();
    console.set_title("Main Menu");
    console.print("[1mWelcome to QUIZ");
    console.print("[0] Quit");
    console.print("[1] Continue");

    let (choice, polls) = read_line(&mut console, "Choose an option (0-1): ", |c, poll| {
        if poll == 3 {
            type_and_press(c, "1");
        }
    });
    assert_eq!(choice, "1");
    assert_eq!(polls, 4);

    let host = console.host();
    assert_eq!(host.title, "Quiz Game UI | Main Menu");
    assert_eq!(
        host.output,
        "<span class=\"colour-code-bold\">Welcome to QUIZ</span><br>[0] Quit<br>[1] Continue<br>"
    );
    assert_eq!(host.console.len(), 3);
    assert_eq!(host.input, "", "clear_input_buffer blanks the field");
    // One listener for the commit, one re-armed by the poll that read it.
    assert_eq!(host.attach_count, 2);
}

#[test]
fn clear_then_poll_returns_empty() {
    let mut console = Console::<MemoryHost>::default();
    console.choose_item("stale");
    console.clear_input_buffer();
    assert_eq!(console.get_input("?"), "");
    assert_eq!(console.force_get_input(), "");
}

#[test]
fn blank_enter_ends_backend_loop() {
    let mut console = Console::<MemoryHost>::default();
    let (value, _) = read_line(&mut console, "Press enter to continue", |c, _| {
        type_and_press(c, "");
    });
    assert_eq!(value, " ");
}

#[test]
fn keep_policy_keeps_backend_waiting_on_blank_enter() {
    let config = ConsoleConfig {
        input: InputOptions {
            empty_commit: EmptyCommitPolicy::Keep,
            ..InputOptions::default()
        },
        ..ConsoleConfig::default()
    };
    let mut console = Console::new(config, MemoryHost::new());
    let (value, polls) = read_line(&mut console, "Name: ", |c, poll| {
        if poll < 3 {
            type_and_press(c, "");
        } else {
            type_and_press(c, "Max");
        }
    });
    assert_eq!(value, "Max");
    assert_eq!(polls, 4);
    assert_eq!(console.host().attach_count, 4);
}

#[test]
fn clicked_choice_needs_no_keyboard() {
    let mut console = Console::<MemoryHost>::default();
    let (value, polls) = read_line(&mut console, "Pick an answer", |c, _| {
        c.choose_item("B");
    });
    assert_eq!(value, "B");
    assert_eq!(polls, 2);
    // The listener armed by the first poll is still waiting.
    assert!(console.armed_listener().is_some());
}

#[test]
fn change_trigger_flow() {
    let config = ConsoleConfig {
        input: InputOptions {
            trigger: CommitTrigger::Change,
            ..InputOptions::default()
        },
        ..ConsoleConfig::default()
    };
    let mut console = Console::new(config, MemoryHost::new());
    assert_eq!(console.get_input("Answer: "), "");
    let id = console.armed_listener().unwrap().id;
    console.host_mut().input = "Paris".into();
    assert_eq!(
        console.dispatch(id, InputEvent::key("s")),
        EventOutcome::Ignored
    );
    assert_eq!(console.force_get_input(), "");
    assert_eq!(
        console.dispatch(id, InputEvent::Change),
        EventOutcome::Committed("Paris".into())
    );
    assert_eq!(console.get_input("Answer: "), "Paris");
}

#[test]
fn peek_tracks_typing_without_consuming() {
    let mut console = Console::<MemoryHost>::default();
    console.get_input("Search: ");
    let id = console.armed_listener().unwrap().id;
    console.host_mut().input = "ca".into();
    console.dispatch(id, InputEvent::key("t"));
    assert_eq!(console.force_get_input(), "ca");
    assert_eq!(console.force_get_input(), "ca");
    assert_eq!(console.get_input("Search: "), "");
}

#[test]
fn async_read_resolves_on_commit() {
    let mut console = Console::<MemoryHost>::default();
    let mut next = pin!(console.get_input_async("Ready? "));
    let mut cx = Context::from_waker(Waker::noop());
    assert_eq!(next.as_mut().poll(&mut cx), Poll::Pending);

    type_and_press(&mut console, "yes");
    assert_eq!(next.as_mut().poll(&mut cx), Poll::Ready("yes".to_owned()));
    assert_eq!(console.host().prompt, "Ready? ");
}
