//! Integration tests for [`dispatcher::Dispatcher`].
//!
//! Covers: per-handler failure and panic isolation, sync action ordering, bounded async actions, command
//! matching (including `@botusername`), callback routing on the `c` discriminator, and the
//! rejected / ignored envelope outcomes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dispatcher::{
    Action, ActionMode, CallbackHandler, CommandHandler, Dispatcher, HandleOutcome,
};
use modbot_core::{
    CallbackQuery, Command, Context, HandlerError, ModbotError, UpdateType,
};
use serde_json::{json, Value};

fn text_update(text: &str, entities: Value) -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": {"id": -100, "type": "supergroup"},
            "from": {"id": 7, "first_name": "Mod"},
            "text": text,
            "entities": entities
        }
    })
}

fn command_update(text: &str, length: usize) -> Value {
    text_update(text, json!([{"type": "bot_command", "offset": 0, "length": length}]))
}

fn callback_update(data: &str) -> Value {
    json!({
        "update_id": 2,
        "callback_query": {
            "id": "q",
            "from": {"id": 7, "first_name": "Mod"},
            "message": {"message_id": 11, "chat": {"id": -100, "type": "supergroup"}},
            "data": data
        }
    })
}

struct CountingAction {
    count: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl Action for CountingAction {
    async fn run(&self, _ctx: &Context) -> modbot_core::Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ModbotError::Unknown("boom".to_string()));
        }
        Ok(())
    }
}

struct PanickingAction;

#[async_trait]
impl Action for PanickingAction {
    async fn run(&self, _ctx: &Context) -> modbot_core::Result<()> {
        let empty: Vec<u8> = Vec::new();
        let _byte = empty[3];
        Ok(())
    }
}

struct PanickingCommand;

#[async_trait]
impl CommandHandler for PanickingCommand {
    fn commands(&self) -> &[&'static str] {
        &["warn"]
    }

    async fn run(&self, _ctx: &Context, _command: &Command) -> modbot_core::Result<()> {
        panic!("command blew up");
    }
}

struct OrderAction {
    name: &'static str,
    order: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Action for OrderAction {
    async fn run(&self, _ctx: &Context) -> modbot_core::Result<()> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.order.lock().unwrap().push(self.name);
        Ok(())
    }
}

struct SlowAsyncAction {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    done: Arc<AtomicUsize>,
}

#[async_trait]
impl Action for SlowAsyncAction {
    fn mode(&self) -> ActionMode {
        ActionMode::Async
    }

    async fn run(&self, _ctx: &Context) -> modbot_core::Result<()> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        self.done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct RecordingCommand {
    names: &'static [&'static str],
    seen: Arc<Mutex<Vec<Command>>>,
    fail: bool,
}

#[async_trait]
impl CommandHandler for RecordingCommand {
    fn commands(&self) -> &[&'static str] {
        self.names
    }

    async fn run(&self, _ctx: &Context, command: &Command) -> modbot_core::Result<()> {
        self.seen.lock().unwrap().push(command.clone());
        if self.fail {
            return Err(HandlerError::InvalidCommand(command.name.clone()).into());
        }
        Ok(())
    }
}

struct CountingCallback {
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl CallbackHandler for CountingCallback {
    fn callbacks(&self) -> &[&'static str] {
        &["warning"]
    }

    async fn run(&self, _ctx: &Context, _query: &CallbackQuery) -> modbot_core::Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn recording_command(
    names: &'static [&'static str],
    fail: bool,
) -> (Arc<RecordingCommand>, Arc<Mutex<Vec<Command>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(RecordingCommand {
        names,
        seen: seen.clone(),
        fail,
    });
    (handler, seen)
}

/// **Test: the second of three actions fails; the first and third still run exactly once.**
#[tokio::test]
async fn test_failing_action_does_not_stop_siblings() {
    let counts: Vec<Arc<AtomicUsize>> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let mut dispatcher = Dispatcher::default();
    for (i, count) in counts.iter().enumerate() {
        dispatcher = dispatcher.add_action(Arc::new(CountingAction {
            count: count.clone(),
            fail: i == 1,
        }));
    }

    let outcome = dispatcher.handle(text_update("hi", json!([]))).await;

    for count in &counts {
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
    match outcome {
        HandleOutcome::Dispatched(report) => {
            assert_eq!(report.actions_run, 3);
            assert_eq!(report.failed, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

/// **Test: a panicking action or command is counted as failed; later handlers still run.**
#[tokio::test]
async fn test_panicking_handlers_do_not_stop_siblings() {
    let count = Arc::new(AtomicUsize::new(0));
    let (recorder, seen) = recording_command(&["warn"], false);
    let dispatcher = Dispatcher::default()
        .add_action(Arc::new(PanickingAction))
        .add_action(Arc::new(CountingAction {
            count: count.clone(),
            fail: false,
        }))
        .add_command(Arc::new(PanickingCommand))
        .add_command(recorder);

    let outcome = dispatcher.handle(command_update("/warn", 5)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(seen.lock().unwrap().len(), 1);
    match outcome {
        HandleOutcome::Dispatched(report) => {
            assert_eq!(report.actions_run, 2);
            assert_eq!(report.commands_run, 2);
            assert_eq!(report.failed, 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

/// **Test: sync actions complete in registration order.**
#[tokio::test]
async fn test_sync_actions_run_in_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::default()
        .add_action(Arc::new(OrderAction {
            name: "first",
            order: order.clone(),
        }))
        .add_action(Arc::new(OrderAction {
            name: "second",
            order: order.clone(),
        }))
        .add_action(Arc::new(OrderAction {
            name: "third",
            order: order.clone(),
        }));

    dispatcher.handle(text_update("hi", json!([]))).await;

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

/// **Test: async actions all run, never more than the configured number at once.**
#[tokio::test]
async fn test_async_actions_are_bounded() {
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicUsize::new(0));

    let mut dispatcher = Dispatcher::default().with_max_inflight(2);
    for _ in 0..5 {
        dispatcher = dispatcher.add_action(Arc::new(SlowAsyncAction {
            current: current.clone(),
            peak: peak.clone(),
            done: done.clone(),
        }));
    }

    let outcome = dispatcher.handle(text_update("hi", json!([]))).await;
    match outcome {
        HandleOutcome::Dispatched(report) => assert_eq!(report.actions_spawned, 5),
        other => panic!("unexpected outcome: {:?}", other),
    }

    for _ in 0..100 {
        if done.load(Ordering::SeqCst) == 5 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(done.load(Ordering::SeqCst), 5);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

/// **Test: a command handler receives the matching parsed command, suffix and params excluded.**
#[tokio::test]
async fn test_command_receives_matching_command() {
    let (handler, seen) = recording_command(&["ban"], false);
    let dispatcher = Dispatcher::default().add_command(handler);
    dispatcher.set_bot_username("mybot").await;

    dispatcher.handle(command_update("/ban@mybot 123 spam", 8)).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].name, "ban");
    assert_eq!(seen[0].params, vec!["123", "spam"]);
}

/// **Test: commands addressed to another bot, or with a different name, do not match.**
#[tokio::test]
async fn test_command_suffix_and_name_must_match() {
    let (handler, seen) = recording_command(&["ban"], false);
    let dispatcher = Dispatcher::default().add_command(handler);
    dispatcher.set_bot_username("mybot").await;

    dispatcher.handle(command_update("/ban@otherbot 1", 13)).await;
    dispatcher.handle(command_update("/banana 1", 7)).await;
    dispatcher.handle(text_update("ban 1", json!([]))).await;
    assert!(seen.lock().unwrap().is_empty());

    dispatcher.handle(command_update("/BAN 1", 4)).await;
    assert_eq!(seen.lock().unwrap().len(), 1);
}

/// **Test: a failing command handler does not stop the next one; edits are not re-run.**
#[tokio::test]
async fn test_failing_command_isolated_and_edits_skipped() {
    let (failing, failing_seen) = recording_command(&["warn"], true);
    let (ok, ok_seen) = recording_command(&["warn", "w"], false);
    let dispatcher = Dispatcher::default().add_command(failing).add_command(ok);

    let outcome = dispatcher.handle(command_update("/warn", 5)).await;
    assert_eq!(failing_seen.lock().unwrap().len(), 1);
    assert_eq!(ok_seen.lock().unwrap().len(), 1);
    match outcome {
        HandleOutcome::Dispatched(report) => {
            assert_eq!(report.commands_run, 2);
            assert_eq!(report.failed, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let mut edited = command_update("/warn", 5);
    let message = edited["message"].take();
    edited["edited_message"] = message;
    edited.as_object_mut().unwrap().remove("message");
    dispatcher.handle(edited).await;
    assert_eq!(ok_seen.lock().unwrap().len(), 1);
}

/// **Test: the "warning" callback fires only for c == "warning", never for bad JSON.**
#[tokio::test]
async fn test_callback_routing() {
    let count = Arc::new(AtomicUsize::new(0));
    let dispatcher = Dispatcher::default().add_callback(Arc::new(CountingCallback {
        count: count.clone(),
    }));

    dispatcher.handle(callback_update(r#"{"c":"warning","d":"1"}"#)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    dispatcher.handle(callback_update(r#"{"c":"ban","d":"1"}"#)).await;
    dispatcher.handle(callback_update(r#"{"d":"1"}"#)).await;
    dispatcher.handle(callback_update("warning")).await;
    dispatcher.handle(callback_update(r#"{"c":"warning""#)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

/// **Test: an unrecognized envelope is rejected and runs nothing; a no-op kind is ignored.**
#[tokio::test]
async fn test_rejected_and_ignored_envelopes() {
    let count = Arc::new(AtomicUsize::new(0));
    let dispatcher = Dispatcher::default().add_action(Arc::new(CountingAction {
        count: count.clone(),
        fail: false,
    }));

    let outcome = dispatcher.handle(json!({"update_id": 3, "mystery": {}})).await;
    assert!(matches!(outcome, HandleOutcome::Rejected(_)));

    let outcome = dispatcher
        .handle(json!({"update_id": 4, "poll": {"id": "p", "question": "?"}}))
        .await;
    assert_eq!(outcome, HandleOutcome::Ignored(UpdateType::Poll));

    assert_eq!(count.load(Ordering::SeqCst), 0);
}
