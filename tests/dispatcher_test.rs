//! Command pipeline integration tests
//! Run with: cargo test --test dispatcher_test

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::{ensure_init, scratch_dir, RecordingBus, OWNER, STRANGER};
use signal_assistant::application::errors::{DispatchError, HandlerError};
use signal_assistant::application::messaging::{CommandDispatcher, MessageParser};
use signal_assistant::application::services::{default_registry, Notifier};
use signal_assistant::domain::entities::InboundMessage;
use signal_assistant::domain::traits::FileStore;
use signal_assistant::infrastructure::storage::LocalStorage;
use tokio::sync::mpsc;

struct Harness {
    dispatcher: CommandDispatcher,
    bus: Arc<RecordingBus>,
    root: PathBuf,
    inbox: PathBuf,
}

impl Harness {
    fn new() -> Self {
        ensure_init();

        let root = scratch_dir("storage");
        let inbox = scratch_dir("inbox");
        let bus = RecordingBus::new();
        let storage: Arc<dyn FileStore> = Arc::new(LocalStorage::new(&root));

        let dispatcher = CommandDispatcher::new(
            MessageParser::default(),
            default_registry('!', storage),
            Notifier::new(OWNER, bus.clone()),
        );

        Self {
            dispatcher,
            bus,
            root,
            inbox,
        }
    }

    /// Drop a file into the fake attachment directory
    fn attachment(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.inbox.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn stored(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn only_reply(&self) -> String {
        let messages = self.bus.messages();
        assert_eq!(messages.len(), 1, "expected one reply, got {:?}", messages);
        assert_eq!(messages[0].recipient, OWNER);
        messages[0].text.clone()
    }
}

#[tokio::test]
async fn test_unknown_sender_is_rejected_without_side_effects() {
    let h = Harness::new();
    let upload = h.attachment("upload", "secret");

    let msg = InboundMessage::new(STRANGER, "!store notes txt").with_attachment(upload);
    let err = h.dispatcher.process(msg).await.unwrap_err();

    assert!(matches!(err, DispatchError::UnauthorizedSender(ref n) if n == STRANGER));
    assert!(h.stored().is_empty());
    assert_eq!(
        h.only_reply(),
        format!("Failed to validate message, Message arrived from unknown number {}", STRANGER)
    );
}

#[tokio::test]
async fn test_text_without_prefix_is_malformed() {
    let h = Harness::new();

    let err = h
        .dispatcher
        .process(InboundMessage::new(OWNER, "hello there"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::MalformedCommand { .. }));
    let reply = h.only_reply();
    assert!(reply.starts_with("Failed to validate message, "), "{}", reply);
    assert!(reply.contains("hello there"));
}

#[tokio::test]
async fn test_store_copies_single_attachment_and_overwrites() {
    let h = Harness::new();

    let first = h.attachment("first", "version one");
    h.dispatcher
        .process(InboundMessage::new(OWNER, "!store notes txt").with_attachment(first))
        .await
        .unwrap();

    let target = h.root.join("notes.txt");
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "version one");
    assert_eq!(h.only_reply(), format!("Saved attachment at {}", target.display()));

    let second = h.attachment("second", "version two");
    h.dispatcher
        .process(InboundMessage::new(OWNER, "!store notes txt").with_attachment(second))
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "version two");
    assert_eq!(h.stored(), vec!["notes.txt"]);
}

#[tokio::test]
async fn test_store_requires_exactly_one_attachment() {
    let h = Harness::new();

    let err = h
        .dispatcher
        .process(InboundMessage::new(OWNER, "!store notes txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Handler(HandlerError::NoAttachment)));

    let a = h.attachment("a", "a");
    let b = h.attachment("b", "b");
    let err = h
        .dispatcher
        .process(InboundMessage::new(OWNER, "!store notes txt").with_attachments(vec![a, b]))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Handler(HandlerError::TooManyAttachments(2))));

    assert!(h.stored().is_empty());
    let replies: Vec<String> = h.bus.messages().into_iter().map(|m| m.text).collect();
    assert_eq!(
        replies,
        vec![
            "Failed to execute command, No attachments to store.".to_string(),
            "Failed to execute command, Only one attachment supported at the moment, got 2."
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn test_store_with_missing_argument_is_an_arity_error() {
    let h = Harness::new();
    let upload = h.attachment("upload", "x");

    let err = h
        .dispatcher
        .process(InboundMessage::new(OWNER, "!store notes").with_attachment(upload))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Arity { expected: 2, actual: 1, .. }
    ));
    assert!(h.stored().is_empty());
    assert_eq!(
        h.only_reply(),
        "Failed to execute command, !store expects at least 2 argument(s), got 1"
    );
}

#[tokio::test]
async fn test_get_missing_file_is_a_plain_reply() {
    let h = Harness::new();

    h.dispatcher
        .process(InboundMessage::new(OWNER, "!get missing.txt"))
        .await
        .unwrap();

    let messages = h.bus.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Unable to find missing.txt.");
    assert!(messages[0].attachments.is_empty());
}

#[tokio::test]
async fn test_get_returns_found_files_and_names_missing_ones() {
    let h = Harness::new();
    std::fs::write(h.root.join("a.txt"), "alpha").unwrap();

    h.dispatcher
        .process(InboundMessage::new(OWNER, "!get a.txt b.txt"))
        .await
        .unwrap();

    let messages = h.bus.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Unable to find b.txt.");
    assert_eq!(messages[0].attachments, vec![h.root.join("a.txt")]);
}

#[tokio::test]
async fn test_get_treats_directories_as_missing() {
    let h = Harness::new();
    std::fs::create_dir(h.root.join("sub")).unwrap();

    h.dispatcher
        .process(InboundMessage::new(OWNER, "!get sub"))
        .await
        .unwrap();

    let messages = h.bus.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Unable to find sub.");
    assert!(messages[0].attachments.is_empty());
}

#[tokio::test]
async fn test_get_rejects_names_outside_storage() {
    let h = Harness::new();

    let err = h
        .dispatcher
        .process(InboundMessage::new(OWNER, "!get ../etc/passwd"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Handler(HandlerError::InvalidFileName(_))));
    assert!(h.bus.messages()[0].attachments.is_empty());
}

#[tokio::test]
async fn test_list_reports_every_file_with_size() {
    let h = Harness::new();
    std::fs::write(h.root.join("b.txt"), "12345").unwrap();
    std::fs::write(h.root.join("a.txt"), "1").unwrap();

    h.dispatcher
        .process(InboundMessage::new(OWNER, "!list"))
        .await
        .unwrap();

    assert_eq!(
        h.only_reply(),
        format!(
            "All files in {}\na.txt, size: 1\nb.txt, size: 5\n",
            h.root.display()
        )
    );
}

#[tokio::test]
async fn test_man_lists_every_command_once() {
    let h = Harness::new();

    h.dispatcher
        .process(InboundMessage::new(OWNER, "!man"))
        .await
        .unwrap();

    let manual = h.only_reply();
    for name in h.dispatcher.registry().all().map(|c| c.name.clone()) {
        assert_eq!(
            manual.matches(&format!("{} ---", name)).count(),
            1,
            "{} should appear exactly once in:\n{}",
            name,
            manual
        );
    }
    assert_eq!(h.dispatcher.registry().len(), 4);
}

#[tokio::test]
async fn test_unknown_command_points_to_manual() {
    let h = Harness::new();

    let err = h
        .dispatcher
        .process(InboundMessage::new(OWNER, "!delete notes.txt"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::UnknownCommand(..)));
    assert_eq!(
        h.only_reply(),
        "Failed to execute command, Invalid command !delete, type !man to see a list of available commands."
    );
}

#[tokio::test]
async fn test_failed_reply_is_still_reported() {
    let h = Harness::new();
    h.bus.fail_next(1);

    let err = h
        .dispatcher
        .process(InboundMessage::new(OWNER, "!list"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Send(_)));
    assert_eq!(
        h.only_reply(),
        "Failed to execute command, Transport error: bus down"
    );
}

#[tokio::test]
async fn test_run_handles_messages_in_delivery_order() {
    let h = Harness::new();
    std::fs::write(h.root.join("a.txt"), "alpha").unwrap();

    let (tx, rx) = mpsc::channel(10);
    tx.send(InboundMessage::new(OWNER, "!get a.txt")).await.unwrap();
    tx.send(InboundMessage::new(STRANGER, "!list")).await.unwrap();
    tx.send(InboundMessage::new(OWNER, "!get nope.txt")).await.unwrap();
    drop(tx);

    h.dispatcher.run(rx).await;

    let messages = h.bus.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].attachments, vec![h.root.join("a.txt")]);
    assert!(messages[1].text.starts_with("Failed to validate message, "));
    assert_eq!(messages[2].text, "Unable to find nope.txt.");
    assert!(messages.iter().all(|m| m.recipient == OWNER));
}
