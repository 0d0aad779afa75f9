//! The message store and its subscription update loop.
//!
//! The update loop runs in a dedicated tokio task and processes one
//! subscription event to completion before the next, so snapshots are never
//! decoded concurrently. Outbound sends go through the remote command
//! channel and never touch the published state directly.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use causerie_model::{Message, RawDocument};
use causerie_remote::{CollectionHandle, SubscriptionEvent};

use crate::error::Result;
use crate::view::MessageView;

/// Live view of a remote message collection.
///
/// Opens its subscription once, at construction, and republishes the
/// decoded, ordered message list after every delivered snapshot. Outbound
/// messages go through [`MessageStore::send`] and appear in the published
/// list only once the write has round-tripped through the subscription.
pub struct MessageStore {
    handle: CollectionHandle,
    view_rx: watch::Receiver<MessageView>,
    subscription: JoinHandle<()>,
}

impl MessageStore {
    /// Open the store on one collection.
    ///
    /// Fails only if the remote is unreachable at subscribe time; everything
    /// after that arrives through the subscription.
    pub async fn open(handle: CollectionHandle) -> Result<Self> {
        let events = handle.subscribe().await?;

        let (view_tx, view_rx) = watch::channel(MessageView::default());
        let subscription = tokio::spawn(update_loop(events, view_tx));

        info!(collection = %handle.collection(), "Message store opened");

        Ok(Self {
            handle,
            view_rx,
            subscription,
        })
    }

    /// Subscribe to published state changes.
    ///
    /// Every receiver observes the same atomically-replaced
    /// (`messages`, `last_message_id`) pair.
    pub fn watch(&self) -> watch::Receiver<MessageView> {
        self.view_rx.clone()
    }

    /// The currently published state.
    pub fn view(&self) -> MessageView {
        self.view_rx.borrow().clone()
    }

    /// Construct a new outbound message and submit it to the collection.
    ///
    /// Fire and forget: the caller is not blocked on the backend, and a
    /// failed write is logged and dropped. The returned message carries the
    /// id and timestamp the write was issued with.
    pub fn send(&self, text: impl Into<String>) -> Message {
        let message = Message::outbound(text);

        let document = match RawDocument::from_message(&message) {
            Ok(document) => document,
            Err(e) => {
                error!(
                    message_id = %message.id,
                    error = %e,
                    "Failed to encode outbound message, dropping it"
                );
                return message;
            }
        };

        let handle = self.handle.clone();
        let message_id = message.id;
        tokio::spawn(async move {
            if let Err(e) = handle.create_document(document).await {
                error!(
                    message_id = %message_id,
                    error = %e,
                    "Failed to submit message, dropping it"
                );
            }
        });

        message
    }

    /// Cancel the live subscription.
    ///
    /// Dropping the store has the same effect; `close` makes the teardown
    /// explicit for callers that keep the store alive elsewhere.
    pub fn close(&self) {
        self.subscription.abort();
    }
}

impl Drop for MessageStore {
    fn drop(&mut self) {
        self.subscription.abort();
    }
}

/// Consume subscription events and republish the view after each snapshot.
async fn update_loop(
    mut events: mpsc::Receiver<SubscriptionEvent>,
    view_tx: watch::Sender<MessageView>,
) {
    while let Some(event) = events.recv().await {
        match event {
            SubscriptionEvent::Snapshot(documents) => {
                let total = documents.len();
                let mut messages: Vec<Message> = documents
                    .iter()
                    .filter_map(|document| match Message::decode(document) {
                        Ok(message) => Some(message),
                        Err(e) => {
                            warn!(error = %e, "Skipping document that failed to decode");
                            None
                        }
                    })
                    .collect();

                messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
                let last_message_id = messages.last().map(|m| m.id);

                debug!(
                    documents = total,
                    messages = messages.len(),
                    "Applying snapshot"
                );

                view_tx.send_modify(|view| {
                    // An empty snapshot empties the list but keeps the marker.
                    if last_message_id.is_some() {
                        view.last_message_id = last_message_id;
                    }
                    view.messages = messages;
                });
            }

            SubscriptionEvent::Error(e) => {
                warn!(error = %e, "Subscription delivery error, keeping last published state");
            }
        }
    }

    debug!("Subscription event stream ended");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use causerie_model::{CollectionName, Message, MessageId, RawDocument};
    use causerie_remote::{
        spawn_memory_remote, CollectionHandle, RemoteCommand, RemoteError, SubscriptionEvent,
    };

    use super::*;

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("causerie_store=debug")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Store wired to a hand-driven remote: the test drains the command
    /// channel and feeds subscription events itself.
    async fn stub_store() -> (
        MessageStore,
        mpsc::Receiver<RemoteCommand>,
        mpsc::Sender<SubscriptionEvent>,
    ) {
        init_logging();

        let (cmd_tx, mut cmd_rx) = mpsc::channel(16);
        let handle = CollectionHandle::new(cmd_tx, CollectionName::from("messages"));
        let store = MessageStore::open(handle).await.expect("open store");

        let events = match cmd_rx.recv().await.expect("subscribe command") {
            RemoteCommand::Subscribe { events, .. } => events,
            other => panic!("unexpected command: {other:?}"),
        };

        (store, cmd_rx, events)
    }

    fn message_at(text: &str, secs: i64) -> Message {
        Message {
            id: MessageId::new(),
            text: text.to_string(),
            received: true,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn doc(message: &Message) -> RawDocument {
        RawDocument::from_message(message).unwrap()
    }

    #[tokio::test]
    async fn snapshot_is_published_sorted() {
        let (store, _cmd_rx, events) = stub_store().await;
        let mut view_rx = store.watch();

        let m2 = message_at("deux", 20);
        let m1 = message_at("un", 10);
        let m3 = message_at("trois", 30);
        events
            .send(SubscriptionEvent::Snapshot(vec![
                doc(&m2),
                doc(&m1),
                doc(&m3),
            ]))
            .await
            .unwrap();

        view_rx.changed().await.unwrap();
        let view = view_rx.borrow_and_update().clone();

        let texts: Vec<&str> = view.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["un", "deux", "trois"]);
        assert_eq!(view.last_message_id, Some(m3.id));
    }

    #[tokio::test]
    async fn malformed_documents_are_skipped() {
        let (store, _cmd_rx, events) = stub_store().await;
        let mut view_rx = store.watch();

        let good = [message_at("a", 1), message_at("b", 2)];
        let mut docs: Vec<RawDocument> = good.iter().map(doc).collect();
        docs.insert(1, RawDocument(serde_json::json!({ "text": 42 })));

        events
            .send(SubscriptionEvent::Snapshot(docs))
            .await
            .unwrap();

        view_rx.changed().await.unwrap();
        let view = view_rx.borrow_and_update().clone();

        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.last_message_id, Some(good[1].id));
    }

    #[tokio::test]
    async fn empty_snapshot_keeps_marker() {
        let (store, _cmd_rx, events) = stub_store().await;
        let mut view_rx = store.watch();

        let m = message_at("seul", 5);
        events
            .send(SubscriptionEvent::Snapshot(vec![doc(&m)]))
            .await
            .unwrap();
        view_rx.changed().await.unwrap();
        assert_eq!(view_rx.borrow_and_update().last_message_id, Some(m.id));

        events
            .send(SubscriptionEvent::Snapshot(Vec::new()))
            .await
            .unwrap();
        view_rx.changed().await.unwrap();

        let view = view_rx.borrow_and_update().clone();
        assert!(view.messages.is_empty());
        assert_eq!(view.last_message_id, Some(m.id));

        // The store keeps processing snapshots after emptying out.
        events
            .send(SubscriptionEvent::Snapshot(vec![doc(&m)]))
            .await
            .unwrap();
        view_rx.changed().await.unwrap();
        assert_eq!(view_rx.borrow_and_update().messages.len(), 1);
    }

    #[tokio::test]
    async fn delivery_error_keeps_last_known_state() {
        let (store, _cmd_rx, events) = stub_store().await;
        let mut view_rx = store.watch();

        let m = message_at("avant", 1);
        events
            .send(SubscriptionEvent::Snapshot(vec![doc(&m)]))
            .await
            .unwrap();
        view_rx.changed().await.unwrap();
        view_rx.borrow_and_update();

        events
            .send(SubscriptionEvent::Error(RemoteError::Delivery(
                "permission denied".into(),
            )))
            .await
            .unwrap();

        // No republish for an error: the previous state stays visible.
        assert!(timeout(Duration::from_millis(50), view_rx.changed())
            .await
            .is_err());
        assert_eq!(store.view().messages, [m.clone()]);

        // And the loop is still alive for the next snapshot.
        let after = message_at("après", 2);
        events
            .send(SubscriptionEvent::Snapshot(vec![doc(&m), doc(&after)]))
            .await
            .unwrap();
        view_rx.changed().await.unwrap();
        assert_eq!(view_rx.borrow_and_update().messages.len(), 2);
    }

    #[tokio::test]
    async fn send_does_not_touch_published_state() {
        let (store, mut cmd_rx, _events) = stub_store().await;

        let before = Utc::now();
        let sent = store.send("hello");

        assert!(!sent.received);
        assert!(!sent.id.0.is_nil());
        assert!(sent.timestamp >= before);
        assert!(store.view().messages.is_empty());

        // The write shows up as a single create-document command...
        let written = match cmd_rx.recv().await.expect("create command") {
            RemoteCommand::CreateDocument {
                collection,
                document,
            } => {
                assert_eq!(collection.as_str(), "messages");
                document
            }
            other => panic!("unexpected command: {other:?}"),
        };

        // ...that decodes back to the exact message handed to the caller.
        assert_eq!(Message::decode(&written).unwrap(), sent);
    }

    #[tokio::test]
    async fn sent_message_round_trips_through_the_remote() {
        init_logging();

        let cmd_tx = spawn_memory_remote();
        let handle = CollectionHandle::new(cmd_tx, CollectionName::from("messages"));
        let store = MessageStore::open(handle).await.expect("open store");
        let mut view_rx = store.watch();

        let sent = store.send("bonjour");

        // Skip the initial empty snapshot and wait for the write to land.
        loop {
            view_rx.changed().await.unwrap();
            let view = view_rx.borrow_and_update().clone();
            if !view.messages.is_empty() {
                assert_eq!(view.messages, [sent.clone()]);
                assert_eq!(view.last_message_id, Some(sent.id));
                break;
            }
        }
    }

    #[tokio::test]
    async fn close_cancels_the_subscription() {
        let (store, _cmd_rx, events) = stub_store().await;
        let mut view_rx = store.watch();

        store.close();

        let m = message_at("tard", 9);
        let _ = events.send(SubscriptionEvent::Snapshot(vec![doc(&m)])).await;

        match timeout(Duration::from_millis(50), view_rx.changed()).await {
            // Deadline hit with no update, or the loop (and its sender) is
            // already gone: either way the snapshot was not applied.
            Err(_elapsed) => {}
            Ok(Err(_closed)) => {}
            Ok(Ok(())) => panic!("snapshot applied after close"),
        }
        assert!(store.view().messages.is_empty());
    }
}
