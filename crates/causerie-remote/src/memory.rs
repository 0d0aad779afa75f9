//! In-process remote collection.
//!
//! Serves the [`RemoteCommand`] channel from a background tokio task and
//! fans whole-collection snapshots out to every live subscriber. Used by
//! tests and by embedders that host their own collection instead of a
//! managed backend.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use causerie_model::{CollectionName, RawDocument};

use crate::commands::{RemoteCommand, SubscriptionEvent, COMMAND_BUFFER};

/// Spawn the in-process remote in a background tokio task.
///
/// Returns the command sender used to build
/// [`CollectionHandle`](crate::client::CollectionHandle)s. The task exits on
/// [`RemoteCommand::Shutdown`] or once every command sender is dropped.
pub fn spawn_memory_remote() -> mpsc::Sender<RemoteCommand> {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<RemoteCommand>(COMMAND_BUFFER);

    tokio::spawn(async move {
        let mut collections: HashMap<CollectionName, Vec<RawDocument>> = HashMap::new();
        let mut subscribers: HashMap<CollectionName, Vec<mpsc::Sender<SubscriptionEvent>>> =
            HashMap::new();

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                RemoteCommand::Subscribe { collection, events } => {
                    // A fresh listener receives the current contents right away.
                    let snapshot = collections.get(&collection).cloned().unwrap_or_default();
                    debug!(
                        collection = %collection,
                        documents = snapshot.len(),
                        "New subscriber"
                    );
                    if events
                        .send(SubscriptionEvent::Snapshot(snapshot))
                        .await
                        .is_ok()
                    {
                        subscribers.entry(collection).or_default().push(events);
                    }
                }

                RemoteCommand::CreateDocument {
                    collection,
                    document,
                } => {
                    let documents = collections.entry(collection.clone()).or_default();
                    documents.push(document);
                    let snapshot = documents.clone();
                    debug!(
                        collection = %collection,
                        documents = snapshot.len(),
                        "Document created"
                    );
                    fan_out(&mut subscribers, &collection, snapshot).await;
                }

                RemoteCommand::Shutdown => {
                    info!("Remote shutdown requested");
                    break;
                }
            }
        }

        info!("Memory remote task terminated");
    });

    cmd_tx
}

/// Deliver a snapshot to every subscriber of `collection`, dropping the ones
/// whose receiver is gone.
async fn fan_out(
    subscribers: &mut HashMap<CollectionName, Vec<mpsc::Sender<SubscriptionEvent>>>,
    collection: &CollectionName,
    snapshot: Vec<RawDocument>,
) {
    let subs = match subscribers.get_mut(collection) {
        Some(subs) => subs,
        None => return,
    };

    let mut live = Vec::with_capacity(subs.len());
    for sub in subs.drain(..) {
        if sub
            .send(SubscriptionEvent::Snapshot(snapshot.clone()))
            .await
            .is_ok()
        {
            live.push(sub);
        }
    }
    *subs = live;
}
