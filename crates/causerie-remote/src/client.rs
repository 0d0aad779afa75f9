use tokio::sync::mpsc;
use tracing::debug;

use causerie_model::{CollectionName, RawDocument};

use crate::commands::{RemoteCommand, SubscriptionEvent, SUBSCRIPTION_BUFFER};
use crate::error::{RemoteError, Result};

/// Clonable handle binding a remote command channel to one named collection.
///
/// This is the only surface the view-model layer sees; whether the commands
/// are serviced by the in-process remote or by a bridge to a managed backend
/// is invisible to it.
#[derive(Debug, Clone)]
pub struct CollectionHandle {
    cmd_tx: mpsc::Sender<RemoteCommand>,
    collection: CollectionName,
}

impl CollectionHandle {
    pub fn new(cmd_tx: mpsc::Sender<RemoteCommand>, collection: CollectionName) -> Self {
        Self { cmd_tx, collection }
    }

    /// The collection this handle is bound to.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Open a standing subscription to the collection.
    ///
    /// The returned receiver yields one [`SubscriptionEvent`] per delivered
    /// update until the remote goes away or the receiver is dropped.
    pub async fn subscribe(&self) -> Result<mpsc::Receiver<SubscriptionEvent>> {
        debug!(collection = %self.collection, "Subscribing to collection");

        let (events_tx, events_rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        self.cmd_tx
            .send(RemoteCommand::Subscribe {
                collection: self.collection.clone(),
                events: events_tx,
            })
            .await
            .map_err(|_| RemoteError::ChannelClosed)?;

        Ok(events_rx)
    }

    /// Submit a single create-document write.
    ///
    /// Completion means the command was handed to the remote task, not that
    /// the document is durable; the write becomes observable through the
    /// subscription once the remote has applied it.
    pub async fn create_document(&self, document: RawDocument) -> Result<()> {
        self.cmd_tx
            .send(RemoteCommand::CreateDocument {
                collection: self.collection.clone(),
                document,
            })
            .await
            .map_err(|_| RemoteError::ChannelClosed)
    }
}
