use tokio::sync::mpsc;

use causerie_model::{CollectionName, RawDocument};

use crate::error::RemoteError;

/// Capacity of the command channel into a remote task.
pub const COMMAND_BUFFER: usize = 256;

/// Capacity of each subscription's event channel.
pub const SUBSCRIPTION_BUFFER: usize = 64;

/// Commands sent *into* the remote collection task.
#[derive(Debug)]
pub enum RemoteCommand {
    /// Open a standing subscription on a collection.
    ///
    /// The remote pushes the current contents immediately, then one snapshot
    /// per change, for as long as the receiver is alive.
    Subscribe {
        collection: CollectionName,
        events: mpsc::Sender<SubscriptionEvent>,
    },
    /// Persist a new document in a collection.
    CreateDocument {
        collection: CollectionName,
        document: RawDocument,
    },
    /// Gracefully shut down the remote task.
    Shutdown,
}

/// Events delivered to a subscriber.
#[derive(Debug, Clone)]
pub enum SubscriptionEvent {
    /// A full point-in-time materialization of the collection.
    /// Document order carries no meaning.
    Snapshot(Vec<RawDocument>),
    /// The backend failed to deliver an update. The subscription stays open
    /// and recovers on the backend's own terms.
    Error(RemoteError),
}
