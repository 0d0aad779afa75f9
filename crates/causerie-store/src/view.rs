use serde::{Deserialize, Serialize};

use causerie_model::{Message, MessageId};

/// The state published to observers.
///
/// Both fields are replaced together on every applied snapshot, so an
/// observer can never see a fresh list paired with a stale marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    /// Messages ordered by timestamp, oldest first.
    pub messages: Vec<Message>,
    /// Id of the most recent message, used by the UI to auto-scroll.
    /// Retained, not cleared, when the collection empties.
    pub last_message_id: Option<MessageId>,
}
