use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MessageId;

/// A single chat entry.
///
/// Messages are never mutated after creation; the view layer replaces its
/// whole list on every delivered snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier, assigned client-side at creation.
    pub id: MessageId,
    /// User-entered content. No length or format constraint is enforced locally.
    pub text: String,
    /// Whether the message came from the remote party (drives UI styling).
    pub received: bool,
    /// When the message was sent. The published list is ordered by this field.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a fresh outbound message: new id, current time, `received = false`.
    pub fn outbound(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            received: false,
            timestamp: Utc::now(),
        }
    }
}
