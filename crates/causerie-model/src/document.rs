use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// An untyped document as the remote collection delivers and accepts it.
///
/// The remote store is schemaless; a document only becomes a [`Message`]
/// once it decodes successfully.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawDocument(pub serde_json::Value);

impl RawDocument {
    /// Encode a message into the shape accepted by create-document writes.
    pub fn from_message(message: &Message) -> Result<Self> {
        Ok(Self(serde_json::to_value(message)?))
    }
}

impl Message {
    /// Decode a document delivered by a snapshot.
    pub fn decode(document: &RawDocument) -> Result<Self> {
        Ok(serde_json::from_value(document.0.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_document_roundtrip() {
        let msg = Message::outbound("salut");

        let doc = RawDocument::from_message(&msg).unwrap();
        let restored = Message::decode(&doc).unwrap();

        assert_eq!(msg, restored);
    }

    #[test]
    fn document_missing_fields_is_rejected() {
        let doc = RawDocument(serde_json::json!({ "text": "no id, no timestamp" }));
        assert!(Message::decode(&doc).is_err());
    }

    #[test]
    fn document_with_wrong_types_is_rejected() {
        let doc = RawDocument(serde_json::json!({
            "id": "not-a-uuid",
            "text": "hi",
            "received": true,
            "timestamp": "2023-04-13T09:00:00Z",
        }));
        assert!(Message::decode(&doc).is_err());
    }
}
