//! # causerie-model
//!
//! Domain types shared by the Causerie crates: the [`Message`] entity, the
//! raw document shape exchanged with the remote collection, and the id and
//! collection-name newtypes.

pub mod document;
pub mod message;
pub mod types;

mod error;

pub use document::RawDocument;
pub use error::{ModelError, Result};
pub use message::Message;
pub use types::{CollectionName, MessageId};
