//! # causerie-store
//!
//! The chat view-model: [`MessageStore`] keeps a live, ordered view of one
//! remote message collection and submits outbound messages back to it. The
//! remote owns durability and delivery; the store owns nothing but a
//! disposable, fully-recomputed cache of the collection.

pub mod store;
pub mod view;

mod error;

pub use error::{Result, StoreError};
pub use store::MessageStore;
pub use view::MessageView;
