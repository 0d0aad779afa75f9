//! Remote document collection seam.
//!
//! The view-model layer talks to whatever services the [`RemoteCommand`]
//! channel: the in-process remote in [`memory`], or a bridge task in front
//! of a managed document store. The contract is the same either way: a
//! subscription delivers whole-collection snapshots, and writes are single
//! create-document commands.

pub mod client;
pub mod commands;
pub mod memory;

mod error;

pub use client::CollectionHandle;
pub use commands::{RemoteCommand, SubscriptionEvent};
pub use error::{RemoteError, Result};
pub use memory::spawn_memory_remote;
