use thiserror::Error;

/// Errors produced by the remote collection layer.
///
/// `Clone` because delivery errors travel inside subscription events that
/// fan out to several receivers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote task is gone and can no longer accept commands.
    #[error("Remote command channel closed")]
    ChannelClosed,

    /// The backend reported a failure while delivering a snapshot.
    #[error("Snapshot delivery failed: {0}")]
    Delivery(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RemoteError>;
