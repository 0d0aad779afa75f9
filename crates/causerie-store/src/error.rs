use thiserror::Error;

/// Errors produced by the view-model layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The remote collection could not accept the operation.
    #[error("Remote collection error: {0}")]
    Remote(#[from] causerie_remote::RemoteError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
