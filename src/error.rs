use std::io;

use thiserror::Error;

/// Result type alias for tree and word-count operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested key is not stored in the tree.
    #[error("element not in tree")]
    ElementNotFound,

    /// Reading text input failed.
    #[error("failed to read input")]
    Io(#[from] io::Error),

    /// A traversal order name was not recognized.
    #[error("unknown traversal order {0:?}, expected pre, in or post")]
    UnknownOrder(String),
}
