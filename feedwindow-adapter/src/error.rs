use alloc::string::String;

/// Failure reported by a [`crate::SessionStore`].
///
/// The engine never surfaces these to its caller: a failing store degrades scroll
/// persistence to "nothing saved, nothing restored".
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("session storage is unavailable")]
    Unavailable,
    #[error("session storage rejected the write: {0}")]
    Rejected(String),
}
