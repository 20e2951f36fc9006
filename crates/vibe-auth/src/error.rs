use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated for {0}; run `myvibe auth login`")]
    NotAuthenticated(String),

    #[error("authorization was {0} in the browser")]
    Rejected(String),

    #[error("authorization timed out after {0}s")]
    TimedOut(u64),

    #[error("authorization session failed: {0}")]
    SessionFailed(String),

    #[error("token store error: {0}")]
    TokenStoreError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
