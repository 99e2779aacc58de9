use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification API returned {status}: {message}")]
    Api { status: u16, message: String },
}
