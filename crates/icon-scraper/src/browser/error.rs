use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("WebDriver session could not be started: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("Element could not be passed to a script: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Element is no longer attached: {0}")]
    Detached(String),
}

pub type Result<T> = std::result::Result<T, BrowserError>;
