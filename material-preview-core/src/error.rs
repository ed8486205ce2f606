use thiserror::Error;

/// Failures raised while loading or rendering a preview.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// The backend answered with a non-2xx status. `detail` is the server's
    /// `{detail}` field when it sent one.
    #[error("backend returned status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Backend { status: u16, detail: Option<String> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Renderer error: {0}")]
    Renderer(String),

    #[error("page {page} is outside 1..={page_count}")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("operation cancelled at stage={0}")]
    Cancelled(&'static str),

    #[error("Config error: {0}")]
    Config(String),
}

impl PreviewError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PreviewError::Cancelled(_))
    }

    /// Human readable detail for inline display. `None` when the backend
    /// failed without saying why.
    pub fn detail(&self) -> Option<String> {
        match self {
            PreviewError::Backend { detail, .. } => detail.clone(),
            other => Some(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for PreviewError {
    fn from(error: toml::de::Error) -> Self {
        PreviewError::Config(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PreviewError>;
