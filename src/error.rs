use thiserror::Error;

/// Errors raised by catalog clients and the detail page model.
///
/// The attribute resolver never surfaces these: a failed type lookup only
/// drops that branch's attributes.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("catalog returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport: {0}")]
    Transport(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config: {0}")]
    Config(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Unauthorized(_) => 401,
            Self::Http { status, .. } => *status,
            Self::Transport(_) => 502,
            Self::Decode(_) => 502,
            Self::InvalidInput(_) => 400,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Map a non-success HTTP status and its body to an error variant.
    pub fn from_status(status: u16, subject: &str, body: String) -> Self {
        match status {
            404 => Self::NotFound(subject.to_string()),
            401 | 403 => Self::Unauthorized(subject.to_string()),
            _ => Self::Http {
                status,
                body: body.chars().take(200).collect(),
            },
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
