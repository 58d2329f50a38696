use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiFailure>;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("network failure: {0}")]
    Transport(String),
    #[error("server responded with status {status}{}", status_detail(.message))]
    Status { status: u16, message: Option<String> },
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl ApiFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }
}

fn status_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for ApiFailure {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::MalformedBody(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiFailure {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedBody(value.to_string())
    }
}
