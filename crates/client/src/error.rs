/// Failure of a client call, already logged at the call site
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No authentication token")]
    NotAuthenticated,

    /// The backend answered 401; the session has been cleared
    #[error("Authentication expired")]
    AuthExpired,

    #[error("{detail}")]
    Http { status: u16, detail: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("No data available")]
    NoData,

    #[error("{0}")]
    Invalid(String),
}

impl ClientError {
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::AuthExpired
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
