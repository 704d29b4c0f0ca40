use thiserror::Error;

/// Errors that can occur when talking to the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The email belongs to an existing account; the shopper must sign in.
    #[error("Login required: {0}")]
    RequiresLogin(String),

    /// Any other non-success response.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::RequiresLogin(message) => message.clone(),
            Self::NotFound(_) => "Producto no encontrado".to_string(),
            Self::RateLimited(secs) => {
                format!("Demasiadas solicitudes, intenta de nuevo en {secs} segundos")
            }
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => {
                "Error al cargar productos".to_string()
            }
        }
    }
}
