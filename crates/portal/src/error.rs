/// Errors from the portal REST layer.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The portal returned a non-2xx status code.
    #[error("Portal API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not the JSON shape expected for the operation.
    #[error("Unexpected {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The token endpoint rejected the credentials.
    #[error("Unable to retrieve token: {message}. Note that usernames and passwords are case sensitive")]
    Auth { message: String },

    /// The token stayed invalid after one refresh, or no credentials are
    /// available to refresh it.
    #[error("Token expired during {operation} and could not be refreshed")]
    TokenExpired { operation: &'static str },

    /// Search kept reporting further pages past the configured cap.
    #[error("Too many pages of search results (limit {limit}); something probably went wrong")]
    TooManyPages { limit: u32 },

    #[error("Invalid portal URL: {0}")]
    InvalidUrl(String),
}
