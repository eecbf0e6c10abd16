use thiserror::Error;

/// Failures talking to the chat platform.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout or body decoding failure. The bot token is
    /// stripped from the URL before this is constructed.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The Bot API answered `ok: false`.
    #[error("{method} rejected ({code:?}): {description}")]
    Api {
        method: &'static str,
        code: Option<i64>,
        description: String,
    },

    /// The Bot API answered `ok: true` without a result.
    #[error("{0} returned no result")]
    EmptyResult(&'static str),
}

impl TransportError {
    pub(crate) fn http(err: reqwest::Error) -> Self {
        TransportError::Http(err.without_url())
    }
}
