use std::error::Error as StdError;
use std::io::ErrorKind;
use thiserror::Error;

/// Classified outcome of a failed generation attempt. Every variant is a
/// reportable result rendered to the user, never a process failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("{0}")]
    Network(String),
    #[error("API request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    MalformedResponse(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("no response from AI")]
    EmptyChoices,
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

/// Maps a transport-level reqwest failure (connect, DNS, timeout, cancelled
/// body) onto `GenerateError::Network` with an actionable message.
pub(crate) fn transport_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> GenerateError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return GenerateError::Network(format!(
            "request timed out after {timeout_secs}s while calling '{api_url}'. \
             Increase TIMEOUT or check the provider's responsiveness."
        ));
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return GenerateError::Network(format!(
                "connection refused by API at '{api_url}'. \
                 Check OPENAI_BASE_URL and network connectivity."
            ));
        }

        return GenerateError::Network(format!(
            "failed to connect to API at '{api_url}'. \
             Check OPENAI_BASE_URL and network connectivity."
        ));
    }

    GenerateError::Network(format!("failed to call API at '{api_url}': {err}"))
}
