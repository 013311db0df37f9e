use thiserror::Error;

/// Why an upstream fetch produced no data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed with status: {0}")]
    Status(u16),

    #[error("invalid payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if let Some(status) = err.status() {
            GatewayError::Status(status.as_u16())
        } else if err.is_decode() {
            GatewayError::Payload(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    #[error("points lookup {url} failed: {source}")]
    Fetch { url: String, source: GatewayError },

    #[error("points response from {url} has no {field}")]
    MissingEndpoint { url: String, field: &'static str },
}

impl ResolveError {
    pub fn url(&self) -> &str {
        match self {
            ResolveError::Fetch { url, .. } | ResolveError::MissingEndpoint { url, .. } => url,
        }
    }
}

/// Failure to read a leading number out of a string such as `"10 mph"`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("empty value")]
    Empty,

    #[error("leading token {0:?} is not a number")]
    NotANumber(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ThresholdError {
    #[error("temperature minimum {min}°F is above maximum {max}°F")]
    InvertedTemperatureRange { min: f64, max: f64 },
}
