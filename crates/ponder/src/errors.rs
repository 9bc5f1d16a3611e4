use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed streaming payload: {0}")]
    Malformed(String),
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("completion request failed: {0}")]
    Provider(#[from] ProviderError),
}
