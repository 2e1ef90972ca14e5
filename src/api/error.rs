use std::result;
use thiserror::Error;

pub type ApiResult<T> = result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("OVH API returned HTTP {status}: {message}")]
    Call { status: u16, message: String },

    #[error("Couldn't reach the OVH API")]
    Transport(#[from] reqwest::Error),

    #[cfg(test)]
    #[error("InjectedError")]
    InjectedError,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
impl PartialEq<ApiError> for ApiError {
    fn eq(&self, other: &ApiError) -> bool {
        self.to_string() == other.to_string()
    }
}
