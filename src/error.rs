//! Error type shared by the registry, pipeline, session and bindings.

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("unknown filter kind: {0}")]
    UnknownFilterKind(String),

    #[error("invalid source buffer: {0}")]
    InvalidSourceBuffer(String),

    #[error("render failure: {0}")]
    RenderFailure(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl FilterError {
    pub fn unknown_kind(what: impl Into<String>) -> Self {
        Self::UnknownFilterKind(what.into())
    }

    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSourceBuffer(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::RenderFailure(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }
}
