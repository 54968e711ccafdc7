use thiserror::Error;

/// Errors raised while configuring or querying a sampler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplerError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("running mean is undefined before the first iteration")]
    DivisionUndefined,
}

/// Convenience type for `Result<T, SamplerError>`.
pub type SamplerResult<T> = Result<T, SamplerError>;
