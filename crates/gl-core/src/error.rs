use thiserror::Error;

pub type GlResult<T> = Result<T, GlError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}
