use thiserror::Error;

pub type HkResult<T> = Result<T, HkError>;

#[derive(Error, Debug)]
pub enum HkError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Out of domain: {what} (value={value})")]
    Domain { what: &'static str, value: f64 },
}
