use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The drawing backend cannot be used at all. Aborts the whole report.
    #[error("drawing capability unavailable: {0}")]
    CapabilityUnavailable(String),
    #[error("client name must not be empty")]
    MissingClientName,
}
