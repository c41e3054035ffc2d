#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A create request whose body is missing `position` or whose `text`
    /// is not a string. The display string is the exact message returned
    /// to API callers.
    #[error("Invalid payload")]
    InvalidPayload,

    #[error("Validation failed: {0}")]
    Validation(String),
}
