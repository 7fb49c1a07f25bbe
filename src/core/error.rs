use thiserror::Error;

/// Errors that can occur while building, numbering, or rendering invoices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// The order or invoice input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced invoice does not exist.
    #[error("invoice not found: {0}")]
    NotFound(String),

    /// A credit note already exists for the referenced invoice.
    #[error("invoice {original} already credited by {credit_note}")]
    AlreadyCredited {
        original: String,
        credit_note: String,
    },

    /// The persistent store failed and no local recovery applied.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invoice number sequencing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// Document rendering error.
    #[error("render error: {0}")]
    Render(String),
}

/// Errors surfaced by the persistence layer.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Transient I/O failure against the persistent store.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The requested document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The counter compare-and-swap loop exhausted its retries.
    #[error("counter contention after {0} attempts")]
    Contention(usize),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "customer.postal_code").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collapse a list of validation errors into a single [`InvoiceError`].
pub(crate) fn validation_failure(errors: &[ValidationError]) -> InvoiceError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    InvoiceError::Validation(msg)
}
