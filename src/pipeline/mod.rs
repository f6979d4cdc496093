pub mod completion;
pub mod dosage;
pub mod formatter;
pub mod generator;
pub mod prompts;
pub mod registry;
pub mod request;
pub mod schedule;
pub mod standard;
pub mod validator;

pub use completion::{CompletionClient, CompletionError, GenerationResult};
pub use generator::{DocumentGenerator, DocumentRequest, GeneratedDocument};
pub use validator::ValidationReport;

use thiserror::Error;

use crate::models::InvalidPatientData;

/// Failure of one document generation request.
///
/// Validation problems with the generated text are never errors; they are
/// reported as warnings on a successful result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Unsupported document type: {0}")]
    UnknownDocumentType(String),

    #[error(transparent)]
    InvalidPatientData(#[from] InvalidPatientData),

    #[error("Completion API credential missing or malformed")]
    MissingCredential,

    #[error(
        "Completion API error{}: {}",
        .status.map(|s| format!(" (status {s})")).unwrap_or_default(),
        .message
    )]
    CompletionApi { status: Option<u16>, message: String },
}

impl From<CompletionError> for GenerationError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Api { status, message } => Self::CompletionApi { status, message },
        }
    }
}
