/// Structural faults that abort document assembly.
///
/// Unresolved terminology and unrecognized item names are *not* errors; they are reported as
/// [`crate::AssemblyWarning`]s and the rest of the document is still built. Anything in this enum
/// means no document is returned at all.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("duplicate resource identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("{from} references {reference}, which is not a bundle entry")]
    DanglingReference { from: String, reference: String },
    #[error("bundle entry {full_url} does not match its resource locator {locator}")]
    LocatorMismatch { full_url: String, locator: String },
    #[error("document header must be the first and only composition entry")]
    HeaderNotFirst,
    #[error("failed to encode document: {0}")]
    Encoding(#[from] fhir::FhirError),
}

impl AssemblyError {
    /// The message shown to callers. Details stay in server-side logs.
    pub fn public_message(&self) -> &'static str {
        "assembly failed"
    }
}

pub type AssemblyResult<T> = std::result::Result<T, AssemblyError>;
