//! Identity and time collaborators for document assembly.
//!
//! Every resource placed in a clinical document bundle needs an identifier that is unique within
//! that bundle, and a timestamp. The assembly engine never generates either directly; it asks an
//! [`IdentityProvider`] and a [`Clock`] supplied by the caller. Production code uses random UUIDs
//! and the system clock, tests use [`SequentialIdProvider`] and [`FixedClock`] so that documents
//! are reproducible.
//!
//! ## Identifier form
//! Identifiers are FHIR `id` values: 1 to 64 characters drawn from `A-Z`, `a-z`, `0-9`, `-` and
//! `.`. [`ResourceId`] guarantees this once constructed.
//!
//! Example: `550e8400-e29b-41d4-a716-446655440000`

mod clock;
mod resource_id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use resource_id::{IdentityProvider, ResourceId, SequentialIdProvider, UuidIdProvider};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
