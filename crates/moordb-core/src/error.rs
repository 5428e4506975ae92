use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError with no structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an entry-origin invariant violation.
    pub(crate) fn entry_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Entry,
            message.into(),
        )
    }

    /// Construct a manager-origin invariant violation.
    pub(crate) fn manager_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Manager,
            message.into(),
        )
    }

    /// Construct a fixup-origin invariant violation.
    pub(crate) fn fixup_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Fixup,
            message.into(),
        )
    }

    /// Construct a manager-origin internal error.
    pub(crate) fn manager_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Manager, message.into())
    }

    /// Construct a generator-origin unsupported error.
    pub(crate) fn generator_unsupported(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Generator,
            message.into(),
        )
    }

    /// Construct a standardized unknown-entity-path error.
    pub fn unknown_entity_path(path: impl Into<String>) -> Self {
        let path = path.into();

        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Model,
            format!("unknown entity path: '{path}'"),
        )
    }

    /// Construct an entry-not-found error for a stale or foreign handle.
    pub fn entry_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Manager,
            format!("no entry for handle: {id}"),
        )
    }

    /// Construct an invalid lifecycle transition error.
    pub(crate) fn invalid_transition(entity_path: &str, from: &str, to: &str) -> Self {
        Self {
            class: ErrorClass::InvalidState,
            origin: ErrorOrigin::Entry,
            message: format!("invalid state transition for {entity_path}: {from} -> {to}"),
            detail: Some(ErrorDetail::Entry(EntryError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })),
        }
    }

    /// Construct the temporary-value-retained data-integrity error.
    pub(crate) fn temporary_value_retained(entity_path: &str, property: &str) -> Self {
        Self {
            class: ErrorClass::InvalidState,
            origin: ErrorOrigin::Entry,
            message: format!(
                "property '{property}' on {entity_path} still holds a temporary generated value; \
                 it must be resolved before the entity leaves the added state"
            ),
            detail: Some(ErrorDetail::Entry(EntryError::TemporaryValueRetained {
                property: property.to_string(),
            })),
        }
    }

    /// Construct the read-only modification configuration error.
    pub(crate) fn read_only_modified(entity_path: &str, property: &str) -> Self {
        Self {
            class: ErrorClass::Conflict,
            origin: ErrorOrigin::Entry,
            message: format!("property '{property}' on {entity_path} is read-only"),
            detail: Some(ErrorDetail::Entry(EntryError::ReadOnlyModified {
                property: property.to_string(),
            })),
        }
    }

    /// Construct the duplicate-identity conflict error.
    pub(crate) fn identity_conflict(entity_path: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::Conflict,
            ErrorOrigin::Manager,
            format!("another entry of {entity_path} is already tracked with key {key}"),
        )
    }

    /// Construct the missing-generator configuration error.
    pub(crate) fn generator_missing(entity_path: &str, property: &str) -> Self {
        Self {
            class: ErrorClass::Unsupported,
            origin: ErrorOrigin::Generator,
            message: format!(
                "property '{property}' on {entity_path} requires a value generator and none is registered"
            ),
            detail: Some(ErrorDetail::Generator(GeneratorError::Missing {
                property: property.to_string(),
            })),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.class, ErrorClass::Conflict)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
/// This enum is intentionally extensible.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Entry(EntryError),
    #[error("{0}")]
    Generator(GeneratorError),
}

///
/// EntryError
///
/// Entry-specific structured error detail.
/// Never returned directly; always wrapped in [`ErrorDetail::Entry`].
///

#[derive(Debug, ThisError)]
pub enum EntryError {
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("temporary value retained on '{property}'")]
    TemporaryValueRetained { property: String },

    #[error("read-only property modified: '{property}'")]
    ReadOnlyModified { property: String },
}

///
/// GeneratorError
///

#[derive(Debug, ThisError)]
pub enum GeneratorError {
    #[error("no generator registered for '{property}'")]
    Missing { property: String },
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    Conflict,
    Unsupported,
    InvalidState,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::InvalidState => "invalid_state",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Model,
    Key,
    Entry,
    Manager,
    Detector,
    Fixup,
    Generator,
    Serialize,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Model => "model",
            Self::Key => "key",
            Self::Entry => "entry",
            Self::Manager => "manager",
            Self::Detector => "detector",
            Self::Fixup => "fixup",
            Self::Generator => "generator",
            Self::Serialize => "serialize",
        };
        write!(f, "{label}")
    }
}
