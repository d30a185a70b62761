use thiserror::Error;

use crate::core::backend::{Command, ErrorDescriptor, ErrorKind};

pub type DomainResult<T> = Result<T, DomainError>;

/// How a failure is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Shown inline next to the offending field.
    Validation,
    /// The edited entity vanished; navigate to a safe panel.
    NotFound,
    /// The project session is unusable.
    Fatal,
    /// Logged and swallowed at the panel boundary.
    Unknown,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{command} failed: {}", describe(errors))]
    Backend {
        command: Command,
        errors: Vec<ErrorDescriptor>,
    },

    #[error("backend transport failed: {0:#}")]
    Transport(anyhow::Error),

    #[error("could not decode {command} response: {source}")]
    Decode {
        command: Command,
        #[source]
        source: serde_json::Error,
    },

    #[error("{command} answered {received} rows for {sent} submitted")]
    MisalignedResponse {
        command: Command,
        sent: usize,
        received: usize,
    },
}

impl DomainError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DomainError::Backend { errors, .. } => classify(errors),
            _ => ErrorClass::Unknown,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }

    /// Descriptors reported by the backend, empty for client-side failures.
    pub fn descriptors(&self) -> &[ErrorDescriptor] {
        match self {
            DomainError::Backend { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.descriptors().iter().any(|error| error.kind == kind)
    }
}

/// Fatal beats not-found beats validation; an empty or mixed list is unknown.
pub(crate) fn classify(errors: &[ErrorDescriptor]) -> ErrorClass {
    if errors.iter().any(|error| error.kind.is_fatal()) {
        ErrorClass::Fatal
    } else if errors.iter().any(|error| error.kind == ErrorKind::NotFound) {
        ErrorClass::NotFound
    } else if !errors.is_empty() && errors.iter().all(|error| error.kind.is_validation()) {
        ErrorClass::Validation
    } else {
        ErrorClass::Unknown
    }
}

fn describe(errors: &[ErrorDescriptor]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
