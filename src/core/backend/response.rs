use std::fmt;

use serde::{Deserialize, Serialize};

/// Envelope every backend command answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub data: T,
    #[serde(default)]
    pub errors: Vec<ErrorDescriptor>,
}

/// A response whose payload has not been decoded yet.
pub type RawResponse = Response<serde_json::Value>;

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(data: T, errors: Vec<ErrorDescriptor>) -> Self {
        Self { data, errors }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownError,
    DatabaseConnectionFailed,
    DatabaseMigrationFailed,
    NotInserted,
    NotUpdated,
    NotFound,
    NotDeleted,
    QueryFailed,
    FieldNotUpdated,
    FieldNotUnique,
    FieldInvalid,
    ProjectNotLoaded,
}

impl ErrorKind {
    /// Field-level problems the user can fix in place.
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            ErrorKind::FieldNotUnique | ErrorKind::FieldInvalid | ErrorKind::FieldNotUpdated
        )
    }

    /// Failures that end the current project session.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::DatabaseConnectionFailed
                | ErrorKind::DatabaseMigrationFailed
                | ErrorKind::ProjectNotLoaded
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDescriptor {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            msg: None,
            entity_type: None,
            key: None,
            value: None,
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Name the field the error is about.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(key) = &self.key {
            write!(f, " ({key})")?;
        }
        if let Some(msg) = &self.msg {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}
