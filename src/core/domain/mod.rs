//! Typed facade over the command boundary.
//!
//! [`DomainManager`] is the only component that talks to [`Backend`]. It
//! serializes arguments, decodes the `{ data, errors }` envelope and turns
//! backend error descriptors into [`DomainError`]s the panels can classify.

mod entry;
mod error;
mod folder;
mod project;
pub mod rich_text;
mod word;

use std::{fmt, rc::Rc};

use serde::de::DeserializeOwned;

use crate::core::backend::{Backend, Command, RawResponse};

pub use entry::{
    EntityType, EntryId, EntryInfo, EntryProperty, EntryRepository, EntryView, NewEntry,
    TitleUpdate,
};
pub use error::{DomainError, DomainResult, ErrorClass};
pub use folder::{Folder, FolderId, FolderRepository, FolderTree, ROOT_FOLDER_ID};
pub use project::{NewProject, Project, ProjectId, ProjectRepository};
pub use rich_text::Doc;
pub use word::{Word, WordId, WordRepository, WordType, WordUpsert};

#[derive(Clone)]
pub struct DomainManager {
    backend: Rc<dyn Backend>,
}

impl fmt::Debug for DomainManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainManager").finish_non_exhaustive()
    }
}

impl DomainManager {
    pub fn new(backend: Rc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Invoke `command` and hand back the envelope untouched.
    async fn call_raw(
        &self,
        command: Command,
        args: serde_json::Value,
    ) -> DomainResult<RawResponse> {
        tracing::trace!(%command, "invoking backend command");
        self.backend
            .invoke(command, args)
            .await
            .map_err(DomainError::Transport)
    }

    /// Invoke `command`, fail on any reported error and decode `data`.
    async fn call<T: DeserializeOwned>(
        &self,
        command: Command,
        args: serde_json::Value,
    ) -> DomainResult<T> {
        let response = self.call_raw(command, args).await?;
        if !response.errors.is_empty() {
            return Err(DomainError::Backend {
                command,
                errors: response.errors,
            });
        }
        decode(command, response.data)
    }
}

fn decode<T: DeserializeOwned>(command: Command, data: serde_json::Value) -> DomainResult<T> {
    serde_json::from_value(data).map_err(|source| DomainError::Decode { command, source })
}
