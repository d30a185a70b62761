use std::{path::PathBuf, rc::Rc};

use crate::core::domain::{EntityType, EntryId, FolderId, NewEntry, NewProject};
use crate::gui::{
    Message,
    events::{EventBus, ViewEvent},
    producer::Producer,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Entry { entry_id: EntryId, title: String },
    Folder { folder_id: FolderId, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    ProjectCreator { name: String, db_file_path: String },
    ProjectLoader { db_file_path: String },
    EntryCreator {
        title: String,
        entity_type: EntityType,
        folder_id: FolderId,
    },
    FolderCreator { name: String, parent_id: FolderId },
    RenameFolder { folder_id: FolderId, name: String },
    ConfirmDelete(DeleteTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    ProjectCreator,
    ProjectLoader,
    EntryCreator,
    FolderCreator,
    RenameFolder,
    ConfirmDelete,
}

impl Modal {
    pub fn project_creator() -> Self {
        Modal::ProjectCreator {
            name: String::new(),
            db_file_path: String::new(),
        }
    }

    pub fn entry_creator(folder_id: FolderId) -> Self {
        Modal::EntryCreator {
            title: String::new(),
            entity_type: EntityType::Article,
            folder_id,
        }
    }

    pub fn kind(&self) -> ModalKind {
        match self {
            Modal::ProjectCreator { .. } => ModalKind::ProjectCreator,
            Modal::ProjectLoader { .. } => ModalKind::ProjectLoader,
            Modal::EntryCreator { .. } => ModalKind::EntryCreator,
            Modal::FolderCreator { .. } => ModalKind::FolderCreator,
            Modal::RenameFolder { .. } => ModalKind::RenameFolder,
            Modal::ConfirmDelete(_) => ModalKind::ConfirmDelete,
        }
    }

    /// Turn the form into an outcome, or say what is missing.
    fn outcome(&self) -> Result<ModalOutcome, &'static str> {
        let non_empty = |value: &str, error| {
            let value = value.trim();
            if value.is_empty() { Err(error) } else { Ok(value.to_string()) }
        };
        match self {
            Modal::ProjectCreator { name, db_file_path } => {
                Ok(ModalOutcome::CreateProject(NewProject {
                    name: non_empty(name, "Empty name")?,
                    db_file_path: PathBuf::from(non_empty(db_file_path, "Empty database path")?),
                }))
            }
            Modal::ProjectLoader { db_file_path } => Ok(ModalOutcome::LoadProject(PathBuf::from(
                non_empty(db_file_path, "Empty database path")?,
            ))),
            Modal::EntryCreator {
                title,
                entity_type,
                folder_id,
            } => Ok(ModalOutcome::CreateEntry(NewEntry {
                title: non_empty(title, "Empty title")?,
                entity_type: *entity_type,
                folder_id: *folder_id,
            })),
            Modal::FolderCreator { name, parent_id } => Ok(ModalOutcome::CreateFolder {
                name: non_empty(name, "Empty name")?,
                parent_id: *parent_id,
            }),
            Modal::RenameFolder { folder_id, name } => Ok(ModalOutcome::RenameFolder {
                folder_id: *folder_id,
                name: non_empty(name, "Empty name")?,
            }),
            Modal::ConfirmDelete(target) => Ok(ModalOutcome::Delete(target.clone())),
        }
    }
}

/// What a finished modal asks the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutcome {
    Cancelled,
    CreateProject(NewProject),
    LoadProject(PathBuf),
    CreateEntry(NewEntry),
    CreateFolder { name: String, parent_id: FolderId },
    RenameFolder { folder_id: FolderId, name: String },
    Delete(DeleteTarget),
}

impl ModalOutcome {
    /// Forms stay open until the backend accepted them so errors can show inline.
    fn closes_immediately(&self) -> bool {
        matches!(self, ModalOutcome::Cancelled | ModalOutcome::Delete(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenModal {
    pub modal: Modal,
    pub error: Option<String>,
    pub submitting: bool,
}

#[derive(Debug, Clone)]
pub enum ModalMessage {
    Open(Modal),
    SetName(String),
    SetPath(String),
    SetTitle(String),
    SetEntityType(EntityType),
    Submit,
    Cancel,
    /// The application accepted the submitted form.
    Close,
    /// The application rejected the submitted form.
    Failed(String),
}

/// At most one modal is open; opening another replaces it.
///
/// Content never talks to the application directly: a finished modal hands
/// its [`ModalOutcome`] to the `on_close` producer and forwards whatever
/// message that yields.
#[derive(Debug)]
pub struct ModalManager {
    current: Option<OpenModal>,
    on_close: Producer<ModalOutcome, Option<Message>>,
    bus: Rc<EventBus>,
}

impl ModalManager {
    pub fn new(on_close: Producer<ModalOutcome, Option<Message>>, bus: Rc<EventBus>) -> Self {
        Self {
            current: None,
            on_close,
            bus,
        }
    }

    pub fn current(&self) -> Option<&OpenModal> {
        self.current.as_ref()
    }

    pub fn kind(&self) -> Option<ModalKind> {
        self.current.as_ref().map(|open| open.modal.kind())
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn on_close(&self) -> &Producer<ModalOutcome, Option<Message>> {
        &self.on_close
    }

    pub fn open(&mut self, modal: Modal) {
        if let Some(previous) = &self.current {
            tracing::debug!(previous = ?previous.modal.kind(), "replacing open modal");
        }
        let kind = modal.kind();
        self.current = Some(OpenModal {
            modal,
            error: None,
            submitting: false,
        });
        self.bus.produce(ViewEvent::ModalOpened(kind));
    }

    /// Always legal; returns whether something was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.current.take().is_some();
        if was_open {
            self.bus.produce(ViewEvent::ModalClosed);
        }
        was_open
    }

    pub fn update(&mut self, message: ModalMessage) -> Option<Message> {
        match message {
            ModalMessage::Open(modal) => {
                self.open(modal);
                None
            }
            ModalMessage::Close => {
                self.close();
                None
            }
            ModalMessage::Cancel => self.finish(ModalOutcome::Cancelled),
            ModalMessage::Failed(error) => {
                if let Some(open) = self.current.as_mut() {
                    open.submitting = false;
                    open.error = Some(error);
                }
                None
            }
            ModalMessage::Submit => {
                let open = self.current.as_mut()?;
                if open.submitting {
                    return None;
                }
                match open.modal.outcome() {
                    Ok(outcome) => {
                        open.error = None;
                        open.submitting = true;
                        self.finish(outcome)
                    }
                    Err(error) => {
                        open.error = Some(error.to_string());
                        None
                    }
                }
            }
            edit => {
                self.edit(edit);
                None
            }
        }
    }

    fn edit(&mut self, message: ModalMessage) {
        let Some(open) = self.current.as_mut() else {
            return;
        };
        open.error = None;
        match (&mut open.modal, message) {
            (Modal::ProjectCreator { name, .. }, ModalMessage::SetName(value))
            | (Modal::FolderCreator { name, .. }, ModalMessage::SetName(value))
            | (Modal::RenameFolder { name, .. }, ModalMessage::SetName(value)) => *name = value,
            (Modal::ProjectCreator { db_file_path, .. }, ModalMessage::SetPath(value))
            | (Modal::ProjectLoader { db_file_path }, ModalMessage::SetPath(value)) => {
                *db_file_path = value
            }
            (Modal::EntryCreator { title, .. }, ModalMessage::SetTitle(value)) => *title = value,
            (Modal::EntryCreator { entity_type, .. }, ModalMessage::SetEntityType(value)) => {
                *entity_type = value
            }
            (modal, message) => {
                tracing::debug!(modal = ?modal.kind(), ?message, "edit does not apply to open modal");
            }
        }
    }

    fn finish(&mut self, outcome: ModalOutcome) -> Option<Message> {
        if outcome.closes_immediately() {
            self.close();
        }
        match self.on_close.produce_one(outcome) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(error = %err, "modal outcome dropped");
                None
            }
        }
    }
}
