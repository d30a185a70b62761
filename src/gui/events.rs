use crate::core::domain::{EntryId, EntryInfo, Folder, FolderId, ProjectId};
use crate::gui::{
    overlays::ModalKind,
    producer::FanOutProducer,
    screens::{Activation, PanelKind},
    state::Notice,
};

/// Notifications about view-state changes, for whoever renders or records them.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    PanelCleanedUp { kind: PanelKind, activation: Activation },
    PanelActivated { kind: PanelKind, activation: Activation },
    EntryLoadStarted { entry_id: EntryId },
    ProjectOpened { project_id: ProjectId },
    ProjectClosed,
    EntryCreated(EntryInfo),
    EntryRenamed { entry_id: EntryId, title: String },
    EntryDeleted { entry_id: EntryId },
    FolderChanged(Folder),
    FolderDeleted { folder_ids: Vec<FolderId> },
    ModalOpened(ModalKind),
    ModalClosed,
    ContextMenuOpened { x: f32, y: f32 },
    ContextMenuClosed,
    Notice(Notice),
}

pub type EventBus = FanOutProducer<ViewEvent, ()>;
