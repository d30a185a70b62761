use std::path::PathBuf;

use crate::core::domain::{
    DomainError, DomainResult, EntryId, EntryInfo, EntryView, Folder, FolderId, NewEntry,
    NewProject, Project, TitleUpdate,
};
use crate::gui::{
    overlays::{ContextMenuMessage, ModalMessage},
    screens::{
        Activation, Origin, entry_editor::EditorMessage, home::HomeMessage,
        search::SearchMessage, settings::SettingsMessage,
    },
};

#[derive(Debug)]
pub enum Message {
    Navigate(NavigationRequest),
    /// A panel's own message, tagged with the activation that produced it.
    Panel(Activation, PanelMsg),
    Modal(ModalMessage),
    ContextMenu(ContextMenuMessage),
    Project(ProjectMessage),
    Tree(TreeMessage),
    Fatal(DomainError),
    DismissNotice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationRequest {
    Home,
    Settings,
    Search(String),
    Entry {
        entry_id: EntryId,
        view: Option<EntryView>,
        origin: Origin,
    },
}

#[derive(Debug)]
pub enum PanelMsg {
    Home(HomeMessage),
    Settings(SettingsMessage),
    Search(SearchMessage),
    Editor(EditorMessage),
}

#[derive(Debug)]
pub enum ProjectMessage {
    Create(NewProject),
    Load(PathBuf),
    Close,
    Opened(DomainResult<Project>),
    Closed(DomainResult<()>),
    /// Outcome of a project title commit from Home.
    Renamed {
        name: String,
        result: DomainResult<Project>,
    },
}

/// Changes to the folder/entry tree, usually started from the context menu.
#[derive(Debug)]
pub enum TreeMessage {
    CreateEntry(NewEntry),
    EntryCreated(DomainResult<EntryInfo>),
    CreateFolder {
        name: String,
        parent_id: FolderId,
    },
    FolderCreated(DomainResult<Folder>),
    RenameFolder {
        folder_id: FolderId,
        name: String,
    },
    FolderRenamed(DomainResult<Folder>),
    DeleteEntry(EntryId),
    EntryDeleteFinished {
        entry_id: EntryId,
        result: DomainResult<()>,
    },
    DeleteFolder(FolderId),
    FolderDeleteFinished {
        folder_id: FolderId,
        result: DomainResult<()>,
    },
    /// The open editor deleted its entry.
    EntryRemoved(EntryId),
    EntryRenamed {
        entry_id: EntryId,
        title: String,
    },
    /// A title commit sent by an editor that has closed since.
    TitleFlushed {
        entry_id: EntryId,
        title: String,
        result: DomainResult<TitleUpdate>,
    },
    EntryMissing(EntryId),
}
