use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::domain::{EntryId, EntryInfo, Folder, FolderId, FolderTree, Project};

/// Everything known about the open project outside of any panel.
#[derive(Debug, Clone)]
pub struct ProjectState {
    pub project: Project,
    pub folders: FolderTree,
    pub entries: Vec<EntryInfo>,
}

impl ProjectState {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            folders: FolderTree::default(),
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<&EntryInfo> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries_in(&self, folder_id: FolderId) -> impl Iterator<Item = &EntryInfo> {
        self.entries
            .iter()
            .filter(move |entry| entry.folder_id == folder_id)
    }

    pub fn replace_tree(&mut self, folders: Vec<Folder>, entries: Vec<EntryInfo>) {
        self.folders = FolderTree::new(folders);
        self.entries = entries;
    }

    pub fn upsert_entry(&mut self, entry: EntryInfo) {
        match self.entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn rename_entry(&mut self, id: EntryId, title: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.title = title.to_string();
        }
    }

    pub fn remove_entry(&mut self, id: EntryId) {
        self.entries.retain(|entry| entry.id != id);
    }

    /// Drop a folder, its subfolders and every entry they contained.
    pub fn remove_folder(&mut self, id: FolderId) -> Vec<FolderId> {
        let removed = self.folders.remove_subtree(id);
        self.entries
            .retain(|entry| !removed.contains(&entry.folder_id));
        let mut removed: Vec<_> = removed.into_iter().collect();
        removed.sort_unstable();
        removed
    }
}

/// User-facing notice shown above every panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The project session ended; the user has to reopen or recreate it.
    Blocking(String),
    Warning(String),
}

#[derive(Debug, Default)]
pub struct AppState {
    pub config: Config,
    /// Where the settings panel persists `config`, if anywhere.
    pub config_path: Option<PathBuf>,
    pub current_project: Option<ProjectState>,
    pub notice: Option<Notice>,
}

impl AppState {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
            current_project: None,
            notice: None,
        }
    }

    pub fn has_project(&self) -> bool {
        self.current_project.is_some()
    }
}
