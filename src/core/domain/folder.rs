use std::{collections::HashSet, future::Future};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::backend::Command;
use crate::core::domain::{DomainManager, DomainResult};

pub type FolderId = i64;

/// Parent of every top-level folder and entry. Never stored as a row.
pub const ROOT_FOLDER_ID: FolderId = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub parent_id: FolderId,
}

/// Client-side copy of the folder hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderTree {
    folders: Vec<Folder>,
}

impl FolderTree {
    pub fn new(folders: Vec<Folder>) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.id == id)
    }

    pub fn children_of(&self, parent_id: FolderId) -> impl Iterator<Item = &Folder> {
        self.folders
            .iter()
            .filter(move |folder| folder.parent_id == parent_id)
    }

    /// `id` and every folder below it. A delete of `id` cascades to all of them.
    pub fn descendants_of(&self, id: FolderId) -> HashSet<FolderId> {
        let mut found = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for child in self.children_of(current) {
                // Guard against cycles in malformed data.
                if found.insert(child.id) {
                    stack.push(child.id);
                }
            }
        }
        found
    }

    pub fn upsert(&mut self, folder: Folder) {
        match self.folders.iter_mut().find(|existing| existing.id == folder.id) {
            Some(existing) => *existing = folder,
            None => self.folders.push(folder),
        }
    }

    /// Drop `id` and its subtree, returning the removed ids.
    pub fn remove_subtree(&mut self, id: FolderId) -> HashSet<FolderId> {
        let removed = self.descendants_of(id);
        self.folders.retain(|folder| !removed.contains(&folder.id));
        removed
    }
}

pub trait FolderRepository {
    fn create_folder(
        &self,
        name: &str,
        parent_id: FolderId,
    ) -> impl Future<Output = DomainResult<Folder>>;
    fn get_folders(&self) -> impl Future<Output = DomainResult<Vec<Folder>>>;
    fn rename_folder(&self, id: FolderId, name: &str) -> impl Future<Output = DomainResult<Folder>>;
    fn delete_folder(&self, id: FolderId) -> impl Future<Output = DomainResult<()>>;
}

impl FolderRepository for DomainManager {
    async fn create_folder(&self, name: &str, parent_id: FolderId) -> DomainResult<Folder> {
        self.call(
            Command::CreateFolder,
            json!({ "name": name, "parentId": parent_id }),
        )
        .await
    }

    async fn get_folders(&self) -> DomainResult<Vec<Folder>> {
        self.call(Command::GetFolders, json!({})).await
    }

    async fn rename_folder(&self, id: FolderId, name: &str) -> DomainResult<Folder> {
        self.call(Command::UpdateFolderName, json!({ "id": id, "name": name }))
            .await
    }

    async fn delete_folder(&self, id: FolderId) -> DomainResult<()> {
        self.call(Command::DeleteFolder, json!({ "id": id })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: FolderId, parent_id: FolderId) -> Folder {
        Folder {
            id,
            name: format!("folder {id}"),
            parent_id,
        }
    }

    fn tree() -> FolderTree {
        FolderTree::new(vec![
            folder(1, ROOT_FOLDER_ID),
            folder(2, 1),
            folder(3, 2),
            folder(4, ROOT_FOLDER_ID),
        ])
    }

    #[test]
    fn descendants_cover_whole_subtree() {
        let ids = tree().descendants_of(1);
        assert_eq!(ids, HashSet::from([1, 2, 3]));
        assert_eq!(tree().descendants_of(4), HashSet::from([4]));
    }

    #[test]
    fn cyclic_parents_terminate() {
        let tree = FolderTree::new(vec![folder(1, 2), folder(2, 1)]);
        assert_eq!(tree.descendants_of(1), HashSet::from([1, 2]));
    }

    #[test]
    fn remove_subtree_keeps_siblings() {
        let mut tree = tree();
        tree.remove_subtree(2);
        let remaining: Vec<_> = tree.folders().iter().map(|f| f.id).collect();
        assert_eq!(remaining, vec![1, 4]);
    }
}
