use std::fmt;

use serde::{Deserialize, Serialize};

/// Command catalogue understood by the native backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CreateProject,
    LoadProject,
    CloseProject,
    GetProject,
    UpdateProject,
    CreateFolder,
    GetFolders,
    UpdateFolderName,
    DeleteFolder,
    CreateEntry,
    GetEntry,
    GetEntries,
    SearchEntries,
    UpdateEntryTitle,
    GetArticleText,
    UpdateArticleText,
    GetEntryProperties,
    UpdateEntryProperty,
    DeleteEntry,
    GetWords,
    UpsertWords,
    DeleteWords,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        use Command::*;
        match self {
            CreateProject => "create_project",
            LoadProject => "load_project",
            CloseProject => "close_project",
            GetProject => "get_project",
            UpdateProject => "update_project",
            CreateFolder => "create_folder",
            GetFolders => "get_folders",
            UpdateFolderName => "update_folder_name",
            DeleteFolder => "delete_folder",
            CreateEntry => "create_entry",
            GetEntry => "get_entry",
            GetEntries => "get_entries",
            SearchEntries => "search_entries",
            UpdateEntryTitle => "update_entry_title",
            GetArticleText => "get_article_text",
            UpdateArticleText => "update_article_text",
            GetEntryProperties => "get_entry_properties",
            UpdateEntryProperty => "update_entry_property",
            DeleteEntry => "delete_entry",
            GetWords => "get_words",
            UpsertWords => "upsert_words",
            DeleteWords => "delete_words",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_name_matches_serde_name() {
        for command in [Command::UpdateProject, Command::UpsertWords, Command::GetEntryProperties] {
            let json = serde_json::to_value(command).unwrap();
            assert_eq!(json, serde_json::Value::String(command.as_str().to_string()));
        }
    }
}
