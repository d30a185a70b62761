use std::path::PathBuf;

use crate::core::config::Config;
use crate::gui::{
    AppState, Task,
    screens::{Panel, PanelDetails, PanelKind, PanelMessage},
};

/// Edits the view settings of [`Config`] and shows where the project lives.
#[derive(Debug, Default)]
pub struct SettingsPanel {
    draft: Config,
    db_file_path: Option<PathBuf>,
    error: Option<String>,
    saved: bool,
}

#[derive(Debug, Clone)]
pub enum SettingsMessage {
    SetTitleCommitDelay(u64),
    SetAutosaveWords(bool),
    SetWordAutosaveDelay(u64),
    SetSearchDelay(u64),
    Save,
    Revert,
    CloseProject,
}

#[derive(Debug, Clone)]
pub enum SettingsParent {
    CloseProject,
}

impl SettingsPanel {
    pub fn draft(&self) -> &Config {
        &self.draft
    }

    pub fn db_file_path(&self) -> Option<&PathBuf> {
        self.db_file_path.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    fn edited(&mut self) {
        self.saved = false;
        self.error = None;
    }

    fn save(&mut self, state: &mut AppState) {
        state.config = self.draft.clone();
        self.saved = true;
        self.error = None;
        let Some(path) = &state.config_path else {
            tracing::debug!("no config path, settings kept for this session only");
            return;
        };
        match self.draft.save_to(path) {
            Ok(()) => tracing::info!(path = %path.display(), "settings saved"),
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "failed to save settings");
                self.error = Some(err.to_string());
            }
        }
    }
}

impl Panel for SettingsPanel {
    type Message = SettingsMessage;
    type ParentMessage = SettingsParent;

    fn kind(&self) -> PanelKind {
        PanelKind::Settings
    }

    fn details(&self) -> PanelDetails {
        PanelDetails {
            kind: PanelKind::Settings,
            entry: None,
        }
    }

    fn activate(&mut self, state: &AppState) -> Task<PanelMessage<Self>> {
        self.draft = state.config.clone();
        self.db_file_path = state
            .current_project
            .as_ref()
            .map(|project| project.project.db_file_path.clone());
        self.error = None;
        self.saved = false;
        Task::none()
    }

    fn clean_up(&mut self) {
        self.error = None;
    }

    fn update(
        &mut self,
        message: SettingsMessage,
        state: &mut AppState,
    ) -> Task<PanelMessage<Self>> {
        match message {
            SettingsMessage::SetTitleCommitDelay(ms) => {
                self.draft.title_commit_delay_ms = ms;
                self.edited();
            }
            SettingsMessage::SetAutosaveWords(enabled) => {
                self.draft.autosave_words = enabled;
                self.edited();
            }
            SettingsMessage::SetWordAutosaveDelay(ms) => {
                self.draft.word_autosave_delay_ms = ms;
                self.edited();
            }
            SettingsMessage::SetSearchDelay(ms) => {
                self.draft.search_delay_ms = ms;
                self.edited();
            }
            SettingsMessage::Save => self.save(state),
            SettingsMessage::Revert => {
                self.draft = state.config.clone();
                self.edited();
            }
            SettingsMessage::CloseProject => {
                return Task::done(PanelMessage::Parent(SettingsParent::CloseProject));
            }
        }
        Task::none()
    }
}
