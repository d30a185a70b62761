use crate::core::domain::{Doc, DomainResult, EntryId, EntryRepository, ErrorClass};
use crate::gui::{
    AppState, Task,
    screens::{PanelMessage, log_failure},
};

use super::{EditorMessage, EditorParent, EntryEditorPanel};

/// Local copy of the article document with debounced saving.
///
/// At most one save is in flight; edits made meanwhile are sent once it
/// settles, so the backend sees them in the order they were made.
#[derive(Debug, Clone)]
pub struct ArticleEditor {
    doc: Doc,
    revision: u64,
    saved_revision: u64,
    in_flight: Option<u64>,
    queued: bool,
}

#[derive(Debug)]
pub enum ArticleMessage {
    Changed(Doc),
    SaveDue(u64),
    Blurred,
    Saved {
        revision: u64,
        result: DomainResult<()>,
    },
    FollowMention(EntryId),
}

impl ArticleEditor {
    pub fn new(doc: Doc) -> Self {
        Self {
            doc,
            revision: 0,
            saved_revision: 0,
            in_flight: None,
            queued: false,
        }
    }

    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn edit(&mut self, doc: Doc) -> u64 {
        self.doc = doc;
        self.revision += 1;
        self.revision
    }

    /// The document to send now, if any.
    pub fn begin_save(&mut self) -> Option<(u64, Doc)> {
        if !self.is_dirty() {
            return None;
        }
        if self.in_flight.is_some() {
            self.queued = true;
            return None;
        }
        self.in_flight = Some(self.revision);
        Some((self.revision, self.doc.clone()))
    }

    /// Settle the save of `revision`. Returns true when newer edits wait.
    pub fn finish_save(&mut self, revision: u64, accepted: bool) -> bool {
        if self.in_flight == Some(revision) {
            self.in_flight = None;
        }
        if accepted && revision > self.saved_revision {
            self.saved_revision = revision;
        }
        std::mem::take(&mut self.queued) && self.is_dirty()
    }
}

impl EntryEditorPanel {
    pub(super) fn save_article(&mut self) -> Task<PanelMessage<Self>> {
        let entry_id = self.entry_id;
        let Some(session) = self.session_mut() else {
            return Task::none();
        };
        let Some((revision, doc)) = session.article.begin_save() else {
            return Task::none();
        };
        self.saves_in_flight += 1;
        let domain = self.domain.clone();
        Task::perform(
            async move { domain.update_article_text(entry_id, &doc).await },
            move |result| {
                PanelMessage::Panel(EditorMessage::Article(ArticleMessage::Saved {
                    revision,
                    result,
                }))
            },
        )
    }

    pub(super) fn update_article(
        &mut self,
        message: ArticleMessage,
        state: &AppState,
    ) -> Task<PanelMessage<Self>> {
        match message {
            ArticleMessage::Changed(doc) => {
                let Some(session) = self.session_mut() else {
                    return Task::none();
                };
                let revision = session.article.edit(doc);
                Task::after(
                    state.config.title_commit_delay(),
                    PanelMessage::Panel(EditorMessage::Article(ArticleMessage::SaveDue(revision))),
                )
            }
            ArticleMessage::SaveDue(revision) => {
                let current = self.session().map(|session| session.article.revision);
                if current == Some(revision) {
                    self.save_article()
                } else {
                    Task::none()
                }
            }
            ArticleMessage::Blurred => self.save_article(),
            ArticleMessage::Saved { revision, result } => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                let accepted = match result {
                    Ok(()) => true,
                    Err(err) => {
                        log_failure("update_article_text", &err);
                        match err.class() {
                            ErrorClass::NotFound => return self.entry_missing(),
                            ErrorClass::Fatal => {
                                return Task::done(PanelMessage::Parent(EditorParent::Fatal(err)));
                            }
                            ErrorClass::Validation | ErrorClass::Unknown => false,
                        }
                    }
                };
                let Some(session) = self.session_mut() else {
                    return Task::none();
                };
                if session.article.finish_save(revision, accepted) {
                    self.save_article()
                } else {
                    Task::none()
                }
            }
            ArticleMessage::FollowMention(entry_id) => {
                Task::done(PanelMessage::Parent(EditorParent::OpenEntry {
                    entry_id,
                    origin: self.origin,
                }))
            }
        }
    }
}
