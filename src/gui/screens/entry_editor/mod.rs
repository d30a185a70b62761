//! Editor for a single entry.
//!
//! Opening an entry loads its info plus whatever payload its type carries
//! (article, properties, words). Every field saves on its own; the editor
//! only tracks how many saves are still out to report its status.

mod article;
mod properties;
mod words;

pub use article::{ArticleEditor, ArticleMessage};
pub use properties::{PropertyEditor, PropertyMessage, PropertyRow};
pub use words::{WordField, WordMessage, WordRow, WordTable};

use crate::core::domain::{
    Doc, DomainError, DomainManager, DomainResult, EntryId, EntryInfo, EntryProperty,
    EntryRepository, EntryView, ErrorClass, TitleUpdate, Word, WordRepository,
};
use crate::gui::{
    AppState, Task,
    screens::{Origin, Panel, PanelDetails, PanelKind, PanelMessage, inline_message, log_failure},
    widgets::TitleField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    Loading,
    Loaded,
    /// Local changes not yet sent.
    Editing,
    /// Changes sent, waiting for the backend.
    Saving,
    NotFound,
    Failed,
    Closed,
}

/// Everything fetched when an entry is opened.
#[derive(Debug)]
pub struct LoadedEntry {
    pub info: EntryInfo,
    pub article: Doc,
    pub properties: Vec<EntryProperty>,
    pub words: Vec<Word>,
}

async fn load_entry(domain: DomainManager, entry_id: EntryId) -> DomainResult<LoadedEntry> {
    let info = domain.get_entry(entry_id).await?;
    let article = domain.get_article_text(entry_id).await?;
    let properties = if info.entity_type.supports(EntryView::Properties) {
        domain.get_entry_properties(entry_id).await?
    } else {
        Vec::new()
    };
    let words = if info.entity_type.supports(EntryView::Words) {
        domain.get_words(entry_id).await?
    } else {
        Vec::new()
    };
    Ok(LoadedEntry {
        info,
        article,
        properties,
        words,
    })
}

#[derive(Debug)]
pub struct Session {
    pub info: EntryInfo,
    pub title: TitleField,
    pub view: EntryView,
    pub article: ArticleEditor,
    pub properties: PropertyEditor,
    pub words: WordTable,
}

impl Session {
    fn new(loaded: LoadedEntry, requested: Option<EntryView>) -> Self {
        let entity_type = loaded.info.entity_type;
        let view = requested
            .filter(|view| entity_type.supports(*view))
            .unwrap_or_else(|| entity_type.default_view());
        Self {
            title: TitleField::new(loaded.info.title.clone()),
            view,
            article: ArticleEditor::new(loaded.article),
            properties: PropertyEditor::new(loaded.properties),
            words: WordTable::new(loaded.info.id, loaded.words),
            info: loaded.info,
        }
    }

    fn is_dirty(&self) -> bool {
        self.title.is_dirty()
            || self.article.is_dirty()
            || self.properties.is_dirty()
            || self.words.is_dirty()
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Loading,
    Ready(Box<Session>),
    NotFound,
    Failed(String),
    Closed,
}

#[derive(Debug)]
pub struct EntryEditorPanel {
    domain: DomainManager,
    entry_id: EntryId,
    origin: Origin,
    requested_view: Option<EntryView>,
    phase: Phase,
    saves_in_flight: usize,
    deleting: bool,
}

#[derive(Debug)]
pub enum EditorMessage {
    Loaded(DomainResult<Box<LoadedEntry>>),
    SelectView(EntryView),
    TitleChanged(String),
    TitleBlurred,
    TitleCommitDue(u64),
    TitleCommitted {
        title: String,
        result: DomainResult<TitleUpdate>,
    },
    Article(ArticleMessage),
    Properties(PropertyMessage),
    Words(WordMessage),
    Delete {
        confirm: bool,
    },
    Deleted(DomainResult<()>),
    ReturnHome,
}

#[derive(Debug)]
pub enum EditorParent {
    OpenEntry { entry_id: EntryId, origin: Origin },
    ConfirmDelete { entry_id: EntryId, title: String },
    EntryDeleted { entry_id: EntryId },
    EntryRenamed { entry_id: EntryId, title: String },
    /// Outcome of a title commit sent while the editor was closing.
    TitleFlushed {
        entry_id: EntryId,
        title: String,
        result: DomainResult<TitleUpdate>,
    },
    /// The entry disappeared while being edited.
    EntryMissing { entry_id: EntryId },
    ReturnHome,
    Fatal(DomainError),
}

impl EntryEditorPanel {
    pub fn new(
        domain: DomainManager,
        entry_id: EntryId,
        view: Option<EntryView>,
        origin: Origin,
    ) -> Self {
        Self {
            domain,
            entry_id,
            origin,
            requested_view: view,
            phase: Phase::Idle,
            saves_in_flight: 0,
            deleting: false,
        }
    }

    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::Ready(session) => Some(&**session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.phase {
            Phase::Ready(session) => Some(&mut **session),
            _ => None,
        }
    }

    pub fn status(&self) -> EditorStatus {
        match &self.phase {
            Phase::Idle | Phase::Loading => EditorStatus::Loading,
            Phase::NotFound => EditorStatus::NotFound,
            Phase::Failed(_) => EditorStatus::Failed,
            Phase::Closed => EditorStatus::Closed,
            Phase::Ready(_) if self.saves_in_flight > 0 || self.deleting => EditorStatus::Saving,
            Phase::Ready(session) if session.is_dirty() => EditorStatus::Editing,
            Phase::Ready(_) => EditorStatus::Loaded,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<EntryView> {
        match &self.phase {
            Phase::Ready(session) => Some(session.view),
            _ => self.requested_view,
        }
    }

    /// Switch the visible sub-view. Views the entity type lacks are refused.
    pub fn select_view(&mut self, view: EntryView) -> bool {
        match &mut self.phase {
            Phase::Ready(session) => {
                if !session.info.entity_type.supports(view) {
                    tracing::debug!(entry_id = self.entry_id, %view, "view not supported by entry");
                    return false;
                }
                session.view = view;
                true
            }
            _ => {
                self.requested_view = Some(view);
                true
            }
        }
    }

    /// Send every change still waiting on a debounce or on an earlier commit.
    /// Used right before the editor is cleaned up; only the title result is
    /// still applied once the editor is gone.
    pub fn flush(&mut self, state: &AppState) -> Task<PanelMessage<Self>> {
        // A closed editor has already flushed or has nothing left to keep.
        if matches!(self.phase, Phase::Closed) {
            return Task::none();
        }
        let title = match self.session_mut().and_then(|session| session.title.blur()) {
            Some(title) => self.commit_title_detached(title),
            None => Task::none(),
        };
        Task::batch([
            title,
            self.save_article(),
            self.flush_properties(),
            self.flush_words(state),
        ])
    }

    /// Title commit whose result goes to the parent, since the editor will
    /// not be around to receive it.
    fn commit_title_detached(&mut self, title: String) -> Task<PanelMessage<Self>> {
        let entry_id = self.entry_id;
        let domain = self.domain.clone();
        Task::perform(
            async move {
                let result = domain.update_entry_title(entry_id, &title).await;
                (title, result)
            },
            move |(title, result)| {
                PanelMessage::Parent(EditorParent::TitleFlushed {
                    entry_id,
                    title,
                    result,
                })
            },
        )
    }

    fn entry_missing(&mut self) -> Task<PanelMessage<Self>> {
        tracing::warn!(entry_id = self.entry_id, "entry vanished while being edited");
        self.phase = Phase::NotFound;
        Task::done(PanelMessage::Parent(EditorParent::EntryMissing {
            entry_id: self.entry_id,
        }))
    }

    fn escalate(&mut self, context: &'static str, err: DomainError) -> Task<PanelMessage<Self>> {
        log_failure(context, &err);
        match err.class() {
            ErrorClass::NotFound => self.entry_missing(),
            ErrorClass::Fatal => Task::done(PanelMessage::Parent(EditorParent::Fatal(err))),
            ErrorClass::Validation | ErrorClass::Unknown => Task::none(),
        }
    }

    fn commit_title(&mut self, title: String) -> Task<PanelMessage<Self>> {
        self.saves_in_flight += 1;
        let entry_id = self.entry_id;
        let domain = self.domain.clone();
        Task::perform(
            async move {
                let result = domain.update_entry_title(entry_id, &title).await;
                (title, result)
            },
            |(title, result)| PanelMessage::Panel(EditorMessage::TitleCommitted { title, result }),
        )
    }

    fn title_committed(
        &mut self,
        title: String,
        result: DomainResult<TitleUpdate>,
        state: &mut AppState,
    ) -> Task<PanelMessage<Self>> {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        let entry_id = self.entry_id;
        match result {
            Ok(update) => {
                let Some(session) = self.session_mut() else {
                    return Task::none();
                };
                session
                    .title
                    .commit_succeeded(&update.title, update.is_title_unique);
                if !update.is_title_unique {
                    return Task::none();
                }
                session.info.title.clone_from(&update.title);
                if let Some(project) = state.current_project.as_mut() {
                    project.rename_entry(entry_id, &update.title);
                }
                Task::done(PanelMessage::Parent(EditorParent::EntryRenamed {
                    entry_id,
                    title: update.title,
                }))
            }
            Err(err) => match err.class() {
                ErrorClass::Validation | ErrorClass::Unknown => {
                    log_failure("update_entry_title", &err);
                    if let Some(session) = self.session_mut() {
                        session
                            .title
                            .commit_failed(&title, inline_message(&err, "Could not save title"));
                    }
                    Task::none()
                }
                _ => self.escalate("update_entry_title", err),
            },
        }
    }

    fn delete(&mut self, confirm: bool) -> Task<PanelMessage<Self>> {
        let title = match self.session() {
            Some(session) => session.info.title.clone(),
            None if matches!(self.phase, Phase::NotFound) => {
                return Task::done(PanelMessage::Parent(EditorParent::EntryDeleted {
                    entry_id: self.entry_id,
                }));
            }
            None => return Task::none(),
        };
        if !confirm {
            return Task::done(PanelMessage::Parent(EditorParent::ConfirmDelete {
                entry_id: self.entry_id,
                title,
            }));
        }
        if self.deleting {
            return Task::none();
        }
        self.deleting = true;
        let entry_id = self.entry_id;
        let domain = self.domain.clone();
        Task::perform(
            async move { domain.delete_entry(entry_id).await },
            |result| PanelMessage::Panel(EditorMessage::Deleted(result)),
        )
    }
}

impl Panel for EntryEditorPanel {
    type Message = EditorMessage;
    type ParentMessage = EditorParent;

    fn kind(&self) -> PanelKind {
        PanelKind::EntryEditor
    }

    fn details(&self) -> PanelDetails {
        PanelDetails {
            kind: PanelKind::EntryEditor,
            entry: Some(self.entry_id),
        }
    }

    fn activate(&mut self, _state: &AppState) -> Task<PanelMessage<Self>> {
        if matches!(self.phase, Phase::Ready(_)) {
            return Task::none();
        }
        tracing::info!(entry_id = self.entry_id, "loading entry");
        self.phase = Phase::Loading;
        let domain = self.domain.clone();
        let entry_id = self.entry_id;
        Task::perform(
            async move { load_entry(domain, entry_id).await.map(Box::new) },
            |result| PanelMessage::Panel(EditorMessage::Loaded(result)),
        )
    }

    fn clean_up(&mut self) {
        if !matches!(self.phase, Phase::Closed) {
            tracing::debug!(entry_id = self.entry_id, "closing entry editor");
        }
        self.phase = Phase::Closed;
        self.saves_in_flight = 0;
        self.deleting = false;
    }

    fn update(
        &mut self,
        message: EditorMessage,
        state: &mut AppState,
    ) -> Task<PanelMessage<Self>> {
        if matches!(self.phase, Phase::Closed) {
            tracing::debug!(entry_id = self.entry_id, ?message, "editor closed, message dropped");
            return Task::none();
        }
        match message {
            EditorMessage::Loaded(Ok(loaded)) => {
                if loaded.info.id != self.entry_id {
                    tracing::error!(
                        expected = self.entry_id,
                        received = loaded.info.id,
                        "backend returned a different entry"
                    );
                    self.phase = Phase::Failed("Loaded the wrong entry".to_string());
                    return Task::none();
                }
                self.phase = Phase::Ready(Box::new(Session::new(*loaded, self.requested_view)));
                Task::none()
            }
            EditorMessage::Loaded(Err(err)) => {
                log_failure("load entry", &err);
                match err.class() {
                    ErrorClass::NotFound => {
                        self.phase = Phase::NotFound;
                        Task::none()
                    }
                    ErrorClass::Fatal => {
                        self.phase = Phase::Failed(err.to_string());
                        Task::done(PanelMessage::Parent(EditorParent::Fatal(err)))
                    }
                    ErrorClass::Validation | ErrorClass::Unknown => {
                        self.phase = Phase::Failed(err.to_string());
                        Task::none()
                    }
                }
            }
            EditorMessage::SelectView(view) => {
                self.select_view(view);
                Task::none()
            }
            EditorMessage::TitleChanged(title) => {
                let Some(session) = self.session_mut() else {
                    return Task::none();
                };
                match session.title.edit(title) {
                    Some(revision) => Task::after(
                        state.config.title_commit_delay(),
                        PanelMessage::Panel(EditorMessage::TitleCommitDue(revision)),
                    ),
                    None => Task::none(),
                }
            }
            EditorMessage::TitleCommitDue(revision) => {
                match self
                    .session_mut()
                    .and_then(|session| session.title.commit_due(revision))
                {
                    Some(title) => self.commit_title(title),
                    None => Task::none(),
                }
            }
            EditorMessage::TitleBlurred => {
                match self.session_mut().and_then(|session| session.title.blur()) {
                    Some(title) => self.commit_title(title),
                    None => Task::none(),
                }
            }
            EditorMessage::TitleCommitted { title, result } => {
                self.title_committed(title, result, state)
            }
            EditorMessage::Article(message) => self.update_article(message, state),
            EditorMessage::Properties(message) => self.update_properties(message),
            EditorMessage::Words(message) => self.update_words(message, state),
            EditorMessage::Delete { confirm } => self.delete(confirm),
            EditorMessage::Deleted(result) => {
                self.deleting = false;
                match result {
                    Ok(()) => Task::done(PanelMessage::Parent(EditorParent::EntryDeleted {
                        entry_id: self.entry_id,
                    })),
                    Err(err) if err.is_not_found() => {
                        tracing::warn!(entry_id = self.entry_id, "entry was already deleted");
                        Task::done(PanelMessage::Parent(EditorParent::EntryDeleted {
                            entry_id: self.entry_id,
                        }))
                    }
                    Err(err) => self.escalate("delete_entry", err),
                }
            }
            EditorMessage::ReturnHome => Task::done(PanelMessage::Parent(EditorParent::ReturnHome)),
        }
    }
}
