//! Decides which panel is in the foreground.
//!
//! The [`NavigationManager`] owns every panel instance and both overlays. It
//! is the only place that calls `activate`/`clean_up`, and it stamps each
//! activation with a fresh [`Activation`] so late results of a panel that
//! has since gone to the background are recognized and dropped.

use std::rc::Rc;

use crate::core::domain::{
    DomainError, DomainManager, DomainResult, EntryId, EntryView, FolderId, Project,
};
use crate::gui::{
    AppState, Message, Task,
    events::{EventBus, ViewEvent},
    message::{NavigationRequest, PanelMsg, ProjectMessage, TreeMessage},
    overlays::{
        ContextMenuManager, ContextMenuMessage, DeleteTarget, MenuAction, Modal, ModalManager,
        ModalMessage, ModalOutcome,
    },
    producer::Producer,
    screens::{
        Activation, Origin, Panel, PanelDetails, PanelKind, PanelMessage,
        entry_editor::{EditorMessage, EditorParent, EntryEditorPanel},
        home::{HomePanel, HomeParent},
        search::{SearchMessage, SearchPanel, SearchParent},
        settings::{SettingsPanel, SettingsParent},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePanel {
    pub kind: PanelKind,
    pub activation: Activation,
}

#[derive(Debug)]
pub struct NavigationManager {
    domain: DomainManager,
    bus: Rc<EventBus>,
    home: HomePanel,
    settings: SettingsPanel,
    search: SearchPanel,
    editor: Option<EntryEditorPanel>,
    active: Option<ActivePanel>,
    activations: u64,
    /// Child of the root bus carrying only overlay events.
    overlay_bus: Rc<EventBus>,
    modal: ModalManager,
    context_menu: ContextMenuManager,
}

impl NavigationManager {
    pub fn new(
        domain: DomainManager,
        bus: Rc<EventBus>,
        on_modal_close: Producer<ModalOutcome, Option<Message>>,
    ) -> Self {
        let overlay_bus = Rc::new(EventBus::with_broker("overlays", Rc::clone(&bus)));
        Self {
            home: HomePanel::new(domain.clone(), ""),
            settings: SettingsPanel::default(),
            search: SearchPanel::new(domain.clone(), Rc::clone(&bus)),
            editor: None,
            active: None,
            activations: 0,
            modal: ModalManager::new(on_modal_close, Rc::clone(&overlay_bus)),
            context_menu: ContextMenuManager::new(Rc::clone(&overlay_bus)),
            overlay_bus,
            domain,
            bus,
        }
    }

    pub fn active(&self) -> Option<ActivePanel> {
        self.active
    }

    pub fn active_kind(&self) -> Option<PanelKind> {
        self.active.map(|active| active.kind)
    }

    pub fn active_details(&self) -> Option<PanelDetails> {
        Some(match self.active?.kind {
            PanelKind::Home => self.home.details(),
            PanelKind::Settings => self.settings.details(),
            PanelKind::Search => self.search.details(),
            PanelKind::EntryEditor => self.editor.as_ref()?.details(),
        })
    }

    pub fn home(&self) -> &HomePanel {
        &self.home
    }

    pub fn settings(&self) -> &SettingsPanel {
        &self.settings
    }

    pub fn search(&self) -> &SearchPanel {
        &self.search
    }

    pub fn editor(&self) -> Option<&EntryEditorPanel> {
        self.editor.as_ref()
    }

    pub fn modal(&self) -> &ModalManager {
        &self.modal
    }

    pub fn context_menu(&self) -> &ContextMenuManager {
        &self.context_menu
    }

    /// Overlay events only. Everything sent here also reaches the root bus.
    pub fn overlay_bus(&self) -> &Rc<EventBus> {
        &self.overlay_bus
    }

    pub fn navigate(&mut self, request: NavigationRequest, state: &AppState) -> Task<Message> {
        match request {
            NavigationRequest::Home => self.open_home(state),
            NavigationRequest::Settings => self.open_settings(state),
            NavigationRequest::Search(query) => self.open_search(query, state),
            NavigationRequest::Entry {
                entry_id,
                view,
                origin,
            } => self.open_entry_editor(entry_id, view, origin, state),
        }
    }

    pub fn open_home(&mut self, state: &AppState) -> Task<Message> {
        self.open_retained(PanelKind::Home, state)
    }

    pub fn open_settings(&mut self, state: &AppState) -> Task<Message> {
        self.open_retained(PanelKind::Settings, state)
    }

    pub fn open_search(&mut self, query: String, state: &AppState) -> Task<Message> {
        if let Some(active) = self.active {
            if active.kind == PanelKind::Search {
                return Task::done(Message::Panel(
                    active.activation,
                    PanelMsg::Search(SearchMessage::QueryChanged(query)),
                ));
            }
        }
        self.search.seed(query);
        self.open_retained(PanelKind::Search, state)
    }

    /// Opening the entry that is already showing only switches its view.
    pub fn open_entry_editor(
        &mut self,
        entry_id: EntryId,
        view: Option<EntryView>,
        origin: Origin,
        state: &AppState,
    ) -> Task<Message> {
        if !state.has_project() {
            tracing::debug!(entry_id, "no project loaded, ignoring entry request");
            return Task::none();
        }
        if self.active_kind() == Some(PanelKind::EntryEditor) {
            if let Some(editor) = self.editor.as_mut() {
                if editor.entry_id() == entry_id {
                    if let Some(view) = view {
                        editor.select_view(view);
                    }
                    tracing::debug!(entry_id, "entry already open");
                    return Task::none();
                }
            }
        }
        let clean_up = self.deactivate(state);
        self.editor = Some(EntryEditorPanel::new(
            self.domain.clone(),
            entry_id,
            view,
            origin,
        ));
        self.bus.produce(ViewEvent::EntryLoadStarted { entry_id });
        let activate = self.activate(PanelKind::EntryEditor, state);
        Task::batch([clean_up, activate])
    }

    fn open_retained(&mut self, kind: PanelKind, state: &AppState) -> Task<Message> {
        if !state.has_project() {
            tracing::debug!(?kind, "no project loaded, ignoring navigation");
            return Task::none();
        }
        if self.active_kind() == Some(kind) {
            tracing::debug!(?kind, "panel already active");
            return Task::none();
        }
        let clean_up = self.deactivate(state);
        let activate = self.activate(kind, state);
        Task::batch([clean_up, activate])
    }

    fn next_activation(&mut self) -> Activation {
        self.activations += 1;
        Activation(self.activations)
    }

    /// Put the foreground panel away. An editor sends its pending changes
    /// first and is then dropped.
    fn deactivate(&mut self, state: &AppState) -> Task<Message> {
        let Some(active) = self.active.take() else {
            return Task::none();
        };
        let activation = active.activation;
        let flushed = match active.kind {
            PanelKind::Home => {
                let flushed = self.home.flush();
                self.home.clean_up();
                flushed.map(move |message| lift_home(activation, message))
            }
            PanelKind::Settings => {
                self.settings.clean_up();
                Task::none()
            }
            PanelKind::Search => {
                self.search.clean_up();
                Task::none()
            }
            PanelKind::EntryEditor => match self.editor.take() {
                Some(mut editor) => {
                    let flushed = editor.flush(state);
                    editor.clean_up();
                    flushed.map(move |message| lift_editor(activation, message))
                }
                None => Task::none(),
            },
        };
        tracing::debug!(kind = ?active.kind, ?activation, "panel cleaned up");
        self.bus.produce(ViewEvent::PanelCleanedUp {
            kind: active.kind,
            activation,
        });
        flushed
    }

    fn activate(&mut self, kind: PanelKind, state: &AppState) -> Task<Message> {
        let activation = self.next_activation();
        let task = match kind {
            PanelKind::Home => self
                .home
                .activate(state)
                .map(move |message| lift_home(activation, message)),
            PanelKind::Settings => self
                .settings
                .activate(state)
                .map(move |message| lift_settings(activation, message)),
            PanelKind::Search => self
                .search
                .activate(state)
                .map(move |message| lift_search(activation, message)),
            PanelKind::EntryEditor => match self.editor.as_mut() {
                Some(editor) => editor
                    .activate(state)
                    .map(move |message| lift_editor(activation, message)),
                None => {
                    tracing::error!("no entry editor to activate");
                    return Task::none();
                }
            },
        };
        self.active = Some(ActivePanel { kind, activation });
        tracing::info!(?kind, ?activation, "panel activated");
        self.bus.produce(ViewEvent::PanelActivated { kind, activation });
        task
    }

    /// Route a panel message to its panel, unless the activation it belongs
    /// to has ended.
    pub fn update_panel(
        &mut self,
        activation: Activation,
        message: PanelMsg,
        state: &mut AppState,
    ) -> Task<Message> {
        let Some(active) = self.active.filter(|active| active.activation == activation) else {
            tracing::debug!(?activation, current = ?self.active, ?message, "dropping stale panel message");
            return Task::none();
        };
        match (active.kind, message) {
            (PanelKind::Home, PanelMsg::Home(message)) => self
                .home
                .update(message, state)
                .map(move |message| lift_home(activation, message)),
            (PanelKind::Settings, PanelMsg::Settings(message)) => self
                .settings
                .update(message, state)
                .map(move |message| lift_settings(activation, message)),
            (PanelKind::Search, PanelMsg::Search(message)) => self
                .search
                .update(message, state)
                .map(move |message| lift_search(activation, message)),
            (PanelKind::EntryEditor, PanelMsg::Editor(message)) => match self.editor.as_mut() {
                Some(editor) => editor
                    .update(message, state)
                    .map(move |message| lift_editor(activation, message)),
                None => Task::none(),
            },
            (kind, message) => {
                tracing::debug!(?kind, ?message, "message does not belong to the active panel");
                Task::none()
            }
        }
    }

    /// Deliver a project title commit to Home, active or not. Returns a
    /// fatal error the session cannot survive.
    pub fn project_renamed(
        &mut self,
        name: &str,
        result: DomainResult<Project>,
        state: &mut AppState,
    ) -> Option<DomainError> {
        self.home.title_committed(name, result, state)
    }

    /// Ask the open editor to delete its entry, if `entry_id` is showing.
    pub fn delete_open_entry(&self, entry_id: EntryId) -> Option<Task<Message>> {
        let active = self.active?;
        let editor = self.editor.as_ref()?;
        (active.kind == PanelKind::EntryEditor && editor.entry_id() == entry_id).then(|| {
            Task::done(Message::Panel(
                active.activation,
                PanelMsg::Editor(EditorMessage::Delete { confirm: true }),
            ))
        })
    }

    /// Leave the editor if its entry was among `entry_ids` or lived in one of
    /// `folder_ids`. Returns to the panel the editor was opened from.
    pub fn on_entries_removed(
        &mut self,
        entry_ids: &[EntryId],
        folder_ids: &[FolderId],
        state: &AppState,
    ) -> Task<Message> {
        if self.active_kind() != Some(PanelKind::EntryEditor) {
            return Task::none();
        }
        let Some(editor) = self.editor.as_mut() else {
            return Task::none();
        };
        let in_removed_folder = editor
            .session()
            .is_some_and(|session| folder_ids.contains(&session.info.folder_id));
        if !entry_ids.contains(&editor.entry_id()) && !in_removed_folder {
            return Task::none();
        }
        tracing::info!(entry_id = editor.entry_id(), "open entry was deleted");
        let origin = editor.origin();
        // Nothing left to save for a deleted entry.
        editor.clean_up();
        match origin {
            Origin::Home => self.open_home(state),
            Origin::Search => self.open_retained(PanelKind::Search, state),
        }
    }

    pub fn open_modal(&mut self, modal: Modal) {
        self.context_menu.close();
        self.modal.open(modal);
    }

    pub fn close_modal(&mut self) -> bool {
        self.modal.close()
    }

    pub fn update_modal(&mut self, message: ModalMessage) -> Option<Message> {
        match message {
            ModalMessage::Open(modal) => {
                self.open_modal(modal);
                None
            }
            message => self.modal.update(message),
        }
    }

    /// Context menu requests are ignored while a modal is open.
    pub fn update_context_menu(&mut self, message: ContextMenuMessage) -> Option<MenuAction> {
        if self.modal.is_open() && matches!(message, ContextMenuMessage::Open { .. }) {
            tracing::debug!("modal open, context menu request ignored");
            return None;
        }
        self.context_menu.update(message)
    }

    /// Drop every panel and overlay; used when the project session ends.
    pub fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            match active.kind {
                PanelKind::Home => self.home.clean_up(),
                PanelKind::Settings => self.settings.clean_up(),
                PanelKind::Search => self.search.clean_up(),
                PanelKind::EntryEditor => {
                    if let Some(editor) = self.editor.as_mut() {
                        editor.clean_up();
                    }
                }
            }
            self.bus.produce(ViewEvent::PanelCleanedUp {
                kind: active.kind,
                activation: active.activation,
            });
        }
        self.search.clean_up();
        self.editor = None;
        self.home = HomePanel::new(self.domain.clone(), "");
        self.settings = SettingsPanel::default();
        self.search = SearchPanel::new(self.domain.clone(), Rc::clone(&self.bus));
        self.modal.close();
        self.context_menu.close();
    }
}

fn lift_home(activation: Activation, message: PanelMessage<HomePanel>) -> Message {
    match message {
        PanelMessage::Panel(message) => Message::Panel(activation, PanelMsg::Home(message)),
        PanelMessage::Parent(HomeParent::TitleCommitted { name, result }) => {
            Message::Project(ProjectMessage::Renamed { name, result })
        }
        PanelMessage::Parent(HomeParent::OpenEntry(entry_id)) => {
            Message::Navigate(NavigationRequest::Entry {
                entry_id,
                view: None,
                origin: Origin::Home,
            })
        }
        PanelMessage::Parent(HomeParent::Search(query)) => {
            Message::Navigate(NavigationRequest::Search(query))
        }
        PanelMessage::Parent(HomeParent::Fatal(err)) => Message::Fatal(err),
    }
}

fn lift_settings(activation: Activation, message: PanelMessage<SettingsPanel>) -> Message {
    match message {
        PanelMessage::Panel(message) => Message::Panel(activation, PanelMsg::Settings(message)),
        PanelMessage::Parent(SettingsParent::CloseProject) => {
            Message::Project(ProjectMessage::Close)
        }
    }
}

fn lift_search(activation: Activation, message: PanelMessage<SearchPanel>) -> Message {
    match message {
        PanelMessage::Panel(message) => Message::Panel(activation, PanelMsg::Search(message)),
        PanelMessage::Parent(SearchParent::OpenEntry(entry_id)) => {
            Message::Navigate(NavigationRequest::Entry {
                entry_id,
                view: None,
                origin: Origin::Search,
            })
        }
        PanelMessage::Parent(SearchParent::Fatal(err)) => Message::Fatal(err),
    }
}

fn lift_editor(activation: Activation, message: PanelMessage<EntryEditorPanel>) -> Message {
    let parent = match message {
        PanelMessage::Panel(message) => {
            return Message::Panel(activation, PanelMsg::Editor(message));
        }
        PanelMessage::Parent(parent) => parent,
    };
    match parent {
        EditorParent::OpenEntry { entry_id, origin } => {
            Message::Navigate(NavigationRequest::Entry {
                entry_id,
                view: None,
                origin,
            })
        }
        EditorParent::ConfirmDelete { entry_id, title } => Message::Modal(ModalMessage::Open(
            Modal::ConfirmDelete(DeleteTarget::Entry { entry_id, title }),
        )),
        EditorParent::EntryDeleted { entry_id } => {
            Message::Tree(TreeMessage::EntryRemoved(entry_id))
        }
        EditorParent::EntryRenamed { entry_id, title } => {
            Message::Tree(TreeMessage::EntryRenamed { entry_id, title })
        }
        EditorParent::TitleFlushed {
            entry_id,
            title,
            result,
        } => Message::Tree(TreeMessage::TitleFlushed {
            entry_id,
            title,
            result,
        }),
        EditorParent::EntryMissing { entry_id } => {
            Message::Tree(TreeMessage::EntryMissing(entry_id))
        }
        EditorParent::ReturnHome => Message::Navigate(NavigationRequest::Home),
        EditorParent::Fatal(err) => Message::Fatal(err),
    }
}
