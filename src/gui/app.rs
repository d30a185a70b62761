use std::{collections::VecDeque, path::PathBuf, rc::Rc};

use futures::{StreamExt, future::LocalBoxFuture, stream::FuturesUnordered};

use crate::core::{
    backend::Backend,
    config::Config,
    domain::{
        DomainError, DomainManager, EntryId, EntryRepository, ErrorClass, FolderId,
        FolderRepository, ProjectRepository,
    },
};
use crate::gui::{
    AppState, Message, Task,
    events::{EventBus, ViewEvent},
    message::{NavigationRequest, ProjectMessage, TreeMessage},
    navigation::NavigationManager,
    overlays::{DeleteTarget, MenuAction, Modal, ModalMessage, ModalOutcome},
    producer::Producer,
    screens::{Origin, inline_message, log_failure},
    state::{Notice, ProjectState},
};

/// Root of the view state.
///
/// The embedding shell feeds user input in through [`App::dispatch`] and
/// drives backend work with [`App::run_until_idle`]. Everything runs on one
/// thread; a dispatch handles the message and every message it produces
/// synchronously before returning.
pub struct App {
    state: AppState,
    domain: DomainManager,
    bus: Rc<EventBus>,
    navigation: NavigationManager,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Message>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", &self.state)
            .field("navigation", &self.navigation)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

fn modal_outcome_message(outcome: ModalOutcome) -> Option<Message> {
    match outcome {
        ModalOutcome::Cancelled => None,
        ModalOutcome::CreateProject(project) => {
            Some(Message::Project(ProjectMessage::Create(project)))
        }
        ModalOutcome::LoadProject(path) => Some(Message::Project(ProjectMessage::Load(path))),
        ModalOutcome::CreateEntry(entry) => Some(Message::Tree(TreeMessage::CreateEntry(entry))),
        ModalOutcome::CreateFolder { name, parent_id } => {
            Some(Message::Tree(TreeMessage::CreateFolder { name, parent_id }))
        }
        ModalOutcome::RenameFolder { folder_id, name } => {
            Some(Message::Tree(TreeMessage::RenameFolder { folder_id, name }))
        }
        ModalOutcome::Delete(DeleteTarget::Entry { entry_id, .. }) => {
            Some(Message::Tree(TreeMessage::DeleteEntry(entry_id)))
        }
        ModalOutcome::Delete(DeleteTarget::Folder { folder_id, .. }) => {
            Some(Message::Tree(TreeMessage::DeleteFolder(folder_id)))
        }
    }
}

impl App {
    pub fn new(backend: Rc<dyn Backend>, config: Config, config_path: Option<PathBuf>) -> Self {
        let domain = DomainManager::new(backend);
        let bus = Rc::new(EventBus::new("root"));
        // The modal reports to its own producer; the application answers
        // through the broker.
        let outcomes = Rc::new(Producer::new("app.outcomes"));
        outcomes.subscribe(modal_outcome_message);
        let on_modal_close = Producer::with_broker("modal.on_close", outcomes);
        Self {
            state: AppState::new(config, config_path),
            navigation: NavigationManager::new(domain.clone(), Rc::clone(&bus), on_modal_close),
            domain,
            bus,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn navigation(&self) -> &NavigationManager {
        &self.navigation
    }

    /// The root event bus. Shells subscribe here to re-render.
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn pending_tasks(&self) -> usize {
        self.in_flight.len()
    }

    pub fn dispatch(&mut self, message: Message) {
        let mut queue = VecDeque::from([message]);
        while let Some(message) = queue.pop_front() {
            let (ready, futures) = self.update(message).into_parts();
            queue.extend(ready);
            self.in_flight.extend(futures);
        }
    }

    /// Resolve background work until nothing is left, dispatching each result.
    pub async fn run_until_idle(&mut self) {
        while let Some(message) = self.in_flight.next().await {
            self.dispatch(message);
        }
    }

    /// Resolve the next piece of background work. Returns false when idle.
    pub async fn step(&mut self) -> bool {
        match self.in_flight.next().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(request) => self.navigation.navigate(request, &self.state),
            Message::Panel(activation, message) => {
                self.navigation
                    .update_panel(activation, message, &mut self.state)
            }
            Message::Modal(message) => match self.navigation.update_modal(message) {
                Some(message) => Task::done(message),
                None => Task::none(),
            },
            Message::ContextMenu(message) => match self.navigation.update_context_menu(message) {
                Some(action) => self.menu_action(action),
                None => Task::none(),
            },
            Message::Project(message) => self.update_project(message),
            Message::Tree(message) => self.update_tree(message),
            Message::Fatal(err) => {
                self.fatal(err);
                Task::none()
            }
            Message::DismissNotice => {
                self.state.notice = None;
                Task::none()
            }
        }
    }

    fn menu_action(&mut self, action: MenuAction) -> Task<Message> {
        let modal = match action {
            MenuAction::OpenEntry(entry_id) => {
                return Task::done(Message::Navigate(NavigationRequest::Entry {
                    entry_id,
                    view: None,
                    origin: Origin::Home,
                }));
            }
            MenuAction::NewEntry { folder_id } => Modal::entry_creator(folder_id),
            MenuAction::NewFolder { parent_id } => Modal::FolderCreator {
                name: String::new(),
                parent_id,
            },
            MenuAction::RenameFolder { folder_id, name } => Modal::RenameFolder { folder_id, name },
            MenuAction::DeleteFolder { folder_id, name } => {
                Modal::ConfirmDelete(DeleteTarget::Folder { folder_id, name })
            }
            MenuAction::DeleteEntry { entry_id, title } => {
                Modal::ConfirmDelete(DeleteTarget::Entry { entry_id, title })
            }
        };
        self.navigation.open_modal(modal);
        Task::none()
    }

    /// Report a failed form submission inside the open modal.
    fn modal_failed(&mut self, context: &'static str, err: DomainError) -> Task<Message> {
        log_failure(context, &err);
        if err.class() == ErrorClass::Fatal {
            self.fatal(err);
            return Task::none();
        }
        let message = inline_message(&err, "The request failed");
        Task::done(Message::Modal(ModalMessage::Failed(message)))
    }

    fn update_project(&mut self, message: ProjectMessage) -> Task<Message> {
        match message {
            ProjectMessage::Create(project) => {
                let domain = self.domain.clone();
                Task::perform(
                    async move { domain.create_project(&project).await },
                    |result| Message::Project(ProjectMessage::Opened(result)),
                )
            }
            ProjectMessage::Load(path) => {
                let domain = self.domain.clone();
                Task::perform(
                    async move { domain.load_project(&path).await },
                    |result| Message::Project(ProjectMessage::Opened(result)),
                )
            }
            ProjectMessage::Opened(Ok(project)) => {
                if self.state.has_project() {
                    self.navigation.reset();
                }
                tracing::info!(project_id = project.id, name = %project.name, "project opened");
                let project_id = project.id;
                self.state.current_project = Some(ProjectState::new(project));
                self.state.notice = None;
                self.navigation.close_modal();
                self.bus.produce(ViewEvent::ProjectOpened { project_id });
                self.navigation.open_home(&self.state)
            }
            ProjectMessage::Opened(Err(err)) => self.modal_failed("open project", err),
            ProjectMessage::Close => {
                if !self.state.has_project() {
                    return Task::none();
                }
                self.end_session();
                let domain = self.domain.clone();
                Task::perform(
                    async move { domain.close_project().await },
                    |result| Message::Project(ProjectMessage::Closed(result)),
                )
            }
            ProjectMessage::Renamed { name, result } => {
                if !self.state.has_project() {
                    tracing::debug!(%name, "project closed, rename result dropped");
                    return Task::none();
                }
                if let Some(err) = self
                    .navigation
                    .project_renamed(&name, result, &mut self.state)
                {
                    self.fatal(err);
                }
                Task::none()
            }
            ProjectMessage::Closed(Ok(())) => {
                tracing::info!("project closed");
                Task::none()
            }
            ProjectMessage::Closed(Err(err)) => {
                log_failure("close_project", &err);
                Task::none()
            }
        }
    }

    fn end_session(&mut self) {
        self.navigation.reset();
        self.state.current_project = None;
        self.bus.produce(ViewEvent::ProjectClosed);
    }

    /// The session cannot continue: tell the user and drop all project state.
    fn fatal(&mut self, err: DomainError) {
        tracing::error!(%err, "fatal backend error, closing project");
        let notice = Notice::Blocking(err.to_string());
        self.state.notice = Some(notice.clone());
        if self.state.has_project() {
            self.end_session();
        } else {
            self.navigation.close_modal();
        }
        self.bus.produce(ViewEvent::Notice(notice));
    }

    fn update_tree(&mut self, message: TreeMessage) -> Task<Message> {
        if !self.state.has_project() {
            tracing::debug!(?message, "no project loaded, tree message dropped");
            return Task::none();
        }
        let domain = self.domain.clone();
        match message {
            TreeMessage::CreateEntry(entry) => Task::perform(
                async move { domain.create_entry(&entry).await },
                |result| Message::Tree(TreeMessage::EntryCreated(result)),
            ),
            TreeMessage::EntryCreated(Ok(entry)) => {
                let entry_id = entry.id;
                self.navigation.close_modal();
                if let Some(project) = self.state.current_project.as_mut() {
                    project.upsert_entry(entry.clone());
                }
                self.bus.produce(ViewEvent::EntryCreated(entry));
                Task::done(Message::Navigate(NavigationRequest::Entry {
                    entry_id,
                    view: None,
                    origin: Origin::Home,
                }))
            }
            TreeMessage::EntryCreated(Err(err)) => self.modal_failed("create_entry", err),
            TreeMessage::CreateFolder { name, parent_id } => Task::perform(
                async move { domain.create_folder(&name, parent_id).await },
                |result| Message::Tree(TreeMessage::FolderCreated(result)),
            ),
            TreeMessage::RenameFolder { folder_id, name } => Task::perform(
                async move { domain.rename_folder(folder_id, &name).await },
                |result| Message::Tree(TreeMessage::FolderRenamed(result)),
            ),
            TreeMessage::FolderCreated(Ok(folder)) | TreeMessage::FolderRenamed(Ok(folder)) => {
                self.navigation.close_modal();
                if let Some(project) = self.state.current_project.as_mut() {
                    project.folders.upsert(folder.clone());
                }
                self.bus.produce(ViewEvent::FolderChanged(folder));
                Task::none()
            }
            TreeMessage::FolderCreated(Err(err)) => self.modal_failed("create_folder", err),
            TreeMessage::FolderRenamed(Err(err)) => self.modal_failed("update_folder_name", err),
            TreeMessage::DeleteEntry(entry_id) => {
                if let Some(task) = self.navigation.delete_open_entry(entry_id) {
                    return task;
                }
                Task::perform(
                    async move { domain.delete_entry(entry_id).await },
                    move |result| Message::Tree(TreeMessage::EntryDeleteFinished { entry_id, result }),
                )
            }
            TreeMessage::EntryDeleteFinished { entry_id, result } => match result {
                Ok(()) => self.entry_removed(entry_id),
                Err(err) if err.is_not_found() => {
                    tracing::warn!(entry_id, "entry was already deleted");
                    self.entry_removed(entry_id)
                }
                Err(err) => self.tree_failed("delete_entry", err),
            },
            TreeMessage::DeleteFolder(folder_id) => Task::perform(
                async move { domain.delete_folder(folder_id).await },
                move |result| Message::Tree(TreeMessage::FolderDeleteFinished { folder_id, result }),
            ),
            TreeMessage::FolderDeleteFinished { folder_id, result } => match result {
                Ok(()) => self.folder_removed(folder_id),
                Err(err) if err.is_not_found() => {
                    tracing::warn!(folder_id, "folder was already deleted");
                    self.folder_removed(folder_id)
                }
                Err(err) => self.tree_failed("delete_folder", err),
            },
            TreeMessage::EntryRemoved(entry_id) => self.entry_removed(entry_id),
            TreeMessage::EntryRenamed { entry_id, title } => {
                if let Some(project) = self.state.current_project.as_mut() {
                    project.rename_entry(entry_id, &title);
                }
                self.bus.produce(ViewEvent::EntryRenamed { entry_id, title });
                Task::none()
            }
            TreeMessage::TitleFlushed {
                entry_id,
                title,
                result,
            } => match result {
                Ok(update) if update.is_title_unique => {
                    Task::done(Message::Tree(TreeMessage::EntryRenamed {
                        entry_id,
                        title: update.title,
                    }))
                }
                Ok(_) => {
                    tracing::warn!(entry_id, %title, "title sent on close was not unique");
                    Task::none()
                }
                Err(err) if err.is_not_found() => {
                    log_failure("update_entry_title", &err);
                    self.entry_removed(entry_id)
                }
                Err(err) => self.tree_failed("update_entry_title", err),
            },
            TreeMessage::EntryMissing(entry_id) => {
                let notice = Notice::Warning("The entry no longer exists".to_string());
                self.state.notice = Some(notice.clone());
                self.bus.produce(ViewEvent::Notice(notice));
                if let Some(project) = self.state.current_project.as_mut() {
                    project.remove_entry(entry_id);
                }
                self.bus.produce(ViewEvent::EntryDeleted { entry_id });
                self.navigation.open_home(&self.state)
            }
        }
    }

    fn tree_failed(&mut self, context: &'static str, err: DomainError) -> Task<Message> {
        log_failure(context, &err);
        if err.class() == ErrorClass::Fatal {
            self.fatal(err);
        }
        Task::none()
    }

    fn entry_removed(&mut self, entry_id: EntryId) -> Task<Message> {
        if let Some(project) = self.state.current_project.as_mut() {
            project.remove_entry(entry_id);
        }
        self.bus.produce(ViewEvent::EntryDeleted { entry_id });
        self.navigation
            .on_entries_removed(&[entry_id], &[], &self.state)
    }

    fn folder_removed(&mut self, folder_id: FolderId) -> Task<Message> {
        let Some(project) = self.state.current_project.as_mut() else {
            return Task::none();
        };
        let folder_ids = project.folders.descendants_of(folder_id);
        let entry_ids: Vec<EntryId> = project
            .entries
            .iter()
            .filter(|entry| folder_ids.contains(&entry.folder_id))
            .map(|entry| entry.id)
            .collect();
        let folder_ids = project.remove_folder(folder_id);
        tracing::info!(folder_id, folders = folder_ids.len(), entries = entry_ids.len(), "folder deleted");
        self.bus.produce(ViewEvent::FolderDeleted {
            folder_ids: folder_ids.clone(),
        });
        self.navigation
            .on_entries_removed(&entry_ids, &folder_ids, &self.state)
    }
}
