use crate::core::domain::{
    DomainError, DomainManager, DomainResult, EntryId, EntryInfo, EntryRepository, ErrorClass,
    Folder, FolderRepository, Project, ProjectRepository,
};
use crate::gui::{
    AppState, Task,
    screens::{Panel, PanelDetails, PanelKind, PanelMessage, inline_message, log_failure},
    widgets::TitleField,
};

/// Landing panel of an open project: the project title and its contents.
///
/// Home is retained across navigation, so title commits report to the
/// application rather than to one activation. A commit sent while leaving
/// still lands in the field when it comes back.
#[derive(Debug)]
pub struct HomePanel {
    domain: DomainManager,
    title: TitleField,
    loading: bool,
}

#[derive(Debug)]
pub enum HomeMessage {
    TitleChanged(String),
    TitleBlurred,
    TitleCommitDue(u64),
    OverviewLoaded(DomainResult<(Vec<Folder>, Vec<EntryInfo>)>),
    OpenEntry(EntryId),
    Search(String),
}

#[derive(Debug)]
pub enum HomeParent {
    TitleCommitted {
        name: String,
        result: DomainResult<Project>,
    },
    OpenEntry(EntryId),
    Search(String),
    Fatal(DomainError),
}

impl HomePanel {
    pub fn new(domain: DomainManager, project_name: &str) -> Self {
        Self {
            domain,
            title: TitleField::new(project_name),
            loading: false,
        }
    }

    pub fn title(&self) -> &TitleField {
        &self.title
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn commit_title(&mut self, name: String) -> Task<PanelMessage<Self>> {
        let domain = self.domain.clone();
        Task::perform(
            async move {
                let result = domain.update_project_name(&name).await;
                (name, result)
            },
            |(name, result)| PanelMessage::Parent(HomeParent::TitleCommitted { name, result }),
        )
    }

    /// Send a title edit still waiting on its debounce.
    pub fn flush(&mut self) -> Task<PanelMessage<Self>> {
        match self.title.blur() {
            Some(name) => self.commit_title(name),
            None => Task::none(),
        }
    }

    /// Apply the outcome of a title commit. A fatal failure is handed back
    /// for the application to end the session.
    pub fn title_committed(
        &mut self,
        name: &str,
        result: DomainResult<Project>,
        state: &mut AppState,
    ) -> Option<DomainError> {
        match result {
            Ok(project) => {
                self.title.commit_succeeded(&project.name, true);
                if let Some(current) = state.current_project.as_mut() {
                    current.project = project;
                }
                None
            }
            Err(err) => {
                log_failure("update_project", &err);
                self.title
                    .commit_failed(name, inline_message(&err, "Could not rename project"));
                (err.class() == ErrorClass::Fatal).then_some(err)
            }
        }
    }
}

impl Panel for HomePanel {
    type Message = HomeMessage;
    type ParentMessage = HomeParent;

    fn kind(&self) -> PanelKind {
        PanelKind::Home
    }

    fn details(&self) -> PanelDetails {
        PanelDetails {
            kind: PanelKind::Home,
            entry: None,
        }
    }

    fn activate(&mut self, state: &AppState) -> Task<PanelMessage<Self>> {
        if let Some(project) = &state.current_project {
            self.title.sync(&project.project.name);
        }
        self.loading = true;
        let domain = self.domain.clone();
        Task::perform(
            async move {
                let folders = domain.get_folders().await?;
                let entries = domain.get_entries().await?;
                Ok((folders, entries))
            },
            |result| PanelMessage::Panel(HomeMessage::OverviewLoaded(result)),
        )
    }

    fn clean_up(&mut self) {
        self.loading = false;
    }

    fn update(&mut self, message: HomeMessage, state: &mut AppState) -> Task<PanelMessage<Self>> {
        match message {
            HomeMessage::TitleChanged(name) => match self.title.edit(name) {
                Some(revision) => Task::after(
                    state.config.title_commit_delay(),
                    PanelMessage::Panel(HomeMessage::TitleCommitDue(revision)),
                ),
                None => Task::none(),
            },
            HomeMessage::TitleCommitDue(revision) => match self.title.commit_due(revision) {
                Some(name) => self.commit_title(name),
                None => Task::none(),
            },
            HomeMessage::TitleBlurred => self.flush(),
            HomeMessage::OverviewLoaded(result) => {
                self.loading = false;
                match result {
                    Ok((folders, entries)) => {
                        if let Some(current) = state.current_project.as_mut() {
                            current.replace_tree(folders, entries);
                        }
                        Task::none()
                    }
                    Err(err) => {
                        log_failure("home overview", &err);
                        if err.class() == ErrorClass::Fatal {
                            Task::done(PanelMessage::Parent(HomeParent::Fatal(err)))
                        } else {
                            Task::none()
                        }
                    }
                }
            }
            HomeMessage::OpenEntry(entry_id) => {
                Task::done(PanelMessage::Parent(HomeParent::OpenEntry(entry_id)))
            }
            HomeMessage::Search(query) => Task::done(PanelMessage::Parent(HomeParent::Search(query))),
        }
    }
}
