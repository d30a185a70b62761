use std::{cell::RefCell, rc::Rc};

use crate::core::domain::{
    DomainError, DomainManager, DomainResult, EntryId, EntryInfo, EntryRepository, ErrorClass,
};
use crate::gui::{
    AppState, Task,
    events::{EventBus, ViewEvent},
    producer::SubscriptionId,
    screens::{Panel, PanelDetails, PanelKind, PanelMessage, log_failure},
};

/// Full-text entry search.
///
/// Queries are debounced; only the response to the most recent query is
/// applied. While active, the panel listens on the event bus so its hits
/// follow renames and deletions made elsewhere.
#[derive(Debug)]
pub struct SearchPanel {
    domain: DomainManager,
    bus: Rc<EventBus>,
    subscription: Option<SubscriptionId>,
    query: String,
    revision: u64,
    searching: bool,
    results: Rc<RefCell<Vec<EntryInfo>>>,
}

#[derive(Debug)]
pub enum SearchMessage {
    QueryChanged(String),
    SearchDue(u64),
    ResultsLoaded {
        revision: u64,
        result: DomainResult<Vec<EntryInfo>>,
    },
    Open(EntryId),
}

#[derive(Debug)]
pub enum SearchParent {
    OpenEntry(EntryId),
    Fatal(DomainError),
}

impl SearchPanel {
    pub fn new(domain: DomainManager, bus: Rc<EventBus>) -> Self {
        Self {
            domain,
            bus,
            subscription: None,
            query: String::new(),
            revision: 0,
            searching: false,
            results: Rc::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn results(&self) -> Vec<EntryInfo> {
        self.results.borrow().clone()
    }

    /// Replace the query before the next activation runs it.
    pub fn seed(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.revision += 1;
    }

    fn search(&mut self) -> Task<PanelMessage<Self>> {
        if self.query.trim().is_empty() {
            self.searching = false;
            self.results.borrow_mut().clear();
            return Task::none();
        }
        self.searching = true;
        let revision = self.revision;
        let query = self.query.clone();
        let domain = self.domain.clone();
        Task::perform(
            async move { domain.search_entries(&query).await },
            move |result| PanelMessage::Panel(SearchMessage::ResultsLoaded { revision, result }),
        )
    }
}

fn follow_event(results: &RefCell<Vec<EntryInfo>>, event: &ViewEvent) {
    let mut results = results.borrow_mut();
    match event {
        ViewEvent::EntryRenamed { entry_id, title } => {
            if let Some(hit) = results.iter_mut().find(|hit| hit.id == *entry_id) {
                hit.title.clone_from(title);
            }
        }
        ViewEvent::EntryDeleted { entry_id } => results.retain(|hit| hit.id != *entry_id),
        ViewEvent::FolderDeleted { folder_ids } => {
            results.retain(|hit| !folder_ids.contains(&hit.folder_id));
        }
        _ => {}
    }
}

impl Panel for SearchPanel {
    type Message = SearchMessage;
    type ParentMessage = SearchParent;

    fn kind(&self) -> PanelKind {
        PanelKind::Search
    }

    fn details(&self) -> PanelDetails {
        PanelDetails {
            kind: PanelKind::Search,
            entry: None,
        }
    }

    fn activate(&mut self, _state: &AppState) -> Task<PanelMessage<Self>> {
        if self.subscription.is_none() {
            let results = Rc::clone(&self.results);
            self.subscription = Some(
                self.bus
                    .subscribe(move |event| follow_event(&results, &event)),
            );
        }
        self.search()
    }

    fn clean_up(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.bus.unsubscribe(id);
        }
        self.searching = false;
    }

    fn update(
        &mut self,
        message: SearchMessage,
        state: &mut AppState,
    ) -> Task<PanelMessage<Self>> {
        match message {
            SearchMessage::QueryChanged(query) => {
                self.seed(query);
                if self.query.trim().is_empty() {
                    return self.search();
                }
                Task::after(
                    state.config.search_delay(),
                    PanelMessage::Panel(SearchMessage::SearchDue(self.revision)),
                )
            }
            SearchMessage::SearchDue(revision) if revision == self.revision => self.search(),
            SearchMessage::SearchDue(_) => Task::none(),
            SearchMessage::ResultsLoaded { revision, result } => {
                if revision != self.revision {
                    tracing::debug!(revision, current = self.revision, "dropping outdated search results");
                    return Task::none();
                }
                self.searching = false;
                match result {
                    Ok(hits) => {
                        *self.results.borrow_mut() = hits;
                        Task::none()
                    }
                    Err(err) => {
                        log_failure("search_entries", &err);
                        if err.class() == ErrorClass::Fatal {
                            Task::done(PanelMessage::Parent(SearchParent::Fatal(err)))
                        } else {
                            Task::none()
                        }
                    }
                }
            }
            SearchMessage::Open(entry_id) => {
                Task::done(PanelMessage::Parent(SearchParent::OpenEntry(entry_id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: EntryId, folder_id: i64, title: &str) -> EntryInfo {
        EntryInfo {
            id,
            entity_type: crate::core::domain::EntityType::Article,
            folder_id,
            title: title.to_string(),
        }
    }

    #[test]
    fn hits_follow_renames_and_deletes() {
        let results = RefCell::new(vec![hit(1, 0, "Alpha"), hit(2, 5, "Beta"), hit(3, 0, "Gamma")]);
        follow_event(
            &results,
            &ViewEvent::EntryRenamed {
                entry_id: 1,
                title: "Aleph".into(),
            },
        );
        follow_event(&results, &ViewEvent::FolderDeleted { folder_ids: vec![5] });
        follow_event(&results, &ViewEvent::EntryDeleted { entry_id: 3 });

        let results = results.into_inner();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Aleph");
    }
}
