use std::{
    cell::RefCell,
    collections::{HashMap, HashSet, VecDeque},
    path::PathBuf,
    rc::Rc,
    time::Duration,
};

use futures::{FutureExt, future::LocalBoxFuture};
use lorekeep::core::domain::{
    EntityType, EntryId, EntryInfo, EntryProperty, Folder, FolderId, Project, Word,
};
use lorekeep::{Backend, Command, ErrorDescriptor, ErrorKind, RawResponse, Response};
use serde_json::{Value, json};
use time::OffsetDateTime;

#[derive(Debug, Default)]
struct Store {
    project: Option<Project>,
    loadable_name: Option<String>,
    folders: Vec<Folder>,
    entries: Vec<EntryInfo>,
    articles: HashMap<EntryId, Value>,
    properties: HashMap<EntryId, Vec<EntryProperty>>,
    words: Vec<Word>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn entry_index(&self, id: EntryId) -> Result<usize, Vec<ErrorDescriptor>> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| vec![not_found("Entry")])
    }

    fn remove_entry(&mut self, id: EntryId) {
        self.entries.retain(|entry| entry.id != id);
        self.articles.remove(&id);
        self.properties.remove(&id);
        self.words.retain(|word| word.language_id != id);
    }
}

fn not_found(entity_type: &str) -> ErrorDescriptor {
    ErrorDescriptor::new(ErrorKind::NotFound).with_entity_type(entity_type)
}

fn id_arg(args: &Value) -> i64 {
    args["id"].as_i64().unwrap_or_default()
}

fn str_arg(args: &Value, key: &str) -> String {
    args[key].as_str().unwrap_or_default().to_string()
}

/// In-memory stand-in for the native backend.
///
/// Every invocation is recorded. Failures can be queued per command and
/// responses can be held back for a while to interleave them with user input.
#[derive(Debug, Default)]
pub struct FakeBackend {
    store: RefCell<Store>,
    calls: RefCell<Vec<(Command, Value)>>,
    failures: RefCell<HashMap<Command, VecDeque<Vec<ErrorDescriptor>>>>,
    delays: RefCell<HashMap<Command, Duration>>,
    rejected_spellings: RefCell<HashSet<String>>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Name reported by `load_project`.
    pub fn set_loadable_project(&self, name: &str) {
        self.store.borrow_mut().loadable_name = Some(name.to_string());
    }

    pub fn seed_folder(&self, name: &str, parent_id: FolderId) -> FolderId {
        let mut store = self.store.borrow_mut();
        let id = store.next_id();
        store.folders.push(Folder {
            id,
            name: name.to_string(),
            parent_id,
        });
        id
    }

    pub fn seed_entry(&self, title: &str, entity_type: EntityType, folder_id: FolderId) -> EntryId {
        let mut store = self.store.borrow_mut();
        let id = store.next_id();
        store.entries.push(EntryInfo {
            id,
            entity_type,
            folder_id,
            title: title.to_string(),
        });
        id
    }

    pub fn seed_article(&self, entry_id: EntryId, doc: Value) {
        self.store.borrow_mut().articles.insert(entry_id, doc);
    }

    pub fn seed_property(&self, entry_id: EntryId, key: &str, value: &str) {
        self.store
            .borrow_mut()
            .properties
            .entry(entry_id)
            .or_default()
            .push(EntryProperty {
                key: key.to_string(),
                value: value.to_string(),
            });
    }

    pub fn seed_word(&self, language_id: EntryId, spelling: &str) -> i64 {
        let mut store = self.store.borrow_mut();
        let id = store.next_id();
        let mut word = Word::new(language_id, lorekeep::core::domain::WordType::Noun);
        word.id = Some(id);
        word.spelling = spelling.to_string();
        word.created = Some(OffsetDateTime::UNIX_EPOCH);
        word.updated = Some(OffsetDateTime::UNIX_EPOCH);
        store.words.push(word);
        id
    }

    /// Remove an entry behind the client's back.
    pub fn drop_entry(&self, entry_id: EntryId) {
        self.store.borrow_mut().remove_entry(entry_id);
    }

    pub fn entry(&self, entry_id: EntryId) -> Option<EntryInfo> {
        let store = self.store.borrow();
        store.entries.iter().find(|entry| entry.id == entry_id).cloned()
    }

    pub fn article(&self, entry_id: EntryId) -> Option<Value> {
        self.store.borrow().articles.get(&entry_id).cloned()
    }

    pub fn property(&self, entry_id: EntryId, key: &str) -> Option<String> {
        let store = self.store.borrow();
        store
            .properties
            .get(&entry_id)?
            .iter()
            .find(|property| property.key == key)
            .map(|property| property.value.clone())
    }

    pub fn words(&self, language_id: EntryId) -> Vec<Word> {
        let store = self.store.borrow();
        store
            .words
            .iter()
            .filter(|word| word.language_id == language_id)
            .cloned()
            .collect()
    }

    pub fn project_name(&self) -> Option<String> {
        self.store.borrow().project.as_ref().map(|project| project.name.clone())
    }

    /// The next call of `command` answers with `errors`.
    pub fn fail_next(&self, command: Command, errors: Vec<ErrorDescriptor>) {
        self.failures
            .borrow_mut()
            .entry(command)
            .or_default()
            .push_back(errors);
    }

    /// Hold responses to `command` back for `delay`.
    pub fn delay(&self, command: Command, delay: Duration) {
        self.delays.borrow_mut().insert(command, delay);
    }

    /// Upserted rows with this spelling come back with a field error.
    pub fn reject_spelling(&self, spelling: &str) {
        self.rejected_spellings
            .borrow_mut()
            .insert(spelling.to_string());
    }

    pub fn calls(&self) -> Vec<(Command, Value)> {
        self.calls.borrow().clone()
    }

    pub fn args_of(&self, command: Command) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|(called, _)| *called == command)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn count(&self, command: Command) -> usize {
        self.args_of(command).len()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn respond(&self, command: Command, args: &Value) -> RawResponse {
        let queued = self
            .failures
            .borrow_mut()
            .get_mut(&command)
            .and_then(VecDeque::pop_front);
        if let Some(errors) = queued {
            return Response::with_errors(Value::Null, errors);
        }
        match self.handle(command, args) {
            Ok(data) => Response::ok(data),
            Err(errors) => Response::with_errors(Value::Null, errors),
        }
    }

    fn handle(&self, command: Command, args: &Value) -> Result<Value, Vec<ErrorDescriptor>> {
        let mut store = self.store.borrow_mut();
        match command {
            Command::CreateProject => {
                let project = Project {
                    id: 1,
                    name: str_arg(args, "name"),
                    db_file_path: PathBuf::from(str_arg(args, "dbFilePath")),
                };
                store.project = Some(project.clone());
                return Ok(json!(project));
            }
            Command::LoadProject => {
                let project = Project {
                    id: 1,
                    name: store.loadable_name.clone().unwrap_or_else(|| "Loaded".into()),
                    db_file_path: PathBuf::from(str_arg(args, "dbFilePath")),
                };
                store.project = Some(project.clone());
                return Ok(json!(project));
            }
            _ => {}
        }
        if store.project.is_none() {
            return Err(vec![ErrorDescriptor::new(ErrorKind::ProjectNotLoaded)]);
        }
        match command {
            Command::CreateProject | Command::LoadProject => unreachable!(),
            Command::CloseProject => {
                store.project = None;
                Ok(Value::Null)
            }
            Command::GetProject => Ok(json!(store.project)),
            Command::UpdateProject => {
                let name = str_arg(args, "name");
                if name.trim().is_empty() {
                    return Err(vec![
                        ErrorDescriptor::new(ErrorKind::FieldInvalid).with_key("name"),
                    ]);
                }
                let project = store.project.as_mut().unwrap();
                project.name = name;
                Ok(json!(project))
            }
            Command::CreateFolder => {
                let folder = Folder {
                    id: store.next_id(),
                    name: str_arg(args, "name"),
                    parent_id: args["parentId"].as_i64().unwrap_or_default(),
                };
                store.folders.push(folder.clone());
                Ok(json!(folder))
            }
            Command::GetFolders => Ok(json!(store.folders)),
            Command::UpdateFolderName => {
                let id = id_arg(args);
                let folder = store
                    .folders
                    .iter_mut()
                    .find(|folder| folder.id == id)
                    .ok_or_else(|| vec![not_found("Folder")])?;
                folder.name = str_arg(args, "name");
                Ok(json!(folder))
            }
            Command::DeleteFolder => {
                let id = id_arg(args);
                if !store.folders.iter().any(|folder| folder.id == id) {
                    return Err(vec![not_found("Folder")]);
                }
                let mut doomed = vec![id];
                let mut index = 0;
                while index < doomed.len() {
                    let parent = doomed[index];
                    doomed.extend(
                        store
                            .folders
                            .iter()
                            .filter(|folder| folder.parent_id == parent)
                            .map(|folder| folder.id),
                    );
                    index += 1;
                }
                store.folders.retain(|folder| !doomed.contains(&folder.id));
                let entries: Vec<EntryId> = store
                    .entries
                    .iter()
                    .filter(|entry| doomed.contains(&entry.folder_id))
                    .map(|entry| entry.id)
                    .collect();
                for entry_id in entries {
                    store.remove_entry(entry_id);
                }
                Ok(Value::Null)
            }
            Command::CreateEntry => {
                let title = str_arg(args, "title");
                if store.entries.iter().any(|entry| entry.title == title) {
                    return Err(vec![
                        ErrorDescriptor::new(ErrorKind::FieldNotUnique)
                            .with_key("title")
                            .with_msg("Title is not unique"),
                    ]);
                }
                let entry = EntryInfo {
                    id: store.next_id(),
                    entity_type: serde_json::from_value(args["entityType"].clone())
                        .unwrap_or(EntityType::Article),
                    folder_id: args["folderId"].as_i64().unwrap_or_default(),
                    title,
                };
                store.entries.push(entry.clone());
                Ok(json!(entry))
            }
            Command::GetEntry => {
                let index = store.entry_index(id_arg(args))?;
                Ok(json!(store.entries[index]))
            }
            Command::GetEntries => Ok(json!(store.entries)),
            Command::SearchEntries => {
                let query = str_arg(args, "query").to_lowercase();
                let hits: Vec<&EntryInfo> = store
                    .entries
                    .iter()
                    .filter(|entry| entry.title.to_lowercase().contains(&query))
                    .collect();
                Ok(json!(hits))
            }
            Command::UpdateEntryTitle => {
                let id = id_arg(args);
                let title = str_arg(args, "title");
                let index = store.entry_index(id)?;
                if store
                    .entries
                    .iter()
                    .any(|entry| entry.id != id && entry.title == title)
                {
                    return Err(vec![
                        ErrorDescriptor::new(ErrorKind::FieldNotUnique).with_key("title"),
                    ]);
                }
                store.entries[index].title = title.clone();
                Ok(json!({ "title": title, "isTitleUnique": true }))
            }
            Command::GetArticleText => {
                let id = id_arg(args);
                store.entry_index(id)?;
                Ok(store.articles.get(&id).cloned().unwrap_or(Value::Null))
            }
            Command::UpdateArticleText => {
                let id = id_arg(args);
                store.entry_index(id)?;
                store.articles.insert(id, args["text"].clone());
                Ok(Value::Null)
            }
            Command::GetEntryProperties => {
                let id = id_arg(args);
                store.entry_index(id)?;
                Ok(json!(store.properties.get(&id).cloned().unwrap_or_default()))
            }
            Command::UpdateEntryProperty => {
                let id = id_arg(args);
                store.entry_index(id)?;
                let property = EntryProperty {
                    key: str_arg(args, "key"),
                    value: str_arg(args, "value"),
                };
                let properties = store.properties.entry(id).or_default();
                match properties.iter_mut().find(|existing| existing.key == property.key) {
                    Some(existing) => existing.value = property.value.clone(),
                    None => properties.push(property.clone()),
                }
                Ok(json!(property))
            }
            Command::DeleteEntry => {
                let id = id_arg(args);
                store.entry_index(id)?;
                store.remove_entry(id);
                Ok(Value::Null)
            }
            Command::GetWords => {
                let language_id = args["languageId"].as_i64().unwrap_or_default();
                store.entry_index(language_id)?;
                let words: Vec<&Word> = store
                    .words
                    .iter()
                    .filter(|word| word.language_id == language_id)
                    .collect();
                Ok(json!(words))
            }
            Command::UpsertWords => {
                let words: Vec<Word> =
                    serde_json::from_value(args["words"].clone()).unwrap_or_default();
                let mut rows = Vec::new();
                for mut word in words {
                    if self.rejected_spellings.borrow().contains(&word.spelling) {
                        rows.push(json!({
                            "data": null,
                            "errors": [ErrorDescriptor::new(ErrorKind::FieldInvalid)
                                .with_key("spelling")
                                .with_msg("Spelling rejected")],
                        }));
                        continue;
                    }
                    let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
                    match word.id {
                        Some(id) => {
                            word.updated = Some(now);
                            match store.words.iter_mut().find(|stored| stored.id == Some(id)) {
                                Some(stored) => *stored = word.clone(),
                                None => {
                                    rows.push(json!({ "data": null, "errors": [not_found("Word")] }));
                                    continue;
                                }
                            }
                        }
                        None => {
                            word.id = Some(store.next_id());
                            word.created = Some(now);
                            word.updated = Some(now);
                            store.words.push(word.clone());
                        }
                    }
                    rows.push(json!({ "data": word, "errors": [] }));
                }
                Ok(Value::Array(rows))
            }
            Command::DeleteWords => {
                let ids: Vec<i64> = serde_json::from_value(args["ids"].clone()).unwrap_or_default();
                store
                    .words
                    .retain(|word| word.id.is_none_or(|id| !ids.contains(&id)));
                Ok(Value::Null)
            }
        }
    }
}

impl Backend for FakeBackend {
    fn invoke(
        &self,
        command: Command,
        args: Value,
    ) -> LocalBoxFuture<'static, anyhow::Result<RawResponse>> {
        self.calls.borrow_mut().push((command, args.clone()));
        let response = self.respond(command, &args);
        match self.delays.borrow().get(&command).copied() {
            Some(delay) => async move {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            .boxed_local(),
            None => futures::future::ready(Ok(response)).boxed_local(),
        }
    }
}
