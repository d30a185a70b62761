use uuid::Uuid;

use crate::core::backend::{ErrorDescriptor, ErrorKind};
use crate::core::domain::{
    DomainResult, EntryId, ErrorClass, Word, WordId, WordRepository, WordType, WordUpsert,
};
use crate::gui::{
    AppState, Task,
    screens::{PanelMessage, log_failure},
    widgets::{CellPos, Direction, GridSelection},
};

use super::{EditorMessage, EditorParent, EntryEditorPanel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordField {
    WordType,
    Spelling,
    Definition,
    Translations,
}

impl WordField {
    pub const COLUMNS: [WordField; 4] = [
        WordField::WordType,
        WordField::Spelling,
        WordField::Definition,
        WordField::Translations,
    ];

    pub fn column(self) -> usize {
        self as usize
    }

    /// Field name as the backend reports it in error descriptors.
    pub fn key(self) -> &'static str {
        match self {
            WordField::WordType => "wordType",
            WordField::Spelling => "spelling",
            WordField::Definition => "definition",
            WordField::Translations => "translations",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WordRow {
    word: Word,
    /// Last content the backend accepted; `None` for rows never saved.
    snapshot: Option<Word>,
    errors: Vec<ErrorDescriptor>,
    revision: u64,
}

impl WordRow {
    fn new(word: Word) -> Self {
        Self {
            snapshot: word.is_persisted().then(|| word.clone()),
            word,
            errors: Vec::new(),
            revision: 0,
        }
    }

    pub fn key(&self) -> Uuid {
        self.word.key
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    pub fn errors(&self) -> &[ErrorDescriptor] {
        &self.errors
    }

    /// Errors that belong on `field`'s cell.
    pub fn errors_for(&self, field: WordField) -> impl Iterator<Item = &ErrorDescriptor> {
        self.errors
            .iter()
            .filter(move |error| error.key.as_deref() == Some(field.key()))
    }

    pub fn is_dirty(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_none_or(|snapshot| !snapshot.same_content(&self.word))
    }

    fn revert(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            self.word.word_type = snapshot.word_type;
            self.word.spelling.clone_from(&snapshot.spelling);
            self.word.definition.clone_from(&snapshot.definition);
            self.word.translations.clone_from(&snapshot.translations);
        }
    }
}

#[derive(Debug, Clone)]
struct SentRow {
    word: Word,
    revision: u64,
}

/// Rows of a language's lexicon, edited locally and saved in bulk.
///
/// Rows are identified by their local key, so a row added a moment ago can be
/// edited, saved or deleted before the backend gave it an id.
#[derive(Debug, Clone)]
pub struct WordTable {
    language_id: EntryId,
    rows: Vec<WordRow>,
    selection: Option<GridSelection>,
    in_flight: Option<Vec<SentRow>>,
    queued: bool,
    autosave_revision: u64,
    error: Option<String>,
    /// Ids the backend assigned to rows that were removed before their
    /// insert came back. They still have to be deleted remotely.
    orphans: Vec<WordId>,
}

#[derive(Debug)]
pub enum WordMessage {
    AddRow(WordType),
    Edit {
        key: Uuid,
        field: WordField,
        value: String,
    },
    SelectCell {
        cell: CellPos,
        extend: bool,
    },
    MoveSelection {
        direction: Direction,
        extend: bool,
    },
    DeleteRows(Vec<Uuid>),
    DeleteSelected,
    Save,
    AutosaveDue(u64),
    Saved(DomainResult<Vec<WordUpsert>>),
    Deleted {
        ids: Vec<WordId>,
        result: DomainResult<()>,
    },
}

impl WordTable {
    pub fn new(language_id: EntryId, words: Vec<Word>) -> Self {
        Self {
            language_id,
            rows: words.into_iter().map(WordRow::new).collect(),
            selection: None,
            in_flight: None,
            queued: false,
            autosave_revision: 0,
            error: None,
            orphans: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[WordRow] {
        &self.rows
    }

    pub fn row(&self, key: Uuid) -> Option<&WordRow> {
        self.rows.iter().find(|row| row.word.key == key)
    }

    pub fn selection(&self) -> Option<GridSelection> {
        self.selection
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.rows.iter().any(WordRow::is_dirty)
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    fn row_mut(&mut self, key: Uuid) -> Option<&mut WordRow> {
        self.rows.iter_mut().find(|row| row.word.key == key)
    }

    pub fn add_row(&mut self, word_type: WordType) -> Uuid {
        let word = Word::new(self.language_id, word_type);
        let key = word.key;
        self.rows.push(WordRow::new(word));
        self.selection = Some(GridSelection::single(CellPos::new(
            self.rows.len() - 1,
            WordField::Spelling.column(),
        )));
        key
    }

    /// Apply a cell edit. Returns false when nothing changed.
    pub fn edit(&mut self, key: Uuid, field: WordField, value: String) -> bool {
        let Some(row) = self.row_mut(key) else {
            tracing::debug!(%key, "edit for a row that no longer exists");
            return false;
        };
        row.errors
            .retain(|error| error.key.as_deref() != Some(field.key()));
        match field {
            WordField::WordType => match value.parse::<WordType>() {
                Ok(word_type) => row.word.word_type = word_type,
                Err(_) => {
                    row.errors.push(
                        ErrorDescriptor::new(ErrorKind::FieldInvalid)
                            .with_key(field.key())
                            .with_msg(format!("Unknown word type: {value}")),
                    );
                    return false;
                }
            },
            WordField::Spelling => row.word.spelling = value,
            WordField::Definition => row.word.definition = value,
            WordField::Translations => {
                row.word.translations = value
                    .split(',')
                    .map(str::trim)
                    .filter(|translation| !translation.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
        row.revision += 1;
        true
    }

    pub fn select(&mut self, cell: CellPos, extend: bool) {
        if cell.row >= self.rows.len() || cell.col >= WordField::COLUMNS.len() {
            return;
        }
        match self.selection.as_mut() {
            Some(selection) if extend => selection.extend_to(cell),
            _ => self.selection = Some(GridSelection::single(cell)),
        }
    }

    pub fn move_selection(&mut self, direction: Direction, extend: bool) {
        let rows = self.rows.len();
        match self.selection.as_mut() {
            Some(selection) => selection.step(direction, extend, rows, WordField::COLUMNS.len()),
            None if rows > 0 => self.selection = Some(GridSelection::single(CellPos::new(0, 0))),
            None => {}
        }
    }

    /// Keys of every row touched by the selection.
    pub fn selected_keys(&self) -> Vec<Uuid> {
        let Some(selection) = self.selection else {
            return Vec::new();
        };
        let rows = selection.rect().rows();
        self.rows
            .iter()
            .enumerate()
            .filter(|(index, _)| rows.contains(index))
            .map(|(_, row)| row.word.key)
            .collect()
    }

    /// Drop rows locally. Returns the backend ids that must be deleted too.
    pub fn remove_rows(&mut self, keys: &[Uuid]) -> Vec<WordId> {
        let mut ids = Vec::new();
        self.rows.retain(|row| {
            let removed = keys.contains(&row.word.key);
            if removed {
                ids.extend(row.word.id);
            }
            !removed
        });
        self.selection = self
            .selection
            .and_then(|selection| selection.clamped(self.rows.len(), WordField::COLUMNS.len()));
        ids
    }

    /// Words to send in one bulk upsert. While a save is in flight the request
    /// is remembered and retried once it settles.
    pub fn begin_save(&mut self) -> Option<Vec<Word>> {
        if self.in_flight.is_some() {
            self.queued = true;
            return None;
        }
        let dirty: Vec<&WordRow> = self.rows.iter().filter(|row| row.is_dirty()).collect();
        if dirty.is_empty() {
            return None;
        }
        let sent: Vec<SentRow> = dirty
            .iter()
            .map(|row| SentRow {
                word: row.word.clone(),
                revision: row.revision,
            })
            .collect();
        let words = sent.iter().map(|row| row.word.clone()).collect();
        self.in_flight = Some(sent);
        self.error = None;
        Some(words)
    }

    /// Apply the bulk upsert response. Entry `i` of `result` belongs to the
    /// `i`-th row that was sent. Returns true when another save should follow.
    pub fn finish_save(&mut self, result: Result<Vec<WordUpsert>, String>) -> bool {
        let Some(sent) = self.in_flight.take() else {
            return false;
        };
        match result {
            Ok(upserts) => {
                for (sent, upsert) in sent.into_iter().zip(upserts) {
                    self.apply_upsert(sent, upsert);
                }
            }
            Err(message) => self.error = Some(message),
        }
        std::mem::take(&mut self.queued)
    }

    fn apply_upsert(&mut self, sent: SentRow, upsert: WordUpsert) {
        let Some(row) = self.row_mut(sent.word.key) else {
            let assigned = upsert.data.and_then(|word| word.id);
            match assigned {
                Some(id) if sent.word.id.is_none() => {
                    tracing::debug!(key = %sent.word.key, id, "inserted row was removed meanwhile");
                    self.orphans.push(id);
                }
                _ => tracing::debug!(key = %sent.word.key, "saved row was removed meanwhile"),
            }
            return;
        };
        let unchanged = row.revision == sent.revision;
        if !upsert.errors.is_empty() {
            if unchanged {
                row.revert();
            }
            row.errors = upsert.errors;
            return;
        }
        row.errors.clear();
        let mut accepted = sent.word;
        if let Some(saved) = upsert.data {
            accepted.id = saved.id;
            accepted.created = saved.created;
            accepted.updated = saved.updated;
        }
        row.word.id = accepted.id;
        row.word.created = accepted.created;
        row.word.updated = accepted.updated;
        row.snapshot = Some(accepted);
    }

    /// Ids of inserted rows that were deleted locally while being saved.
    pub fn take_orphans(&mut self) -> Vec<WordId> {
        std::mem::take(&mut self.orphans)
    }

    fn next_autosave(&mut self) -> u64 {
        self.autosave_revision += 1;
        self.autosave_revision
    }
}

impl EntryEditorPanel {
    fn save_words(&mut self) -> Task<PanelMessage<Self>> {
        let Some(session) = self.session_mut() else {
            return Task::none();
        };
        let Some(words) = session.words.begin_save() else {
            return Task::none();
        };
        self.saves_in_flight += 1;
        let domain = self.domain.clone();
        Task::perform(
            async move { domain.upsert_words(&words).await },
            |result| PanelMessage::Panel(EditorMessage::Words(WordMessage::Saved(result))),
        )
    }

    fn schedule_autosave(&mut self, state: &AppState) -> Task<PanelMessage<Self>> {
        if !state.config.autosave_words {
            return Task::none();
        }
        let Some(session) = self.session_mut() else {
            return Task::none();
        };
        let revision = session.words.next_autosave();
        Task::after(
            state.config.word_autosave_delay(),
            PanelMessage::Panel(EditorMessage::Words(WordMessage::AutosaveDue(revision))),
        )
    }

    fn delete_word_rows(&mut self, keys: Vec<Uuid>, state: &AppState) -> Task<PanelMessage<Self>> {
        let Some(session) = self.session_mut() else {
            return Task::none();
        };
        let ids = session.words.remove_rows(&keys);
        if ids.is_empty() {
            return Task::none();
        }
        Task::batch([self.delete_word_ids(ids), self.schedule_autosave(state)])
    }

    fn delete_word_ids(&mut self, ids: Vec<WordId>) -> Task<PanelMessage<Self>> {
        if ids.is_empty() {
            return Task::none();
        }
        self.saves_in_flight += 1;
        let domain = self.domain.clone();
        Task::perform(
            async move {
                let result = domain.delete_words(&ids).await;
                (ids, result)
            },
            |(ids, result)| {
                PanelMessage::Panel(EditorMessage::Words(WordMessage::Deleted { ids, result }))
            },
        )
    }

    /// Send pending rows when autosave is on, e.g. before the editor goes away.
    pub(super) fn flush_words(&mut self, state: &AppState) -> Task<PanelMessage<Self>> {
        if state.config.autosave_words {
            self.save_words()
        } else {
            Task::none()
        }
    }

    pub(super) fn update_words(
        &mut self,
        message: WordMessage,
        state: &AppState,
    ) -> Task<PanelMessage<Self>> {
        let Some(session) = self.session_mut() else {
            return Task::none();
        };
        let table = &mut session.words;
        match message {
            WordMessage::AddRow(word_type) => {
                table.add_row(word_type);
                self.schedule_autosave(state)
            }
            WordMessage::Edit { key, field, value } => {
                if table.edit(key, field, value) {
                    self.schedule_autosave(state)
                } else {
                    Task::none()
                }
            }
            WordMessage::SelectCell { cell, extend } => {
                table.select(cell, extend);
                Task::none()
            }
            WordMessage::MoveSelection { direction, extend } => {
                table.move_selection(direction, extend);
                Task::none()
            }
            WordMessage::DeleteRows(keys) => self.delete_word_rows(keys, state),
            WordMessage::DeleteSelected => {
                let keys = table.selected_keys();
                self.delete_word_rows(keys, state)
            }
            WordMessage::Save => self.save_words(),
            WordMessage::AutosaveDue(revision) => {
                if revision == table.autosave_revision {
                    self.save_words()
                } else {
                    Task::none()
                }
            }
            WordMessage::Saved(result) => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                let result = match result {
                    Ok(upserts) => Ok(upserts),
                    Err(err) => {
                        log_failure("upsert_words", &err);
                        match err.class() {
                            ErrorClass::NotFound => return self.entry_missing(),
                            ErrorClass::Fatal => {
                                return Task::done(PanelMessage::Parent(EditorParent::Fatal(err)));
                            }
                            ErrorClass::Validation | ErrorClass::Unknown => Err(err.to_string()),
                        }
                    }
                };
                let Some(session) = self.session_mut() else {
                    return Task::none();
                };
                let resave = session.words.finish_save(result);
                let orphans = session.words.take_orphans();
                let save = if resave { self.save_words() } else { Task::none() };
                Task::batch([self.delete_word_ids(orphans), save])
            }
            WordMessage::Deleted { ids, result } => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                match result {
                    Ok(()) => {
                        tracing::debug!(count = ids.len(), "words deleted");
                        Task::none()
                    }
                    Err(err) if err.class() == ErrorClass::Fatal => {
                        Task::done(PanelMessage::Parent(EditorParent::Fatal(err)))
                    }
                    Err(err) => {
                        log_failure("delete_words", &err);
                        Task::none()
                    }
                }
            }
        }
    }
}
