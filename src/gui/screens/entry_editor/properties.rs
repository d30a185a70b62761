use crate::core::domain::{DomainResult, EntryProperty, EntryRepository, ErrorClass};
use crate::gui::{
    Task,
    screens::{PanelMessage, inline_message, log_failure},
};

use super::{EditorMessage, EditorParent, EntryEditorPanel};

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRow {
    pub key: String,
    pub value: String,
    committed: String,
    in_flight: Option<String>,
    pub error: Option<String>,
}

impl PropertyRow {
    fn new(property: EntryProperty) -> Self {
        Self {
            key: property.key,
            committed: property.value.clone(),
            value: property.value,
            in_flight: None,
            error: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.value != self.committed
    }

    fn take_commit(&mut self) -> Option<String> {
        if !self.is_dirty() || self.in_flight.is_some() {
            return None;
        }
        self.in_flight = Some(self.value.clone());
        Some(self.value.clone())
    }

    /// Like `take_commit`, but does not wait for an earlier commit.
    fn take_pending(&mut self) -> Option<String> {
        if !self.is_dirty() || self.in_flight.as_deref() == Some(self.value.as_str()) {
            return None;
        }
        self.in_flight = Some(self.value.clone());
        Some(self.value.clone())
    }
}

/// Key/value properties. Each field commits on its own.
#[derive(Debug, Clone, Default)]
pub struct PropertyEditor {
    rows: Vec<PropertyRow>,
}

#[derive(Debug)]
pub enum PropertyMessage {
    Edit { key: String, value: String },
    Committed {
        key: String,
        value: String,
        result: DomainResult<EntryProperty>,
    },
}

impl PropertyEditor {
    pub fn new(properties: Vec<EntryProperty>) -> Self {
        Self {
            rows: properties.into_iter().map(PropertyRow::new).collect(),
        }
    }

    pub fn rows(&self) -> &[PropertyRow] {
        &self.rows
    }

    pub fn get(&self, key: &str) -> Option<&PropertyRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn is_dirty(&self) -> bool {
        self.rows.iter().any(PropertyRow::is_dirty)
    }

    fn row_mut(&mut self, key: &str) -> Option<&mut PropertyRow> {
        self.rows.iter_mut().find(|row| row.key == key)
    }

    /// Apply a local edit. Returns the value to commit, if one can go out now.
    pub fn edit(&mut self, key: &str, value: String) -> Option<String> {
        let row = self.row_mut(key)?;
        row.value = value;
        row.error = None;
        row.take_commit()
    }

    /// Every value still waiting to go out, as `(key, value)`. Fields with a
    /// commit in flight send their newer value right away.
    pub fn drain_pending(&mut self) -> Vec<(String, String)> {
        self.rows
            .iter_mut()
            .filter_map(|row| row.take_pending().map(|value| (row.key.clone(), value)))
            .collect()
    }

    /// Settle a commit of `value`. Returns the next value to commit for the
    /// same field, if the user kept typing meanwhile.
    pub fn finish_commit(
        &mut self,
        key: &str,
        value: &str,
        outcome: Result<EntryProperty, String>,
    ) -> Option<String> {
        let row = self.row_mut(key)?;
        if row.in_flight.as_deref() == Some(value) {
            row.in_flight = None;
        }
        match outcome {
            Ok(property) => {
                row.committed = property.value;
                row.take_commit()
            }
            Err(message) => {
                if row.value == value {
                    row.error = Some(message);
                    None
                } else {
                    row.take_commit()
                }
            }
        }
    }
}

impl EntryEditorPanel {
    fn commit_property(&mut self, key: String, value: String) -> Task<PanelMessage<Self>> {
        self.saves_in_flight += 1;
        let entry_id = self.entry_id;
        let domain = self.domain.clone();
        Task::perform(
            async move {
                let result = domain.update_entry_property(entry_id, &key, &value).await;
                (key, value, result)
            },
            |(key, value, result)| {
                PanelMessage::Panel(EditorMessage::Properties(PropertyMessage::Committed {
                    key,
                    value,
                    result,
                }))
            },
        )
    }

    /// Send property values queued behind an in-flight commit.
    pub(super) fn flush_properties(&mut self) -> Task<PanelMessage<Self>> {
        let Some(session) = self.session_mut() else {
            return Task::none();
        };
        let pending = session.properties.drain_pending();
        Task::batch(
            pending
                .into_iter()
                .map(|(key, value)| self.commit_property(key, value))
                .collect::<Vec<_>>(),
        )
    }

    pub(super) fn update_properties(
        &mut self,
        message: PropertyMessage,
    ) -> Task<PanelMessage<Self>> {
        match message {
            PropertyMessage::Edit { key, value } => {
                let Some(session) = self.session_mut() else {
                    return Task::none();
                };
                match session.properties.edit(&key, value) {
                    Some(value) => self.commit_property(key, value),
                    None => Task::none(),
                }
            }
            PropertyMessage::Committed { key, value, result } => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                let outcome = match result {
                    Ok(property) => Ok(property),
                    Err(err) => {
                        log_failure("update_entry_property", &err);
                        match err.class() {
                            ErrorClass::NotFound => return self.entry_missing(),
                            ErrorClass::Fatal => {
                                return Task::done(PanelMessage::Parent(EditorParent::Fatal(err)));
                            }
                            ErrorClass::Validation => Err(inline_message(&err, "Invalid value")),
                            ErrorClass::Unknown => Err("Could not save".to_string()),
                        }
                    }
                };
                let Some(session) = self.session_mut() else {
                    return Task::none();
                };
                match session.properties.finish_commit(&key, &value, outcome) {
                    Some(next) => self.commit_property(key, next),
                    None => Task::none(),
                }
            }
        }
    }
}
