use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    Empty,
    NotUnique,
    Rejected(String),
}

impl fmt::Display for TitleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleError::Empty => f.write_str("Empty title"),
            TitleError::NotUnique => f.write_str("Title is not unique"),
            TitleError::Rejected(msg) => f.write_str(msg),
        }
    }
}

/// An optimistically edited title with deferred commits.
///
/// Every edit bumps `revision`; a commit scheduled for an older revision is
/// dropped, so only the text the user settled on reaches the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleField {
    value: String,
    committed: String,
    in_flight: Option<String>,
    error: Option<TitleError>,
    revision: u64,
}

impl TitleField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            committed: value.clone(),
            value,
            in_flight: None,
            error: None,
            revision: 0,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn error(&self) -> Option<&TitleError> {
        self.error.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.value != self.committed
    }

    /// Replace the text. Returns the revision a commit should be scheduled
    /// for, or `None` if the text cannot be committed.
    pub fn edit(&mut self, value: impl Into<String>) -> Option<u64> {
        self.value = value.into();
        self.revision += 1;
        if self.value.trim().is_empty() {
            self.error = Some(TitleError::Empty);
            return None;
        }
        self.error = None;
        Some(self.revision)
    }

    /// The text to send once the delay for `revision` expired.
    pub fn commit_due(&mut self, revision: u64) -> Option<String> {
        if revision != self.revision {
            return None;
        }
        self.take_commit()
    }

    /// The text to send right away, e.g. when the field loses focus.
    pub fn blur(&mut self) -> Option<String> {
        self.take_commit()
    }

    fn take_commit(&mut self) -> Option<String> {
        if self.error.is_some() || !self.is_dirty() {
            return None;
        }
        if self.in_flight.as_deref() == Some(self.value.as_str()) {
            return None;
        }
        self.in_flight = Some(self.value.clone());
        Some(self.value.clone())
    }

    /// The backend accepted `title`. A duplicate keeps the local text and
    /// flags it until the next edit.
    pub fn commit_succeeded(&mut self, title: &str, is_unique: bool) {
        self.settle(title);
        if is_unique {
            self.committed = title.to_string();
        } else if self.value == title {
            self.error = Some(TitleError::NotUnique);
        }
    }

    pub fn commit_failed(&mut self, title: &str, message: impl Into<String>) {
        self.settle(title);
        if self.value == title {
            self.error = Some(TitleError::Rejected(message.into()));
        }
    }

    /// Adopt a value coming from elsewhere, unless the user is mid-edit.
    pub fn sync(&mut self, value: &str) {
        if !self.is_dirty() && self.in_flight.is_none() {
            self.value = value.to_string();
            self.committed = value.to_string();
            self.error = None;
        }
    }

    fn settle(&mut self, title: &str) {
        if self.in_flight.as_deref() == Some(title) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_never_commits() {
        let mut field = TitleField::new("MyWiki");
        assert_eq!(field.edit("   "), None);
        assert_eq!(field.error(), Some(&TitleError::Empty));
        assert_eq!(field.error().map(ToString::to_string).as_deref(), Some("Empty title"));
        assert_eq!(field.blur(), None);
    }

    #[test]
    fn only_latest_revision_commits() {
        let mut field = TitleField::new("a");
        let first = field.edit("ab").unwrap();
        let second = field.edit("abc").unwrap();
        assert_eq!(field.commit_due(first), None);
        assert_eq!(field.commit_due(second).as_deref(), Some("abc"));
        // Already in flight.
        assert_eq!(field.blur(), None);
        field.commit_succeeded("abc", true);
        assert!(!field.is_dirty());
        assert_eq!(field.committed(), "abc");
    }

    #[test]
    fn unchanged_text_is_not_committed() {
        let mut field = TitleField::new("same");
        let revision = field.edit("same").unwrap();
        assert_eq!(field.commit_due(revision), None);
    }

    #[test]
    fn duplicate_keeps_text_until_next_edit() {
        let mut field = TitleField::new("Orcs");
        let revision = field.edit("Elves").unwrap();
        let title = field.commit_due(revision).unwrap();
        field.commit_succeeded(&title, false);

        assert_eq!(field.value(), "Elves");
        assert_eq!(field.committed(), "Orcs");
        assert_eq!(field.error(), Some(&TitleError::NotUnique));
        assert_eq!(field.blur(), None);

        field.edit("Elves of the West").unwrap();
        assert_eq!(field.error(), None);
    }

    #[test]
    fn late_result_for_older_text_does_not_flag_current() {
        let mut field = TitleField::new("a");
        let revision = field.edit("b").unwrap();
        let sent = field.commit_due(revision).unwrap();
        field.edit("c").unwrap();
        field.commit_succeeded(&sent, false);
        assert_eq!(field.error(), None);
        assert_eq!(field.value(), "c");
    }

    #[test]
    fn sync_respects_pending_edits() {
        let mut field = TitleField::new("a");
        field.sync("b");
        assert_eq!(field.value(), "b");
        field.edit("mine").unwrap();
        field.sync("theirs");
        assert_eq!(field.value(), "mine");
    }
}
