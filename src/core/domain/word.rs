use std::{fmt, future::Future, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::backend::{Command, Response};
use crate::core::domain::{DomainError, DomainManager, DomainResult, EntryId};

pub type WordId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordType {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    Other,
}

impl WordType {
    pub const ALL: [WordType; 9] = [
        WordType::Noun,
        WordType::Verb,
        WordType::Adjective,
        WordType::Adverb,
        WordType::Pronoun,
        WordType::Preposition,
        WordType::Conjunction,
        WordType::Interjection,
        WordType::Other,
    ];
}

impl fmt::Display for WordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for WordType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WordType::ALL
            .into_iter()
            .find(|word_type| word_type.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown word type: {}", s))
    }
}

/// A lexicon row of a language entry.
///
/// `key` is generated on the client and never leaves it, so a row can be
/// tracked before the backend has assigned its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    #[serde(skip, default = "Uuid::new_v4")]
    pub key: Uuid,
    pub id: Option<WordId>,
    pub language_id: EntryId,
    pub word_type: WordType,
    pub spelling: String,
    pub definition: String,
    #[serde(default)]
    pub translations: Vec<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated: Option<OffsetDateTime>,
}

impl Word {
    pub fn new(language_id: EntryId, word_type: WordType) -> Self {
        Self {
            key: Uuid::new_v4(),
            id: None,
            language_id,
            word_type,
            spelling: String::new(),
            definition: String::new(),
            translations: Vec::new(),
            created: None,
            updated: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Same user-editable content, ignoring identity and timestamps.
    pub fn same_content(&self, other: &Word) -> bool {
        self.word_type == other.word_type
            && self.spelling == other.spelling
            && self.definition == other.definition
            && self.translations == other.translations
    }
}

/// Outcome of one row of a bulk upsert, positionally aligned with the request.
pub type WordUpsert = Response<Option<Word>>;

pub trait WordRepository {
    fn get_words(&self, language_id: EntryId) -> impl Future<Output = DomainResult<Vec<Word>>>;
    fn upsert_words(&self, words: &[Word]) -> impl Future<Output = DomainResult<Vec<WordUpsert>>>;
    fn delete_words(&self, ids: &[WordId]) -> impl Future<Output = DomainResult<()>>;
}

impl WordRepository for DomainManager {
    async fn get_words(&self, language_id: EntryId) -> DomainResult<Vec<Word>> {
        self.call(Command::GetWords, json!({ "languageId": language_id }))
            .await
    }

    async fn upsert_words(&self, words: &[Word]) -> DomainResult<Vec<WordUpsert>> {
        let command = Command::UpsertWords;
        let rows: Vec<WordUpsert> = self.call(command, json!({ "words": words })).await?;
        if rows.len() != words.len() {
            return Err(DomainError::MisalignedResponse {
                command,
                sent: words.len(),
                received: rows.len(),
            });
        }
        Ok(rows)
    }

    async fn delete_words(&self, ids: &[WordId]) -> DomainResult<()> {
        self.call(Command::DeleteWords, json!({ "ids": ids })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_not_serialized() {
        let word = Word::new(3, WordType::Noun);
        let json = serde_json::to_value(&word).unwrap();
        assert!(json.get("key").is_none());
        assert_eq!(json["languageId"], 3);
        assert_eq!(json["wordType"], "Noun");
    }

    #[test]
    fn decodes_timestamps() {
        let word: Word = serde_json::from_value(json!({
            "id": 9,
            "languageId": 3,
            "wordType": "Verb",
            "spelling": "ita",
            "definition": "to go",
            "translations": ["go"],
            "created": "2024-05-01T10:00:00Z",
            "updated": null
        }))
        .unwrap();
        assert_eq!(word.id, Some(9));
        assert_eq!(word.created.map(|t| t.year()), Some(2024));
        assert!(word.updated.is_none());
    }

    #[test]
    fn word_type_parses_case_insensitively() {
        assert_eq!("adjective".parse::<WordType>().unwrap(), WordType::Adjective);
        assert!("gerund".parse::<WordType>().is_err());
    }
}
