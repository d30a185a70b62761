use std::{fmt, future::Future, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::backend::{Command, ErrorKind};
use crate::core::domain::{
    DomainError, DomainManager, DomainResult, FolderId, decode, rich_text::Doc,
};

pub type EntryId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Article,
    Person,
    Language,
}

impl EntityType {
    /// Sub-views an open entry of this type can switch between, default first.
    pub fn views(self) -> &'static [EntryView] {
        match self {
            EntityType::Article => &[EntryView::Article],
            EntityType::Person => &[EntryView::Article, EntryView::Properties],
            EntityType::Language => &[EntryView::Article, EntryView::Properties, EntryView::Words],
        }
    }

    pub fn default_view(self) -> EntryView {
        EntryView::Article
    }

    pub fn supports(self, view: EntryView) -> bool {
        self.views().contains(&view)
    }
}

/// Mutually exclusive sub-views of an open entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryView {
    Article,
    Properties,
    Words,
}

impl EntryView {
    pub fn key(self) -> &'static str {
        match self {
            EntryView::Article => "article",
            EntryView::Properties => "properties",
            EntryView::Words => "words",
        }
    }
}

impl fmt::Display for EntryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EntryView {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(EntryView::Article),
            "properties" => Ok(EntryView::Properties),
            "words" => Ok(EntryView::Words),
            other => Err(anyhow::anyhow!("Unknown entry view: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    pub id: EntryId,
    pub entity_type: EntityType,
    pub folder_id: FolderId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub title: String,
    pub entity_type: EntityType,
    pub folder_id: FolderId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleUpdate {
    pub title: String,
    pub is_title_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryProperty {
    pub key: String,
    pub value: String,
}

pub trait EntryRepository {
    fn create_entry(&self, entry: &NewEntry) -> impl Future<Output = DomainResult<EntryInfo>>;
    fn get_entry(&self, id: EntryId) -> impl Future<Output = DomainResult<EntryInfo>>;
    fn get_entries(&self) -> impl Future<Output = DomainResult<Vec<EntryInfo>>>;
    fn search_entries(&self, query: &str) -> impl Future<Output = DomainResult<Vec<EntryInfo>>>;
    fn update_entry_title(
        &self,
        id: EntryId,
        title: &str,
    ) -> impl Future<Output = DomainResult<TitleUpdate>>;
    fn get_article_text(&self, id: EntryId) -> impl Future<Output = DomainResult<Doc>>;
    fn update_article_text(&self, id: EntryId, text: &Doc) -> impl Future<Output = DomainResult<()>>;
    fn get_entry_properties(
        &self,
        id: EntryId,
    ) -> impl Future<Output = DomainResult<Vec<EntryProperty>>>;
    fn update_entry_property(
        &self,
        id: EntryId,
        key: &str,
        value: &str,
    ) -> impl Future<Output = DomainResult<EntryProperty>>;
    fn delete_entry(&self, id: EntryId) -> impl Future<Output = DomainResult<()>>;
}

impl EntryRepository for DomainManager {
    async fn create_entry(&self, entry: &NewEntry) -> DomainResult<EntryInfo> {
        self.call(Command::CreateEntry, json!(entry)).await
    }

    async fn get_entry(&self, id: EntryId) -> DomainResult<EntryInfo> {
        self.call(Command::GetEntry, json!({ "id": id })).await
    }

    async fn get_entries(&self) -> DomainResult<Vec<EntryInfo>> {
        self.call(Command::GetEntries, json!({})).await
    }

    async fn search_entries(&self, query: &str) -> DomainResult<Vec<EntryInfo>> {
        self.call(Command::SearchEntries, json!({ "query": query }))
            .await
    }

    /// A duplicate title is not a failure: the backend may either flag it in
    /// `data` or report a lone `FieldNotUnique`, both become `is_title_unique: false`.
    async fn update_entry_title(&self, id: EntryId, title: &str) -> DomainResult<TitleUpdate> {
        let command = Command::UpdateEntryTitle;
        let response = self
            .call_raw(command, json!({ "id": id, "title": title }))
            .await?;
        if response.errors.is_empty() {
            return decode(command, response.data);
        }
        if response
            .errors
            .iter()
            .all(|error| error.kind == ErrorKind::FieldNotUnique)
        {
            return Ok(TitleUpdate {
                title: title.to_string(),
                is_title_unique: false,
            });
        }
        Err(DomainError::Backend {
            command,
            errors: response.errors,
        })
    }

    async fn get_article_text(&self, id: EntryId) -> DomainResult<Doc> {
        let text: Option<Doc> = self
            .call(Command::GetArticleText, json!({ "id": id }))
            .await?;
        Ok(text.unwrap_or_default())
    }

    async fn update_article_text(&self, id: EntryId, text: &Doc) -> DomainResult<()> {
        self.call(Command::UpdateArticleText, json!({ "id": id, "text": text }))
            .await
    }

    async fn get_entry_properties(&self, id: EntryId) -> DomainResult<Vec<EntryProperty>> {
        self.call(Command::GetEntryProperties, json!({ "id": id }))
            .await
    }

    async fn update_entry_property(
        &self,
        id: EntryId,
        key: &str,
        value: &str,
    ) -> DomainResult<EntryProperty> {
        self.call(
            Command::UpdateEntryProperty,
            json!({ "id": id, "key": key, "value": value }),
        )
        .await
    }

    async fn delete_entry(&self, id: EntryId) -> DomainResult<()> {
        self.call(Command::DeleteEntry, json!({ "id": id })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_follow_entity_type() {
        assert_eq!(EntityType::Article.views(), &[EntryView::Article]);
        assert!(EntityType::Language.supports(EntryView::Words));
        assert!(!EntityType::Person.supports(EntryView::Words));
        assert_eq!(EntityType::Person.default_view(), EntryView::Article);
    }

    #[test]
    fn view_keys_parse() {
        assert_eq!("words".parse::<EntryView>().unwrap(), EntryView::Words);
        assert!("lexicon".parse::<EntryView>().is_err());
    }
}
