use std::{future::Future, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::backend::Command;
use crate::core::domain::{DomainManager, DomainResult};

pub type ProjectId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub db_file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub db_file_path: PathBuf,
}

pub trait ProjectRepository {
    fn create_project(&self, project: &NewProject) -> impl Future<Output = DomainResult<Project>>;
    fn load_project(&self, db_file_path: &Path) -> impl Future<Output = DomainResult<Project>>;
    fn close_project(&self) -> impl Future<Output = DomainResult<()>>;
    fn get_project(&self) -> impl Future<Output = DomainResult<Project>>;
    fn update_project_name(&self, name: &str) -> impl Future<Output = DomainResult<Project>>;
}

impl ProjectRepository for DomainManager {
    async fn create_project(&self, project: &NewProject) -> DomainResult<Project> {
        self.call(Command::CreateProject, json!(project)).await
    }

    async fn load_project(&self, db_file_path: &Path) -> DomainResult<Project> {
        self.call(Command::LoadProject, json!({ "dbFilePath": db_file_path }))
            .await
    }

    async fn close_project(&self) -> DomainResult<()> {
        self.call(Command::CloseProject, json!({})).await
    }

    async fn get_project(&self) -> DomainResult<Project> {
        self.call(Command::GetProject, json!({})).await
    }

    async fn update_project_name(&self, name: &str) -> DomainResult<Project> {
        self.call(Command::UpdateProject, json!({ "name": name })).await
    }
}
