//! Resource Manager: folders and liens (v3), projects (v1)
//!
//! Projects are read through v1 because its `filter` syntax understands
//! `parent.type` / `parent.id` and it reports `lifecycleState`.

use super::client::{with_page_token, GcpClient};
use super::responses::{
    FolderResource, ListFoldersResponse, ListLiensResponse, ListProjectsResponse, ProjectResource,
};
use super::service::RESOURCE_MANAGER;
use crate::provider::{Folder, Lien, Page, Project, ProviderResult, ResourceManager};
use async_trait::async_trait;

#[async_trait]
impl ResourceManager for GcpClient {
    async fn list_folders(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<Folder>> {
        let url = format!("{}/v3/folders", self.endpoints().resource_manager);
        let query = with_page_token(vec![("parent", parent.to_string())], page_token);
        let response: ListFoldersResponse = self.get_json(RESOURCE_MANAGER, &url, &query).await?;
        Ok(Page {
            items: response.folders.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn get_folder(&self, name: &str) -> ProviderResult<Folder> {
        let url = format!("{}/v3/{name}", self.endpoints().resource_manager);
        let folder: FolderResource = self.get_json(RESOURCE_MANAGER, &url, &[]).await?;
        Ok(folder.into())
    }

    async fn delete_folder(&self, name: &str) -> ProviderResult<()> {
        let url = format!("{}/v3/{name}", self.endpoints().resource_manager);
        self.delete(RESOURCE_MANAGER, &url).await
    }

    async fn list_projects(
        &self,
        filter: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<Project>> {
        let url = format!("{}/v1/projects", self.endpoints().resource_manager);
        let query = with_page_token(vec![("filter", filter.to_string())], page_token);
        let response: ListProjectsResponse =
            self.get_json(RESOURCE_MANAGER, &url, &query).await?;
        Ok(Page {
            items: response.projects.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn get_project(&self, project_id: &str) -> ProviderResult<Project> {
        let url = format!(
            "{}/v1/projects/{project_id}",
            self.endpoints().resource_manager
        );
        let project: ProjectResource = self.get_json(RESOURCE_MANAGER, &url, &[]).await?;
        Ok(project.into())
    }

    async fn delete_project(&self, project_id: &str) -> ProviderResult<()> {
        let url = format!(
            "{}/v1/projects/{project_id}",
            self.endpoints().resource_manager
        );
        self.delete(RESOURCE_MANAGER, &url).await
    }

    async fn list_liens(&self, parent: &str, page_token: Option<&str>) -> ProviderResult<Page<Lien>> {
        let url = format!("{}/v3/liens", self.endpoints().resource_manager);
        let query = with_page_token(vec![("parent", parent.to_string())], page_token);
        let response: ListLiensResponse = self.get_json(RESOURCE_MANAGER, &url, &query).await?;
        Ok(Page {
            items: response.liens.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn delete_lien(&self, name: &str) -> ProviderResult<()> {
        let url = format!("{}/v3/{name}", self.endpoints().resource_manager);
        self.delete(RESOURCE_MANAGER, &url).await
    }
}
