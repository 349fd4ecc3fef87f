//! Service Management: managed services produced by a project

use super::client::{with_page_token, GcpClient};
use super::responses::ListServicesResponse;
use super::service::SERVICE_MANAGEMENT;
use crate::provider::{Page, ProviderResult, ServiceEndpoint, ServiceEndpoints};
use async_trait::async_trait;

#[async_trait]
impl ServiceEndpoints for GcpClient {
    async fn list_services(
        &self,
        project_id: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<ServiceEndpoint>> {
        let url = format!("{}/v1/services", self.endpoints().service_management);
        let query = with_page_token(
            vec![("producerProjectId", project_id.to_string())],
            page_token,
        );
        let response: ListServicesResponse =
            self.get_json(SERVICE_MANAGEMENT, &url, &query).await?;
        Ok(Page {
            items: response.services.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn delete_service(&self, service_name: &str) -> ProviderResult<()> {
        let url = format!(
            "{}/v1/services/{service_name}",
            self.endpoints().service_management
        );
        self.delete(SERVICE_MANAGEMENT, &url).await
    }
}
