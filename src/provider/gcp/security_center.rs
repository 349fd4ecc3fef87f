//! Security Command Center notification configs

use super::client::{with_page_token, GcpClient};
use super::responses::ListNotificationConfigsResponse;
use super::service::SECURITY_CENTER;
use crate::provider::{NotificationConfig, Page, ProviderResult, SecurityNotifications};
use async_trait::async_trait;

#[async_trait]
impl SecurityNotifications for GcpClient {
    async fn list_notification_configs(
        &self,
        parent: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<NotificationConfig>> {
        let url = format!(
            "{}/v1/{parent}/notificationConfigs",
            self.endpoints().security_center
        );
        let query = with_page_token(vec![("pageSize", page_size.to_string())], page_token);
        let response: ListNotificationConfigsResponse =
            self.get_json(SECURITY_CENTER, &url, &query).await?;
        Ok(Page {
            items: response
                .notification_configs
                .into_iter()
                .map(Into::into)
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn delete_notification_config(&self, name: &str) -> ProviderResult<()> {
        let url = format!("{}/v1/{name}", self.endpoints().security_center);
        self.delete(SECURITY_CENTER, &url).await
    }
}
