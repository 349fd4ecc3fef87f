//! Resource Manager v3 tag keys and tag values

use super::client::{with_page_token, GcpClient};
use super::responses::{ListTagKeysResponse, ListTagValuesResponse};
use super::service::RESOURCE_MANAGER;
use crate::provider::{Page, ProviderResult, TagKey, TagManager, TagValue};
use async_trait::async_trait;

#[async_trait]
impl TagManager for GcpClient {
    async fn list_tag_keys(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<TagKey>> {
        let url = format!("{}/v3/tagKeys", self.endpoints().resource_manager);
        let query = with_page_token(vec![("parent", parent.to_string())], page_token);
        let response: ListTagKeysResponse = self.get_json(RESOURCE_MANAGER, &url, &query).await?;
        Ok(Page {
            items: response.tag_keys.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn list_tag_values(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<TagValue>> {
        let url = format!("{}/v3/tagValues", self.endpoints().resource_manager);
        let query = with_page_token(vec![("parent", parent.to_string())], page_token);
        let response: ListTagValuesResponse =
            self.get_json(RESOURCE_MANAGER, &url, &query).await?;
        Ok(Page {
            items: response.tag_values.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn delete_tag_value(&self, name: &str) -> ProviderResult<()> {
        let url = format!("{}/v3/{name}", self.endpoints().resource_manager);
        self.delete(RESOURCE_MANAGER, &url).await
    }

    async fn delete_tag_key(&self, name: &str) -> ProviderResult<()> {
        let url = format!("{}/v3/{name}", self.endpoints().resource_manager);
        self.delete(RESOURCE_MANAGER, &url).await
    }
}
