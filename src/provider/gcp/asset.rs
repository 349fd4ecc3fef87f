//! Cloud Asset Inventory feeds

use super::client::GcpClient;
use super::responses::ListFeedsResponse;
use super::service::CLOUD_ASSET;
use crate::provider::{AssetFeed, AssetFeeds, ProviderResult};
use async_trait::async_trait;

#[async_trait]
impl AssetFeeds for GcpClient {
    async fn list_feeds(&self, parent: &str) -> ProviderResult<Vec<AssetFeed>> {
        let url = format!("{}/v1/{parent}/feeds", self.endpoints().cloud_asset);
        let response: ListFeedsResponse = self.get_json(CLOUD_ASSET, &url, &[]).await?;
        Ok(response.feeds.into_iter().map(Into::into).collect())
    }

    async fn delete_feed(&self, name: &str) -> ProviderResult<()> {
        let url = format!("{}/v1/{name}", self.endpoints().cloud_asset);
        self.delete(CLOUD_ASSET, &url).await
    }
}
