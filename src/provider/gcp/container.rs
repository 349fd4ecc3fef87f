//! Kubernetes Engine clusters

use super::client::GcpClient;
use super::responses::ListClustersResponse;
use super::service::CONTAINER;
use crate::provider::{Cluster, ClusterManager, ProviderResult};
use async_trait::async_trait;

#[async_trait]
impl ClusterManager for GcpClient {
    async fn list_clusters(&self, project_id: &str) -> ProviderResult<Vec<Cluster>> {
        // `-` lists every zone and region in one call
        let url = format!(
            "{}/v1/projects/{project_id}/locations/-/clusters",
            self.endpoints().container
        );
        let response: ListClustersResponse = self.get_json(CONTAINER, &url, &[]).await?;
        Ok(response.clusters.into_iter().map(Into::into).collect())
    }

    async fn delete_cluster(&self, project_id: &str, cluster: &Cluster) -> ProviderResult<()> {
        let url = format!(
            "{}/v1/projects/{project_id}/locations/{}/clusters/{}",
            self.endpoints().container,
            cluster.location,
            cluster.name
        );
        self.delete(CONTAINER, &url).await
    }
}
