//! Compute Engine hierarchical firewall policies

use super::client::{with_page_token, GcpClient};
use super::responses::FirewallPolicyList;
use super::service::COMPUTE;
use crate::provider::{FirewallPolicies, FirewallPolicy, Page, ProviderResult};
use async_trait::async_trait;

impl GcpClient {
    fn firewall_policy_url(&self, policy: &str) -> String {
        format!(
            "{}/compute/v1/locations/global/firewallPolicies/{policy}",
            self.endpoints().compute
        )
    }
}

#[async_trait]
impl FirewallPolicies for GcpClient {
    async fn list_firewall_policies(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<FirewallPolicy>> {
        let url = format!(
            "{}/compute/v1/locations/global/firewallPolicies",
            self.endpoints().compute
        );
        let query = with_page_token(vec![("parentId", parent.to_string())], page_token);
        let response: FirewallPolicyList = self.get_json(COMPUTE, &url, &query).await?;
        Ok(Page {
            items: response.items.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn remove_association(&self, policy: &str, association: &str) -> ProviderResult<()> {
        let url = format!("{}/removeAssociation", self.firewall_policy_url(policy));
        self.post_empty(COMPUTE, &url, &[("name", association.to_string())])
            .await
    }

    async fn delete_firewall_policy(&self, policy: &str) -> ProviderResult<()> {
        self.delete(COMPUTE, &self.firewall_policy_url(policy)).await
    }
}
