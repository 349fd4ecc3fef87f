//! Cloud Logging sinks of a billing account

use super::client::{with_page_token, GcpClient};
use super::responses::ListSinksResponse;
use super::service::LOGGING;
use crate::provider::{BillingSinks, LogSink, Page, ProviderResult};
use async_trait::async_trait;

#[async_trait]
impl BillingSinks for GcpClient {
    async fn list_sinks(
        &self,
        parent: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<LogSink>> {
        let url = format!("{}/v2/{parent}/sinks", self.endpoints().logging);
        let query = with_page_token(vec![("pageSize", page_size.to_string())], page_token);
        let response: ListSinksResponse = self.get_json(LOGGING, &url, &query).await?;
        Ok(Page {
            items: response.sinks.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn delete_sink(&self, parent: &str, sink_name: &str) -> ProviderResult<()> {
        let url = format!("{}/v2/{parent}/sinks/{sink_name}", self.endpoints().logging);
        self.delete(LOGGING, &url).await
    }
}
