use super::request::query_pairs;
use crate::config::ApiConfig;
use crate::{Result, TopologyError};
use netcost_common::{NamespaceList, TopologyRequest, TopologyResponse};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const TOPOLOGY_PATH: &str = "api/network/topology";
pub const NAMESPACES_PATH: &str = "api/cost/namespaces";

/// REST client for the cost dashboard API
#[derive(Debug, Clone)]
pub struct TopologyClient {
    http: reqwest::Client,
    base_url: Url,
    cluster_id: Option<String>,
}

impl TopologyClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("netcost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Self::from_reqwest(&config.base_url, http, config.cluster_id.clone())
    }

    /// Wrap an existing `reqwest::Client`
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        cluster_id: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            cluster_id,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // Trailing slash so relative API paths join under any path prefix
    fn normalize_base_url(raw: &str) -> Result<Url> {
        let mut url = Url::parse(raw.trim())?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{}/", path));
        Ok(url)
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.base_url.join(path)?;
        debug!("GET {} params={:?}", url, params);

        let response = self.http.get(url).query(params).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("Request failed with {}", status.as_u16())
            } else {
                body
            };
            return Err(TopologyError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_topology(&self, request: &TopologyRequest) -> Result<TopologyResponse> {
        let params = query_pairs(request, self.cluster_id.as_deref());
        let response: TopologyResponse = self.get_with_params(TOPOLOGY_PATH, &params).await?;

        debug!(
            "Fetched {} of {} edges for cluster {}",
            response.edges.len(),
            response.total_edges,
            response.cluster_id
        );
        Ok(response)
    }

    /// Sorted, de-duplicated namespace names
    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        let list: NamespaceList = self.get_with_params(NAMESPACES_PATH, &[]).await?;

        let mut names: Vec<String> = list
            .records
            .into_iter()
            .map(|record| record.namespace)
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
