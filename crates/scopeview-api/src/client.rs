// Scope API HTTP client
//
// Wraps `reqwest::Client` with URL construction against the app server's
// base URL, option query strings, and envelope unwrapping for the node
// endpoints.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    NodeDetails, NodeDetailsResponse, NodeSummary, NodesResponse, Topology, TopologyOptions,
};
use crate::transport::TransportConfig;

/// HTTP client for a Scope-compatible app server.
///
/// All topology paths returned by the server (e.g. `/api/topology/hosts`)
/// are resolved against `base_url`, so a server mounted under a path prefix
/// keeps working.
#[derive(Debug, Clone)]
pub struct ScopeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ScopeClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The app server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /api/topology`: every topology the server knows about.
    pub async fn list_topologies(&self, options: &TopologyOptions) -> Result<Vec<Topology>, Error> {
        let url = self.api_url("/api/topology", options)?;
        self.get_json(url).await
    }

    /// `GET {topology_url}`: the nodes of one topology, keyed by node id.
    pub async fn topology_nodes(
        &self,
        topology_url: &str,
        options: &TopologyOptions,
    ) -> Result<IndexMap<String, NodeSummary>, Error> {
        let url = self.api_url(topology_url, options)?;
        let resp: NodesResponse = self.get_json(url).await?;
        Ok(resp.nodes)
    }

    /// `GET {topology_url}/{node_id}`: full details for a single node.
    pub async fn node_details(
        &self,
        topology_url: &str,
        node_id: &str,
        options: &TopologyOptions,
    ) -> Result<NodeDetails, Error> {
        let mut url = self.api_url(topology_url, options)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(node_id);
        let resp: NodeDetailsResponse = self.get_json(url).await?;
        Ok(resp.node)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute API path onto the base URL and append options as
    /// query parameters.
    pub(crate) fn api_url(&self, path: &str, options: &TopologyOptions) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))?;
        if !options.is_empty() {
            url.query_pairs_mut().extend_pairs(options.iter());
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                path: url.path().to_owned(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ScopeClient {
        ScopeClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_keeps_base_path_prefix() {
        let c = client("http://scope.local/prefix/");
        let url = c
            .api_url("/api/topology/hosts", &TopologyOptions::new())
            .unwrap();
        assert_eq!(url.as_str(), "http://scope.local/prefix/api/topology/hosts");
    }

    #[test]
    fn api_url_appends_sorted_options() {
        let c = client("http://scope.local");
        let mut opts = TopologyOptions::new();
        opts.insert("unconnected".into(), "hide".into());
        opts.insert("namespace".into(), "default".into());
        let url = c.api_url("/api/topology", &opts).unwrap();
        assert_eq!(url.query(), Some("namespace=default&unconnected=hide"));
    }

    #[test]
    fn api_url_without_options_has_no_query() {
        let c = client("http://scope.local");
        let url = c.api_url("/api/topology", &TopologyOptions::new()).unwrap();
        assert_eq!(url.query(), None);
    }
}
