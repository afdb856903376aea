pub mod aggregator;
pub mod context;
#[cfg(test)]
pub mod fake;
pub mod kubeconfig;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClusterError;
use crate::models::k8s::{
    ConfigMap, Event, Ingress, Namespace, Node, ObjectList, Pod, ResourceQuota, Secret, Service,
    Status,
};

pub type ClusterResult<T> = Result<T, ClusterError>;

/// Read-only view of one cluster. `None` for a namespace means all namespaces.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_namespaces(&self) -> ClusterResult<Vec<Namespace>>;
    async fn list_pods(&self, namespace: Option<&str>) -> ClusterResult<Vec<Pod>>;
    async fn get_pod(&self, namespace: &str, name: &str) -> ClusterResult<Pod>;
    async fn list_nodes(&self) -> ClusterResult<Vec<Node>>;
    /// Events, optionally narrowed to one involved object given as
    /// `(kind, name)`, e.g. `("Pod", "web-1")`.
    async fn list_events(
        &self,
        namespace: Option<&str>,
        involved_object: Option<(&str, &str)>,
    ) -> ClusterResult<Vec<Event>>;
    async fn list_config_maps(&self, namespace: Option<&str>) -> ClusterResult<Vec<ConfigMap>>;
    async fn get_config_map(&self, namespace: &str, name: &str) -> ClusterResult<ConfigMap>;
    async fn list_secrets(&self, namespace: Option<&str>) -> ClusterResult<Vec<Secret>>;
    async fn get_secret(&self, namespace: &str, name: &str) -> ClusterResult<Secret>;
    async fn list_services(&self, namespace: Option<&str>) -> ClusterResult<Vec<Service>>;
    async fn get_service(&self, namespace: &str, name: &str) -> ClusterResult<Service>;
    async fn list_ingresses(&self, namespace: Option<&str>) -> ClusterResult<Vec<Ingress>>;
    async fn get_ingress(&self, namespace: &str, name: &str) -> ClusterResult<Ingress>;
    async fn list_resource_quotas(
        &self,
        namespace: Option<&str>,
    ) -> ClusterResult<Vec<ResourceQuota>>;
}

const CORE: &[&str] = &["api", "v1"];
const NETWORKING: &[&str] = &["apis", "networking.k8s.io", "v1"];

#[derive(Debug, Clone)]
pub enum Credentials {
    None,
    Bearer(String),
    Basic { username: String, password: String },
}

/// HTTP client for a Kubernetes-compatible API server.
pub struct ApiClient {
    pub server: String,
    http: Client,
    credentials: Credentials,
    page_size: u32,
}

impl ApiClient {
    /// `http` carries TLS settings and the per-request timeout.
    pub fn new(server: String, http: Client, credentials: Credentials, page_size: u32) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            http,
            credentials,
            page_size,
        }
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::None => req,
            Credentials::Bearer(token) => req.bearer_auth(token),
            Credentials::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }

    fn resource_path<'a>(
        group: &[&'a str],
        namespace: Option<&'a str>,
        plural: &'a str,
    ) -> Vec<&'a str> {
        let mut segments = group.to_vec();
        if let Some(ns) = namespace {
            segments.extend(["namespaces", ns]);
        }
        segments.push(plural);
        segments
    }

    /// Server URL with `segments` appended, each percent-encoded as a single
    /// path segment so that names cannot address a different object.
    fn url(&self, segments: &[&str]) -> ClusterResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ClusterError::NotFound(format!("invalid object name {:?}", bad)));
        }

        let mut url = Url::parse(&self.server).map_err(|e| {
            ClusterError::Unknown(format!("invalid server URL {}: {}", self.server, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| ClusterError::Unknown(format!("server URL {} has no path", self.server)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ClusterResult<T> {
        let url = self.url(segments)?;
        let path = url.path().to_string();
        let req = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .query(query);

        let resp = self.authorize(req).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, &path, &body));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            ClusterError::Unknown(format!("decoding response from {}: {}", path, e))
        })
    }

    /// Follows `continue` tokens until the list is complete.
    async fn list_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        extra: &[(&str, String)],
    ) -> ClusterResult<Vec<T>> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = extra.to_vec();
            query.push(("limit", self.page_size.to_string()));
            if let Some(ref t) = token {
                query.push(("continue", t.clone()));
            }

            let page: ObjectList<T> = self.get_json(segments, &query).await?;
            items.extend(page.items);

            match page.metadata.continue_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        debug!(path = %segments.join("/"), count = items.len(), "listed");
        Ok(items)
    }

    async fn get_named<T: DeserializeOwned>(
        &self,
        group: &[&str],
        namespace: &str,
        plural: &str,
        name: &str,
    ) -> ClusterResult<T> {
        let mut segments = Self::resource_path(group, Some(namespace), plural);
        segments.push(name);
        self.get_json(&segments, &[]).await
    }
}

/// Maps a non-2xx API response onto the error taxonomy.
pub fn classify_status(status: StatusCode, path: &str, body: &str) -> ClusterError {
    let message = serde_json::from_str::<Status>(body)
        .ok()
        .map(|s| s.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("GET {} returned {}", path, status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClusterError::Forbidden(message),
        StatusCode::NOT_FOUND => ClusterError::NotFound(message),
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ClusterError::Transient(message),
        _ => ClusterError::Unknown(message),
    }
}

#[async_trait]
impl ClusterApi for ApiClient {
    async fn list_namespaces(&self) -> ClusterResult<Vec<Namespace>> {
        self.list_all(&Self::resource_path(CORE, None, "namespaces"), &[])
            .await
    }

    async fn list_pods(&self, namespace: Option<&str>) -> ClusterResult<Vec<Pod>> {
        self.list_all(&Self::resource_path(CORE, namespace, "pods"), &[])
            .await
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> ClusterResult<Pod> {
        self.get_named(CORE, namespace, "pods", name).await
    }

    async fn list_nodes(&self) -> ClusterResult<Vec<Node>> {
        self.list_all(&Self::resource_path(CORE, None, "nodes"), &[])
            .await
    }

    async fn list_events(
        &self,
        namespace: Option<&str>,
        involved_object: Option<(&str, &str)>,
    ) -> ClusterResult<Vec<Event>> {
        let mut query = Vec::new();
        if let Some((kind, name)) = involved_object {
            query.push((
                "fieldSelector",
                format!("involvedObject.kind={},involvedObject.name={}", kind, name),
            ));
        }
        self.list_all(&Self::resource_path(CORE, namespace, "events"), &query)
            .await
    }

    async fn list_config_maps(&self, namespace: Option<&str>) -> ClusterResult<Vec<ConfigMap>> {
        self.list_all(&Self::resource_path(CORE, namespace, "configmaps"), &[])
            .await
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> ClusterResult<ConfigMap> {
        self.get_named(CORE, namespace, "configmaps", name).await
    }

    async fn list_secrets(&self, namespace: Option<&str>) -> ClusterResult<Vec<Secret>> {
        self.list_all(&Self::resource_path(CORE, namespace, "secrets"), &[])
            .await
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> ClusterResult<Secret> {
        self.get_named(CORE, namespace, "secrets", name).await
    }

    async fn list_services(&self, namespace: Option<&str>) -> ClusterResult<Vec<Service>> {
        self.list_all(&Self::resource_path(CORE, namespace, "services"), &[])
            .await
    }

    async fn get_service(&self, namespace: &str, name: &str) -> ClusterResult<Service> {
        self.get_named(CORE, namespace, "services", name).await
    }

    async fn list_ingresses(&self, namespace: Option<&str>) -> ClusterResult<Vec<Ingress>> {
        self.list_all(&Self::resource_path(NETWORKING, namespace, "ingresses"), &[])
            .await
    }

    async fn get_ingress(&self, namespace: &str, name: &str) -> ClusterResult<Ingress> {
        self.get_named(NETWORKING, namespace, "ingresses", name)
            .await
    }

    async fn list_resource_quotas(
        &self,
        namespace: Option<&str>,
    ) -> ClusterResult<Vec<ResourceQuota>> {
        self.list_all(&Self::resource_path(CORE, namespace, "resourcequotas"), &[])
            .await
    }
}
