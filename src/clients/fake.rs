//! In-memory cluster used by unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::ClusterConnector;
use super::{ClusterApi, ClusterResult};
use crate::error::{ClusterError, DashboardError};
use crate::models::k8s::{
    ConfigMap, Event, Ingress, Namespace, Node, ObjectMeta, Pod, ResourceQuota, Secret, Service,
};

#[derive(Clone, Default)]
pub struct FakeCluster {
    pub namespaces: Vec<Namespace>,
    pub pods: Vec<Pod>,
    pub nodes: Vec<Node>,
    pub events: Vec<Event>,
    pub config_maps: Vec<ConfigMap>,
    pub secrets: Vec<Secret>,
    pub services: Vec<Service>,
    pub ingresses: Vec<Ingress>,
    pub quotas: Vec<ResourceQuota>,
    pub(crate) failures: HashMap<&'static str, ClusterError>,
}

impl FakeCluster {
    /// Every read of `kind` (e.g. `"pods"`) fails with `err`.
    pub fn fail(mut self, kind: &'static str, err: ClusterError) -> Self {
        self.failures.insert(kind, err);
        self
    }

    fn check(&self, kind: &'static str) -> ClusterResult<()> {
        match self.failures.get(kind) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn into_api(self) -> Arc<dyn ClusterApi> {
        Arc::new(self)
    }
}

pub fn meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: name.to_string(),
        namespace: namespace.to_string(),
        ..Default::default()
    }
}

fn in_namespace<T: Clone>(
    items: &[T],
    namespace: Option<&str>,
    meta: impl Fn(&T) -> &ObjectMeta,
) -> Vec<T> {
    items
        .iter()
        .filter(|i| namespace.is_none_or(|ns| meta(i).namespace == ns))
        .cloned()
        .collect()
}

fn find<T: Clone>(
    items: &[T],
    kind: &str,
    namespace: &str,
    name: &str,
    meta: impl Fn(&T) -> &ObjectMeta,
) -> ClusterResult<T> {
    items
        .iter()
        .find(|i| meta(i).namespace == namespace && meta(i).name == name)
        .cloned()
        .ok_or_else(|| ClusterError::NotFound(format!("{} \"{}\" not found", kind, name)))
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_namespaces(&self) -> ClusterResult<Vec<Namespace>> {
        self.check("namespaces")?;
        Ok(self.namespaces.clone())
    }

    async fn list_pods(&self, namespace: Option<&str>) -> ClusterResult<Vec<Pod>> {
        self.check("pods")?;
        Ok(in_namespace(&self.pods, namespace, |p| &p.metadata))
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> ClusterResult<Pod> {
        self.check("pods")?;
        find(&self.pods, "pods", namespace, name, |p| &p.metadata)
    }

    async fn list_nodes(&self) -> ClusterResult<Vec<Node>> {
        self.check("nodes")?;
        Ok(self.nodes.clone())
    }

    async fn list_events(
        &self,
        namespace: Option<&str>,
        involved_object: Option<(&str, &str)>,
    ) -> ClusterResult<Vec<Event>> {
        self.check("events")?;
        Ok(in_namespace(&self.events, namespace, |e| &e.metadata)
            .into_iter()
            .filter(|e| {
                involved_object.is_none_or(|(kind, name)| {
                    e.involved_object.kind == kind && e.involved_object.name == name
                })
            })
            .collect())
    }

    async fn list_config_maps(&self, namespace: Option<&str>) -> ClusterResult<Vec<ConfigMap>> {
        self.check("configmaps")?;
        Ok(in_namespace(&self.config_maps, namespace, |c| &c.metadata))
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> ClusterResult<ConfigMap> {
        self.check("configmaps")?;
        find(&self.config_maps, "configmaps", namespace, name, |c| &c.metadata)
    }

    async fn list_secrets(&self, namespace: Option<&str>) -> ClusterResult<Vec<Secret>> {
        self.check("secrets")?;
        Ok(in_namespace(&self.secrets, namespace, |s| &s.metadata))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> ClusterResult<Secret> {
        self.check("secrets")?;
        find(&self.secrets, "secrets", namespace, name, |s| &s.metadata)
    }

    async fn list_services(&self, namespace: Option<&str>) -> ClusterResult<Vec<Service>> {
        self.check("services")?;
        Ok(in_namespace(&self.services, namespace, |s| &s.metadata))
    }

    async fn get_service(&self, namespace: &str, name: &str) -> ClusterResult<Service> {
        self.check("services")?;
        find(&self.services, "services", namespace, name, |s| &s.metadata)
    }

    async fn list_ingresses(&self, namespace: Option<&str>) -> ClusterResult<Vec<Ingress>> {
        self.check("ingresses")?;
        Ok(in_namespace(&self.ingresses, namespace, |i| &i.metadata))
    }

    async fn get_ingress(&self, namespace: &str, name: &str) -> ClusterResult<Ingress> {
        self.check("ingresses")?;
        find(&self.ingresses, "ingresses", namespace, name, |i| &i.metadata)
    }

    async fn list_resource_quotas(
        &self,
        namespace: Option<&str>,
    ) -> ClusterResult<Vec<ResourceQuota>> {
        self.check("resourcequotas")?;
        Ok(in_namespace(&self.quotas, namespace, |q| &q.metadata))
    }
}

/// Connector whose every context serves the same fake cluster.
pub struct FakeConnector {
    contexts: Vec<String>,
    cluster: FakeCluster,
}

impl FakeConnector {
    pub fn new(contexts: &[&str], cluster: FakeCluster) -> Self {
        Self {
            contexts: contexts.iter().map(|c| c.to_string()).collect(),
            cluster,
        }
    }
}

impl ClusterConnector for FakeConnector {
    fn contexts(&self) -> Vec<String> {
        self.contexts.clone()
    }

    fn default_context(&self) -> Option<String> {
        self.contexts.first().cloned()
    }

    fn connect(&self, context: &str) -> Result<Arc<dyn ClusterApi>, DashboardError> {
        if !self.contexts.iter().any(|c| c == context) {
            return Err(DashboardError::InvalidInput(format!(
                "unknown context {:?}",
                context
            )));
        }
        Ok(self.cluster.clone().into_api())
    }
}
