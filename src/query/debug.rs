use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::network::{build_config_map_summary, build_secret_summary, build_service_summary};
use super::{Dashboard, or_empty};
use crate::clients::{ClusterApi, ClusterResult};
use crate::derive::events::{EventRow, event_rows};
use crate::derive::health::restart_count;
use crate::derive::images::pod_images;
use crate::derive::pod_health;
use crate::derive::relations::{
    Related, Target, ingress_dependencies, ingress_tls_secrets, ingresses_routing_to,
    ingresses_using_tls_secret, pod_dependencies, pods_for_service, pods_referencing,
    services_selecting,
};
use crate::error::{DashboardError, DashboardResult};
use crate::helpers::{NOT_AVAILABLE, format_age};
use crate::models::views::DebugReport;

/// Object kinds the debug view understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Pod,
    ConfigMap,
    Secret,
    Service,
    Ingress,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "pod",
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::Secret => "secret",
            ResourceKind::Service => "service",
            ResourceKind::Ingress => "ingress",
        }
    }

    /// Kind as it appears in `involvedObject.kind`.
    pub fn api_kind(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "Pod",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::Service => "Service",
            ResourceKind::Ingress => "Ingress",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pod" | "pods" => Ok(ResourceKind::Pod),
            "configmap" | "configmaps" | "cm" => Ok(ResourceKind::ConfigMap),
            "secret" | "secrets" => Ok(ResourceKind::Secret),
            "service" | "services" | "svc" => Ok(ResourceKind::Service),
            "ingress" | "ingresses" | "ing" => Ok(ResourceKind::Ingress),
            _ => Err(DashboardError::InvalidInput(format!(
                "unsupported resource type {:?}",
                s
            ))),
        }
    }
}

fn or_na(s: &str) -> &str {
    if s.is_empty() { NOT_AVAILABLE } else { s }
}

/// Fetches the object itself, then scans its namespace for linked objects.
async fn describe(
    api: &dyn ClusterApi,
    kind: ResourceKind,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> ClusterResult<(Value, Related)> {
    let ns = Some(namespace);
    let mut related = Related::default();

    let details = match kind {
        ResourceKind::Pod => {
            let pod = api.get_pod(namespace, name).await?;
            let services = or_empty(api.list_services(ns).await, "services", ns);

            related.services = services_selecting(&pod, &services);
            (related.config_maps, related.secrets) = pod_dependencies(&pod);

            json!({
                "status": pod.status.phase.as_str(),
                "node": or_na(&pod.spec.node_name),
                "ip": or_na(&pod.status.pod_ip),
                "health": pod_health(&pod),
                "restarts": restart_count(&pod),
                "age": format_age(pod.metadata.creation_timestamp.as_deref(), now),
                "images": pod_images(&pod),
                "labels": pod.metadata.labels.clone().unwrap_or_default(),
            })
        }
        ResourceKind::ConfigMap => {
            let cm = api.get_config_map(namespace, name).await?;
            let pods = or_empty(api.list_pods(ns).await, "pods", ns);

            related.pods = pods_referencing(&pods, Target::ConfigMap(name));

            let summary = build_config_map_summary(&cm, now);
            json!({ "keys": summary.keys, "age": summary.age })
        }
        ResourceKind::Secret => {
            let secret = api.get_secret(namespace, name).await?;
            let (pods, ingresses) = tokio::join!(api.list_pods(ns), api.list_ingresses(ns));

            related.pods = pods_referencing(&or_empty(pods, "pods", ns), Target::Secret(name));
            related.ingresses =
                ingresses_using_tls_secret(name, &or_empty(ingresses, "ingresses", ns));

            let summary = build_secret_summary(&secret, now);
            json!({
                "type": summary.secret_type,
                "keys": summary.keys,
                "age": summary.age,
            })
        }
        ResourceKind::Service => {
            let svc = api.get_service(namespace, name).await?;
            let (pods, ingresses) = tokio::join!(api.list_pods(ns), api.list_ingresses(ns));

            related.pods = pods_for_service(&svc, &or_empty(pods, "pods", ns));
            related.ingresses = ingresses_routing_to(name, &or_empty(ingresses, "ingresses", ns));

            let summary = build_service_summary(&svc, now);
            json!({
                "type": summary.service_type,
                "cluster_ip": summary.cluster_ip,
                "external_ip": summary.external_ip,
                "ports": summary.ports,
                "selector": summary.selector,
                "age": summary.age,
            })
        }
        ResourceKind::Ingress => {
            let ing = api.get_ingress(namespace, name).await?;

            (related.services, related.secrets) = ingress_dependencies(&ing);

            let hosts: Vec<&str> = ing
                .spec
                .rules
                .iter()
                .filter_map(|r| r.host.as_deref())
                .collect();
            json!({
                "class": ing.spec.ingress_class_name.clone().unwrap_or_default(),
                "hosts": hosts,
                "tls_secrets": ingress_tls_secrets(&ing),
                "age": format_age(ing.metadata.creation_timestamp.as_deref(), now),
            })
        }
    };

    Ok((details, related))
}

async fn object_events(
    api: &dyn ClusterApi,
    kind: ResourceKind,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> Vec<EventRow> {
    let events = or_empty(
        api.list_events(Some(namespace), Some((kind.api_kind(), name))).await,
        "events",
        Some(namespace),
    );
    event_rows(events, now)
}

impl Dashboard {
    /// Everything known about one object: its details, the events that
    /// mention it and the objects it is linked to.
    pub async fn debug_resource(
        &self,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> DashboardResult<DebugReport> {
        let kind: ResourceKind = kind.parse()?;
        let api = self.api().await;
        let now = Utc::now();

        let (described, events) = tokio::join!(
            describe(api.as_ref(), kind, namespace, name, now),
            object_events(api.as_ref(), kind, namespace, name, now)
        );
        let (details, related) = described?;

        Ok(DebugReport {
            kind: kind.as_str().to_string(),
            name: name.to_string(),
            details,
            events,
            related,
        })
    }
}
