use serde::Serialize;
use std::collections::BTreeMap;

use crate::derive::Health;
use crate::derive::events::EventRow;
use crate::derive::relations::Related;
use crate::derive::resources::Resources;

// Response payloads, one shape per dashboard view.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodSummary {
    pub name: String,
    pub health: Health,
    pub image: String,
    pub resources: Resources,
    pub age: String,
    pub restarts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodHealthRow {
    pub name: String,
    pub status: String,
    pub health: Health,
    pub cpu: String,
    pub memory: String,
    pub restarts: i64,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerDetail {
    pub name: String,
    pub image: String,
    pub ready: bool,
    pub restarts: i32,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub resources: Resources,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodDetail {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub health: Health,
    pub age: String,
    pub created: String,
    pub labels: BTreeMap<String, String>,
    pub node: String,
    pub ip: String,
    /// Pod-level values: the last container declaring each one wins.
    pub resources: Resources,
    pub containers: Vec<ContainerDetail>,
    pub images: Vec<String>,
    pub total_restarts: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterImage {
    pub namespace: String,
    pub pod_name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceImage {
    pub pod_name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigMapSummary {
    pub name: String,
    pub keys: Vec<String>,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub secret_type: String,
    pub keys: Vec<String>,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub cluster_ip: String,
    pub external_ip: String,
    pub ports: Vec<String>,
    pub selector: BTreeMap<String, String>,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressPathView {
    pub path: String,
    pub service: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressRuleView {
    pub host: String,
    pub paths: Vec<IngressPathView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressTlsView {
    pub hosts: Vec<String>,
    pub secret_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressSummary {
    pub name: String,
    pub class: String,
    pub rules: Vec<IngressRuleView>,
    pub tls: Vec<IngressTlsView>,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaItem {
    pub resource: String,
    pub used: String,
    pub hard: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaSummary {
    pub name: String,
    pub resources: Vec<QuotaItem>,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugReport {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub details: serde_json::Value,
    pub events: Vec<EventRow>,
    pub related: Related,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextList {
    pub contexts: Vec<String>,
    pub active: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSwitched {
    pub success: bool,
    pub context: String,
}
