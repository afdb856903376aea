use chrono::{DateTime, Utc};

use super::{Dashboard, or_empty};
use crate::derive::events::{EventRow, event_rows};
use crate::helpers::format_age;
use crate::models::k8s::{ConfigMap, Ingress, ResourceQuota, Secret, Service, ServicePort};
use crate::models::views::{
    ConfigMapSummary, IngressPathView, IngressRuleView, IngressSummary, IngressTlsView, QuotaItem,
    QuotaSummary, SecretSummary, ServiceSummary,
};

pub fn build_config_map_summary(cm: &ConfigMap, now: DateTime<Utc>) -> ConfigMapSummary {
    let mut keys: Vec<String> = cm
        .data
        .iter()
        .chain(cm.binary_data.iter())
        .flat_map(|m| m.keys().cloned())
        .collect();
    keys.sort();
    keys.dedup();

    ConfigMapSummary {
        name: cm.metadata.name.clone(),
        keys,
        age: format_age(cm.metadata.creation_timestamp.as_deref(), now),
    }
}

/// Key names only; secret values are never copied out.
pub fn build_secret_summary(secret: &Secret, now: DateTime<Utc>) -> SecretSummary {
    SecretSummary {
        name: secret.metadata.name.clone(),
        secret_type: if secret.secret_type.is_empty() {
            "Opaque".to_string()
        } else {
            secret.secret_type.clone()
        },
        keys: secret
            .data
            .as_ref()
            .map(|d| d.keys().cloned().collect())
            .unwrap_or_default(),
        age: format_age(secret.metadata.creation_timestamp.as_deref(), now),
    }
}

pub fn service_type(svc: &Service) -> &str {
    svc.spec
        .service_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("ClusterIP")
}

/// Where the service is reachable from outside the cluster.
pub fn external_address(svc: &Service) -> String {
    match service_type(svc) {
        "LoadBalancer" => svc
            .status
            .load_balancer
            .ingress
            .first()
            .and_then(|i| i.ip.clone().or_else(|| i.hostname.clone()))
            .unwrap_or_else(|| "<pending>".to_string()),
        "NodePort" => "Use node IP".to_string(),
        "ExternalName" => svc
            .spec
            .external_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "-".to_string()),
        _ => "-".to_string(),
    }
}

/// `80/TCP → 8080`
pub fn format_port(port: &ServicePort) -> String {
    let mut out = port.port.to_string();
    if let Some(ref proto) = port.protocol {
        out.push('/');
        out.push_str(proto);
    }
    if let Some(ref target) = port.target_port {
        out.push_str(&format!(" → {}", target));
    }
    out
}

pub fn build_service_summary(svc: &Service, now: DateTime<Utc>) -> ServiceSummary {
    ServiceSummary {
        name: svc.metadata.name.clone(),
        service_type: service_type(svc).to_string(),
        cluster_ip: svc
            .spec
            .cluster_ip
            .clone()
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| "None".to_string()),
        external_ip: external_address(svc),
        ports: svc.spec.ports.iter().map(format_port).collect(),
        selector: svc.spec.selector.clone().unwrap_or_default(),
        age: format_age(svc.metadata.creation_timestamp.as_deref(), now),
    }
}

pub fn build_ingress_summary(ing: &Ingress, now: DateTime<Utc>) -> IngressSummary {
    let rules = ing
        .spec
        .rules
        .iter()
        .map(|rule| IngressRuleView {
            host: rule
                .host
                .clone()
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| "No host specified".to_string()),
            paths: rule
                .http
                .iter()
                .flat_map(|http| http.paths.iter())
                .map(|p| {
                    let (service, port) = match p.backend.service {
                        Some(ref svc) => (
                            svc.name.clone(),
                            svc.port
                                .number
                                .map(|n| n.to_string())
                                .or_else(|| svc.port.name.clone())
                                .unwrap_or_default(),
                        ),
                        None => (String::new(), String::new()),
                    };
                    IngressPathView {
                        path: p
                            .path
                            .clone()
                            .filter(|s| !s.is_empty())
                            .unwrap_or_else(|| "/".to_string()),
                        service,
                        port,
                    }
                })
                .collect(),
        })
        .collect();

    let tls = ing
        .spec
        .tls
        .iter()
        .map(|t| IngressTlsView {
            hosts: t.hosts.clone(),
            secret_name: t.secret_name.clone().unwrap_or_default(),
        })
        .collect();

    IngressSummary {
        name: ing.metadata.name.clone(),
        class: ing
            .spec
            .ingress_class_name
            .clone()
            .or_else(|| {
                ing.metadata
                    .annotations
                    .as_ref()
                    .and_then(|a| a.get("kubernetes.io/ingress.class").cloned())
            })
            .unwrap_or_default(),
        rules,
        tls,
        age: format_age(ing.metadata.creation_timestamp.as_deref(), now),
    }
}

/// One row per resource named in either the hard limits or current usage.
pub fn build_quota_summary(quota: &ResourceQuota, now: DateTime<Utc>) -> QuotaSummary {
    let hard = if quota.status.hard.is_empty() {
        &quota.spec.hard
    } else {
        &quota.status.hard
    };

    let mut names: Vec<&String> = hard.keys().chain(quota.status.used.keys()).collect();
    names.sort();
    names.dedup();

    let resources = names
        .into_iter()
        .map(|name| QuotaItem {
            resource: name.clone(),
            used: quota
                .status
                .used
                .get(name)
                .cloned()
                .unwrap_or_else(|| "0".to_string()),
            hard: hard.get(name).cloned().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    QuotaSummary {
        name: quota.metadata.name.clone(),
        resources,
        age: format_age(quota.metadata.creation_timestamp.as_deref(), now),
    }
}

impl Dashboard {
    /// Namespace events, newest first.
    pub async fn events(&self, namespace: &str) -> Vec<EventRow> {
        let api = self.api().await;
        let events = or_empty(api.list_events(Some(namespace), None).await, "events", Some(namespace));
        event_rows(events, Utc::now())
    }

    pub async fn config_maps(&self, namespace: &str) -> Vec<ConfigMapSummary> {
        let api = self.api().await;
        let now = Utc::now();
        or_empty(api.list_config_maps(Some(namespace)).await, "configmaps", Some(namespace))
            .iter()
            .map(|cm| build_config_map_summary(cm, now))
            .collect()
    }

    pub async fn secrets(&self, namespace: &str) -> Vec<SecretSummary> {
        let api = self.api().await;
        let now = Utc::now();
        or_empty(api.list_secrets(Some(namespace)).await, "secrets", Some(namespace))
            .iter()
            .map(|s| build_secret_summary(s, now))
            .collect()
    }

    pub async fn services(&self, namespace: &str) -> Vec<ServiceSummary> {
        let api = self.api().await;
        let now = Utc::now();
        or_empty(api.list_services(Some(namespace)).await, "services", Some(namespace))
            .iter()
            .map(|s| build_service_summary(s, now))
            .collect()
    }

    pub async fn ingresses(&self, namespace: &str) -> Vec<IngressSummary> {
        let api = self.api().await;
        let now = Utc::now();
        or_empty(api.list_ingresses(Some(namespace)).await, "ingresses", Some(namespace))
            .iter()
            .map(|i| build_ingress_summary(i, now))
            .collect()
    }

    pub async fn quotas(&self, namespace: &str) -> Vec<QuotaSummary> {
        let api = self.api().await;
        let now = Utc::now();
        or_empty(
            api.list_resource_quotas(Some(namespace)).await,
            "resourcequotas",
            Some(namespace),
        )
        .iter()
        .map(|q| build_quota_summary(q, now))
        .collect()
    }
}
