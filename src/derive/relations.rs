//! Cross-resource relationship discovery for the debug view.
//!
//! Every scan is linear in pods × containers × env vars of one namespace.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::derive::health::pod_health;
use crate::models::k8s::{Container, Ingress, Pod, Service};

/// Another object linked to the one being debugged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedResource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl RelatedResource {
    fn named(name: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: None,
            info: Some(info.into()),
        }
    }

    fn pod(pod: &Pod, reasons: &[String]) -> Self {
        Self {
            name: pod.metadata.name.clone(),
            status: Some(pod_health(pod).badge().to_string()),
            info: Some(reasons.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Related {
    #[serde(rename = "Pods")]
    pub pods: Vec<RelatedResource>,
    #[serde(rename = "Services")]
    pub services: Vec<RelatedResource>,
    #[serde(rename = "Ingresses")]
    pub ingresses: Vec<RelatedResource>,
    #[serde(rename = "ConfigMaps")]
    pub config_maps: Vec<RelatedResource>,
    #[serde(rename = "Secrets")]
    pub secrets: Vec<RelatedResource>,
}

/// What a pod can point at through volumes and env.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    ConfigMap(&'a str),
    Secret(&'a str),
}

fn all_containers(pod: &Pod) -> impl Iterator<Item = &Container> {
    pod.spec
        .init_containers
        .iter()
        .chain(pod.spec.containers.iter())
}

/// Human-readable list of the ways `pod` references `target`; empty if none.
pub fn pod_references(pod: &Pod, target: Target<'_>) -> Vec<String> {
    let mut reasons = Vec::new();

    for vol in &pod.spec.volumes {
        let direct = match target {
            Target::ConfigMap(name) => vol.config_map.as_ref().is_some_and(|r| r.name == name),
            Target::Secret(name) => vol.secret.as_ref().is_some_and(|s| s.secret_name == name),
        };
        let projected = vol.projected.as_ref().is_some_and(|p| {
            p.sources.iter().any(|src| match target {
                Target::ConfigMap(name) => src.config_map.as_ref().is_some_and(|r| r.name == name),
                Target::Secret(name) => src.secret.as_ref().is_some_and(|r| r.name == name),
            })
        });
        if direct || projected {
            reasons.push(format!("volume {}", vol.name));
        }
    }

    for c in all_containers(pod) {
        for env in &c.env {
            let Some(ref from) = env.value_from else {
                continue;
            };
            let hit = match target {
                Target::ConfigMap(name) => {
                    from.config_map_key_ref.as_ref().is_some_and(|r| r.name == name)
                }
                Target::Secret(name) => from.secret_key_ref.as_ref().is_some_and(|r| r.name == name),
            };
            if hit {
                reasons.push(format!("env {} ({})", env.name, c.name));
            }
        }
        for from in &c.env_from {
            let hit = match target {
                Target::ConfigMap(name) => from.config_map_ref.as_ref().is_some_and(|r| r.name == name),
                Target::Secret(name) => from.secret_ref.as_ref().is_some_and(|r| r.name == name),
            };
            if hit {
                reasons.push(format!("envFrom ({})", c.name));
            }
        }
    }

    if let Target::Secret(name) = target {
        if pod.spec.image_pull_secrets.iter().any(|r| r.name == name) {
            reasons.push("imagePullSecrets".to_string());
        }
    }

    reasons
}

/// Pods in `pods` that reference `target`.
pub fn pods_referencing(pods: &[Pod], target: Target<'_>) -> Vec<RelatedResource> {
    pods.iter()
        .filter_map(|pod| {
            let reasons = pod_references(pod, target);
            (!reasons.is_empty()).then(|| RelatedResource::pod(pod, &reasons))
        })
        .collect()
}

pub fn selector_matches(selector: &BTreeMap<String, String>, pod: &Pod) -> bool {
    if selector.is_empty() {
        return false;
    }
    let Some(ref labels) = pod.metadata.labels else {
        return false;
    };
    selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

/// Pods selected by the service, plus pods whose env values mention it.
pub fn pods_for_service(service: &Service, pods: &[Pod]) -> Vec<RelatedResource> {
    let name = service.metadata.name.as_str();
    let selector = service.spec.selector.clone().unwrap_or_default();

    pods.iter()
        .filter_map(|pod| {
            let mut reasons = Vec::new();
            if selector_matches(&selector, pod) {
                reasons.push("selected by service".to_string());
            }
            for c in all_containers(pod) {
                for env in &c.env {
                    if env.value.as_deref().is_some_and(|v| mentions_host(v, name)) {
                        reasons.push(format!("env {} ({})", env.name, c.name));
                    }
                }
            }
            (!reasons.is_empty()).then(|| RelatedResource::pod(pod, &reasons))
        })
        .collect()
}

/// Whether `value` contains `host` as a whole DNS label sequence, e.g.
/// `postgres`, `postgres:5432` or `postgres.db.svc.cluster.local`.
fn mentions_host(value: &str, host: &str) -> bool {
    if host.is_empty() {
        return false;
    }
    value
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .any(|token| token == host)
}

/// Service names an ingress routes to, including its default backend.
pub fn ingress_backends(ingress: &Ingress) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    if let Some(svc) = ingress
        .spec
        .default_backend
        .as_ref()
        .and_then(|b| b.service.as_ref())
    {
        names.insert(svc.name.clone());
    }
    for rule in &ingress.spec.rules {
        let Some(ref http) = rule.http else {
            continue;
        };
        for path in &http.paths {
            if let Some(ref svc) = path.backend.service {
                names.insert(svc.name.clone());
            }
        }
    }
    names
}

pub fn ingress_tls_secrets(ingress: &Ingress) -> BTreeSet<String> {
    ingress
        .spec
        .tls
        .iter()
        .filter_map(|t| t.secret_name.clone())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn ingresses_routing_to(service: &str, ingresses: &[Ingress]) -> Vec<RelatedResource> {
    ingresses
        .iter()
        .filter(|ing| ingress_backends(ing).contains(service))
        .map(|ing| RelatedResource::named(ing.metadata.name.clone(), "routes traffic to service"))
        .collect()
}

pub fn ingresses_using_tls_secret(secret: &str, ingresses: &[Ingress]) -> Vec<RelatedResource> {
    ingresses
        .iter()
        .filter(|ing| ingress_tls_secrets(ing).contains(secret))
        .map(|ing| RelatedResource::named(ing.metadata.name.clone(), "TLS certificate"))
        .collect()
}

/// ConfigMaps and Secrets a pod depends on, keyed by name.
pub fn pod_dependencies(pod: &Pod) -> (Vec<RelatedResource>, Vec<RelatedResource>) {
    let mut config_maps = BTreeSet::new();
    let mut secrets = BTreeSet::new();

    for vol in &pod.spec.volumes {
        if let Some(ref cm) = vol.config_map {
            config_maps.insert(cm.name.clone());
        }
        if let Some(ref s) = vol.secret {
            secrets.insert(s.secret_name.clone());
        }
        if let Some(ref p) = vol.projected {
            for src in &p.sources {
                if let Some(ref cm) = src.config_map {
                    config_maps.insert(cm.name.clone());
                }
                if let Some(ref s) = src.secret {
                    secrets.insert(s.name.clone());
                }
            }
        }
    }
    for c in all_containers(pod) {
        for env in &c.env {
            if let Some(ref from) = env.value_from {
                if let Some(ref r) = from.config_map_key_ref {
                    config_maps.insert(r.name.clone());
                }
                if let Some(ref r) = from.secret_key_ref {
                    secrets.insert(r.name.clone());
                }
            }
        }
        for from in &c.env_from {
            if let Some(ref r) = from.config_map_ref {
                config_maps.insert(r.name.clone());
            }
            if let Some(ref r) = from.secret_ref {
                secrets.insert(r.name.clone());
            }
        }
    }
    for r in &pod.spec.image_pull_secrets {
        secrets.insert(r.name.clone());
    }

    let to_related = |names: BTreeSet<String>, secret: bool| -> Vec<RelatedResource> {
        names
            .into_iter()
            .filter(|n| !n.is_empty())
            .map(|n| {
                let target = if secret {
                    Target::Secret(&n)
                } else {
                    Target::ConfigMap(&n)
                };
                let reasons = pod_references(pod, target);
                RelatedResource::named(n.clone(), reasons.join(", "))
            })
            .collect()
    };

    (to_related(config_maps, false), to_related(secrets, true))
}

pub fn services_selecting(pod: &Pod, services: &[Service]) -> Vec<RelatedResource> {
    services
        .iter()
        .filter(|svc| {
            svc.spec
                .selector
                .as_ref()
                .is_some_and(|sel| selector_matches(sel, pod))
        })
        .map(|svc| RelatedResource::named(svc.metadata.name.clone(), "selects this pod"))
        .collect()
}

/// Backend Services and TLS Secrets an ingress depends on.
pub fn ingress_dependencies(ingress: &Ingress) -> (Vec<RelatedResource>, Vec<RelatedResource>) {
    let services = ingress_backends(ingress)
        .into_iter()
        .filter(|n| !n.is_empty())
        .map(|n| RelatedResource::named(n, "backend service"))
        .collect();
    let secrets = ingress_tls_secrets(ingress)
        .into_iter()
        .map(|n| RelatedResource::named(n, "TLS certificate"))
        .collect();
    (services, secrets)
}
