use serde::Serialize;

use crate::models::k8s::{ContainerState, Pod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Unhealthy,
    Unknown,
}

impl Health {
    /// Badge label used in the debug view's related-resource lists.
    pub fn badge(&self) -> &'static str {
        match self {
            Health::Healthy => "Healthy",
            Health::Unhealthy => "Unhealthy",
            Health::Unknown => "Warning",
        }
    }
}

/// A pod is healthy only when every container is both ready and running.
pub fn pod_health(pod: &Pod) -> Health {
    let statuses = &pod.status.container_statuses;
    if statuses.is_empty() {
        return Health::Unknown;
    }

    let all_ready = statuses.iter().all(|cs| cs.ready);
    let all_running = statuses.iter().all(|cs| cs.state.running.is_some());

    if all_ready && all_running {
        Health::Healthy
    } else {
        Health::Unhealthy
    }
}

pub fn restart_count(pod: &Pod) -> i64 {
    pod.status
        .container_statuses
        .iter()
        .map(|cs| i64::from(cs.restart_count))
        .sum()
}

/// Container state name plus the reason attached to it, if any.
pub fn state_name(state: &ContainerState) -> (&'static str, Option<String>) {
    if state.running.is_some() {
        ("Running", None)
    } else if let Some(ref w) = state.waiting {
        ("Waiting", w.reason.clone())
    } else if let Some(ref t) = state.terminated {
        ("Terminated", t.reason.clone())
    } else {
        ("Unknown", None)
    }
}
