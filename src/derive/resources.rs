use serde::Serialize;

use crate::helpers::{display_quantity, parse_cpu, parse_memory_gb};
use crate::models::k8s::{Container, Pod};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestLimit {
    pub request: String,
    pub limit: String,
}

impl Default for RequestLimit {
    fn default() -> Self {
        Self {
            request: "0".to_string(),
            limit: "0".to_string(),
        }
    }
}

/// CPU and memory requests/limits as raw quantity strings, `"0"` when undeclared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resources {
    pub cpu: RequestLimit,
    pub memory: RequestLimit,
}

impl Resources {
    /// Same values with undeclared quantities rendered as `N/A`.
    pub fn for_display(&self) -> Resources {
        Resources {
            cpu: RequestLimit {
                request: display_quantity(&self.cpu.request),
                limit: display_quantity(&self.cpu.limit),
            },
            memory: RequestLimit {
                request: display_quantity(&self.memory.request),
                limit: display_quantity(&self.memory.limit),
            },
        }
    }

    fn absorb(&mut self, container: &Container) {
        if let Some(ref requests) = container.resources.requests {
            if let Some(cpu) = requests.get("cpu") {
                self.cpu.request = cpu.clone();
            }
            if let Some(mem) = requests.get("memory") {
                self.memory.request = mem.clone();
            }
        }
        if let Some(ref limits) = container.resources.limits {
            if let Some(cpu) = limits.get("cpu") {
                self.cpu.limit = cpu.clone();
            }
            if let Some(mem) = limits.get("memory") {
                self.memory.limit = mem.clone();
            }
        }
    }
}

pub fn container_resources(container: &Container) -> Resources {
    let mut r = Resources::default();
    r.absorb(container);
    r
}

/// Pod-level resources. Containers are not summed: for each value the last
/// container that declares it wins. The pod detail view carries the
/// per-container breakdown alongside this.
pub fn pod_resources(pod: &Pod) -> Resources {
    let mut r = Resources::default();
    for c in &pod.spec.containers {
        r.absorb(c);
    }
    r
}

/// Requested (cores, binary GB) for one container.
pub fn requested_usage(container: &Container) -> (f64, f64) {
    let Some(ref requests) = container.resources.requests else {
        return (0.0, 0.0);
    };
    let cpu = requests.get("cpu").map(|v| parse_cpu(v)).unwrap_or(0.0);
    let mem = requests
        .get("memory")
        .map(|v| parse_memory_gb(v))
        .unwrap_or(0.0);
    (cpu, mem)
}
