use serde::Serialize;
use tracing::error;

use super::{ClusterApi, ClusterResult};
use crate::derive::resources::requested_usage;
use crate::helpers::{parse_cpu, parse_memory_gb, percent, round1};
use crate::models::k8s::{Node, Pod, PodPhase};

/// Cluster-wide rollup. CPU in cores, memory in binary GB, ratios in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterStats {
    pub node_count: usize,
    pub ready_nodes: usize,
    pub ready_node_ratio: f64,
    pub pod_count: usize,
    pub cpu_usage_ratio: f64,
    pub memory_usage_ratio: f64,
    pub total_cpu: f64,
    pub total_memory: f64,
    pub used_cpu: f64,
    pub used_memory: f64,
    /// Not a measurement: the previous count is assumed to be 95% of the
    /// current one because no history is kept.
    pub pod_growth: f64,
    pub pod_growth_synthetic: bool,
}

/// The first `Ready` condition decides.
pub fn node_ready(node: &Node) -> bool {
    node.status
        .conditions
        .iter()
        .find(|c| c.condition_type == "Ready")
        .is_some_and(|c| c.status == "True")
}

fn synthetic_growth(current: usize) -> f64 {
    if current == 0 {
        return 0.0;
    }
    let current = current as f64;
    let previous = current * 0.95;
    round1((current - previous) / previous * 100.0)
}

/// Capacity comes from node allocatable; usage counts requests of running pods only.
pub fn summarize(nodes: &[Node], pods: &[Pod]) -> ClusterStats {
    let ready_nodes = nodes.iter().filter(|n| node_ready(n)).count();

    let (total_cpu, total_memory) = nodes.iter().fold((0.0, 0.0), |(cpu, mem), n| {
        let alloc = &n.status.allocatable;
        (
            cpu + alloc.get("cpu").map(|v| parse_cpu(v)).unwrap_or(0.0),
            mem + alloc
                .get("memory")
                .map(|v| parse_memory_gb(v))
                .unwrap_or(0.0),
        )
    });

    let (used_cpu, used_memory) = pods
        .iter()
        .filter(|p| p.status.phase == PodPhase::Running)
        .flat_map(|p| p.spec.containers.iter())
        .map(requested_usage)
        .fold((0.0, 0.0), |(cpu, mem), (c, m)| (cpu + c, mem + m));

    ClusterStats {
        node_count: nodes.len(),
        ready_nodes,
        ready_node_ratio: percent(ready_nodes as f64, nodes.len() as f64),
        pod_count: pods.len(),
        cpu_usage_ratio: percent(used_cpu, total_cpu),
        memory_usage_ratio: percent(used_memory, total_memory),
        total_cpu: round1(total_cpu),
        total_memory: round1(total_memory),
        used_cpu: round1(used_cpu),
        used_memory: round1(used_memory),
        pod_growth: synthetic_growth(pods.len()),
        pod_growth_synthetic: true,
    }
}

async fn try_compute(api: &dyn ClusterApi) -> ClusterResult<ClusterStats> {
    let (nodes, pods) = tokio::try_join!(api.list_nodes(), api.list_pods(None))?;
    Ok(summarize(&nodes, &pods))
}

/// Never fails: any read error yields the all-zero stats.
pub async fn compute_cluster_stats(api: &dyn ClusterApi) -> ClusterStats {
    match try_compute(api).await {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = ?e, "computing cluster stats failed, reporting zeros");
            ClusterStats::default()
        }
    }
}
