use chrono::{DateTime, Utc};

use super::{Dashboard, or_empty};
use crate::derive::health::{restart_count, state_name};
use crate::derive::images::{image_tag, pod_images};
use crate::derive::pod_health;
use crate::derive::resources::{container_resources, pod_resources};
use crate::error::DashboardResult;
use crate::helpers::{NOT_AVAILABLE, display_quantity, format_age, format_timestamp};
use crate::models::k8s::{Container, ContainerStatus, Pod};
use crate::models::views::{
    ClusterImage, ContainerDetail, NamespaceImage, PodDetail, PodHealthRow, PodSummary,
};

fn or_na(s: &str) -> String {
    if s.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        s.to_string()
    }
}

pub fn build_pod_summary(pod: &Pod, now: DateTime<Utc>) -> PodSummary {
    PodSummary {
        name: pod.metadata.name.clone(),
        health: pod_health(pod),
        image: pod_images(pod)
            .into_iter()
            .next()
            .unwrap_or_else(|| "No image".to_string()),
        resources: pod_resources(pod).for_display(),
        age: format_age(pod.metadata.creation_timestamp.as_deref(), now),
        restarts: restart_count(pod),
    }
}

pub fn build_health_row(pod: &Pod, now: DateTime<Utc>) -> PodHealthRow {
    let resources = pod_resources(pod);
    PodHealthRow {
        name: pod.metadata.name.clone(),
        status: pod.status.phase.as_str().to_string(),
        health: pod_health(pod),
        cpu: display_quantity(&resources.cpu.request),
        memory: display_quantity(&resources.memory.request),
        restarts: restart_count(pod),
        age: format_age(pod.metadata.creation_timestamp.as_deref(), now),
    }
}

fn build_container_detail(cs: &ContainerStatus, spec: Option<&Container>) -> ContainerDetail {
    let (state, reason) = state_name(&cs.state);
    ContainerDetail {
        name: cs.name.clone(),
        image: cs.image.clone(),
        ready: cs.ready,
        restarts: cs.restart_count,
        state: state.to_string(),
        started_at: cs
            .state
            .running
            .as_ref()
            .map(|r| format_timestamp(r.started_at.as_deref())),
        reason,
        message: cs.state.waiting.as_ref().and_then(|w| w.message.clone()),
        exit_code: cs.state.terminated.as_ref().map(|t| t.exit_code),
        resources: spec
            .map(container_resources)
            .unwrap_or_default()
            .for_display(),
    }
}

pub fn build_pod_detail(pod: &Pod, now: DateTime<Utc>) -> PodDetail {
    let containers = pod
        .status
        .container_statuses
        .iter()
        .map(|cs| {
            let spec = pod.spec.containers.iter().find(|c| c.name == cs.name);
            build_container_detail(cs, spec)
        })
        .collect();

    PodDetail {
        name: pod.metadata.name.clone(),
        namespace: pod.metadata.namespace.clone(),
        status: pod.status.phase.as_str().to_string(),
        health: pod_health(pod),
        age: format_age(pod.metadata.creation_timestamp.as_deref(), now),
        created: format_timestamp(pod.metadata.creation_timestamp.as_deref()),
        labels: pod.metadata.labels.clone().unwrap_or_default(),
        node: or_na(&pod.spec.node_name),
        ip: or_na(&pod.status.pod_ip),
        resources: pod_resources(pod).for_display(),
        containers,
        images: pod_images(pod),
        total_restarts: restart_count(pod),
    }
}

impl Dashboard {
    async fn namespace_pods(&self, namespace: &str) -> Vec<Pod> {
        let api = self.api().await;
        or_empty(api.list_pods(Some(namespace)).await, "pods", Some(namespace))
    }

    pub async fn list_pods(&self, namespace: &str) -> Vec<PodSummary> {
        let now = Utc::now();
        self.namespace_pods(namespace)
            .await
            .iter()
            .map(|p| build_pod_summary(p, now))
            .collect()
    }

    pub async fn namespace_health(&self, namespace: &str) -> Vec<PodHealthRow> {
        let now = Utc::now();
        self.namespace_pods(namespace)
            .await
            .iter()
            .map(|p| build_health_row(p, now))
            .collect()
    }

    pub async fn pod_detail(&self, namespace: &str, name: &str) -> DashboardResult<PodDetail> {
        let api = self.api().await;
        let pod = api.get_pod(namespace, name).await?;
        Ok(build_pod_detail(&pod, Utc::now()))
    }

    pub async fn namespace_images(&self, namespace: &str) -> Vec<NamespaceImage> {
        self.namespace_pods(namespace)
            .await
            .iter()
            .flat_map(|pod| {
                pod_images(pod).into_iter().map(|image| NamespaceImage {
                    pod_name: pod.metadata.name.clone(),
                    image,
                })
            })
            .collect()
    }

    /// Every container image in the cluster, reduced to its tag.
    pub async fn cluster_images(&self) -> Vec<ClusterImage> {
        let api = self.api().await;
        or_empty(api.list_pods(None).await, "pods", None)
            .iter()
            .flat_map(|pod| {
                pod.spec.containers.iter().map(|c| ClusterImage {
                    namespace: pod.metadata.namespace.clone(),
                    pod_name: pod.metadata.name.clone(),
                    image: image_tag(&c.image).to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::{FakeCluster, meta};
    use crate::derive::Health;
    use crate::error::{ClusterError, DashboardError};
    use crate::models::k8s::{
        ContainerState, ContainerStateRunning, ContainerStateWaiting, PodPhase,
        ResourceRequirements,
    };
    use crate::query::tests::dashboard;
    use std::collections::BTreeMap;

    fn running() -> ContainerState {
        ContainerState {
            running: Some(ContainerStateRunning {
                started_at: Some("2024-01-01T00:00:05Z".to_string()),
            }),
            ..Default::default()
        }
    }

    fn container(name: &str, image: &str, cpu: Option<&str>) -> Container {
        let requests = cpu.map(|c| {
            let mut m = BTreeMap::new();
            m.insert("cpu".to_string(), c.to_string());
            m
        });
        Container {
            name: name.to_string(),
            image: image.to_string(),
            resources: ResourceRequirements {
                requests,
                limits: None,
            },
            ..Default::default()
        }
    }

    fn status(name: &str, ready: bool, state: ContainerState, restarts: i32) -> ContainerStatus {
        ContainerStatus {
            name: name.to_string(),
            image: format!("{}:latest", name),
            ready,
            restart_count: restarts,
            state,
        }
    }

    /// "prod/web": two containers, the sidecar not ready.
    fn web_pod() -> Pod {
        let mut pod = Pod {
            metadata: meta("prod", "web"),
            ..Default::default()
        };
        pod.metadata.creation_timestamp = Some("2020-01-01T00:00:00Z".to_string());
        pod.status.phase = PodPhase::Running;
        pod.spec.node_name = "node-a".to_string();
        pod.spec.containers = vec![
            container("app", "registry.io/team/app:v1.2", Some("250m")),
            container("sidecar", "envoy", None),
        ];
        pod.status.container_statuses = vec![
            status("app", true, running(), 1),
            status(
                "sidecar",
                false,
                ContainerState {
                    waiting: Some(ContainerStateWaiting {
                        reason: Some("CrashLoopBackOff".to_string()),
                        message: Some("back-off".to_string()),
                    }),
                    ..Default::default()
                },
                4,
            ),
        ];
        pod
    }

    fn cluster() -> FakeCluster {
        let mut other = Pod {
            metadata: meta("staging", "worker"),
            ..Default::default()
        };
        other.spec.containers.push(container("w", "myrepo.io:5000/worker", None));

        FakeCluster {
            pods: vec![web_pod(), other],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_namespace_health_reports_unhealthy_pod() {
        let d = dashboard(cluster());
        let rows = d.namespace_health("prod").await;

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "web");
        assert_eq!(row.health, Health::Unhealthy);
        assert_eq!(row.status, "Running");
        assert_eq!(row.cpu, "250m");
        assert_eq!(row.memory, "N/A");
        assert_eq!(row.restarts, 5);
        assert!(row.age.ends_with('d'));
    }

    #[tokio::test]
    async fn test_list_pods_summary() {
        let d = dashboard(cluster());
        let pods = d.list_pods("prod").await;
        assert_eq!(pods.len(), 1);
        assert_eq!(pods[0].image, "registry.io/team/app:v1.2");
        assert_eq!(pods[0].resources.cpu.request, "250m");
        assert_eq!(pods[0].resources.cpu.limit, "N/A");
    }

    #[test]
    fn test_pod_without_containers_has_no_image() {
        let pod = Pod {
            metadata: meta("prod", "empty"),
            ..Default::default()
        };
        let summary = build_pod_summary(&pod, Utc::now());
        assert_eq!(summary.image, "No image");
        assert_eq!(summary.health, Health::Unknown);
        assert_eq!(summary.age, "N/A");
    }

    #[tokio::test]
    async fn test_list_views_degrade_on_transient_error() {
        let d = dashboard(
            cluster().fail("pods", ClusterError::Transient("connection reset".to_string())),
        );
        assert!(d.list_pods("prod").await.is_empty());
        assert!(d.namespace_health("prod").await.is_empty());
        assert!(d.namespace_images("prod").await.is_empty());
        assert!(d.cluster_images().await.is_empty());
    }

    #[tokio::test]
    async fn test_pod_detail() {
        let d = dashboard(cluster());
        let detail = d.pod_detail("prod", "web").await.unwrap();

        assert_eq!(detail.namespace, "prod");
        assert_eq!(detail.node, "node-a");
        assert_eq!(detail.ip, "N/A");
        assert_eq!(detail.created, "2020-01-01 00:00:00");
        assert_eq!(detail.total_restarts, 5);
        assert_eq!(detail.images.len(), 2);

        let app = &detail.containers[0];
        assert_eq!(app.state, "Running");
        assert_eq!(app.started_at.as_deref(), Some("2024-01-01 00:00:05"));
        assert_eq!(app.resources.cpu.request, "250m");

        let sidecar = &detail.containers[1];
        assert_eq!(sidecar.state, "Waiting");
        assert_eq!(sidecar.reason.as_deref(), Some("CrashLoopBackOff"));
        assert_eq!(sidecar.message.as_deref(), Some("back-off"));
        assert_eq!(sidecar.resources.cpu.request, "N/A");
    }

    #[tokio::test]
    async fn test_pod_detail_propagates_not_found_and_forbidden() {
        let d = dashboard(cluster());
        assert!(matches!(
            d.pod_detail("prod", "ghost").await,
            Err(DashboardError::Cluster(ClusterError::NotFound(_)))
        ));

        let d = dashboard(cluster().fail("pods", ClusterError::Forbidden("rbac".to_string())));
        assert!(matches!(
            d.pod_detail("prod", "web").await,
            Err(DashboardError::Cluster(ClusterError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn test_images() {
        let d = dashboard(cluster());

        let ns = d.namespace_images("prod").await;
        assert_eq!(
            ns,
            vec![
                NamespaceImage {
                    pod_name: "web".to_string(),
                    image: "registry.io/team/app:v1.2".to_string(),
                },
                NamespaceImage {
                    pod_name: "web".to_string(),
                    image: "envoy".to_string(),
                },
            ]
        );

        let all = d.cluster_images().await;
        let tags: Vec<&str> = all.iter().map(|i| i.image.as_str()).collect();
        assert_eq!(tags, vec!["v1.2", "envoy", "myrepo.io:5000/worker"]);
        assert_eq!(all[2].namespace, "staging");
    }

    #[tokio::test]
    async fn test_repeated_reads_are_identical() {
        let d = dashboard(cluster());
        assert_eq!(d.list_pods("prod").await, d.list_pods("prod").await);
        assert_eq!(
            d.pod_detail("prod", "web").await.unwrap(),
            d.pod_detail("prod", "web").await.unwrap()
        );
        assert_eq!(d.cluster_images().await, d.cluster_images().await);
    }
}
