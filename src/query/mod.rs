//! One entry point per dashboard view.
//!
//! List views never fail: an adapter error is logged and the view comes back
//! empty. Single-object views propagate `NotFound` and `Forbidden` so the
//! boundary can answer 404/403.

mod debug;
mod network;
mod pods;

use std::sync::Arc;

use tracing::warn;

use crate::clients::aggregator::{ClusterStats, compute_cluster_stats};
use crate::clients::context::ContextSlot;
use crate::clients::{ClusterApi, ClusterResult};
use crate::error::DashboardResult;
use crate::models::views::{ContextList, ContextSwitched};

#[derive(Clone)]
pub struct Dashboard {
    contexts: Arc<ContextSlot>,
}

impl Dashboard {
    pub fn new(contexts: Arc<ContextSlot>) -> Self {
        Self { contexts }
    }

    /// Client of the context active when the request started.
    async fn api(&self) -> Arc<dyn ClusterApi> {
        self.contexts.current().await.api.clone()
    }

    pub async fn list_namespaces(&self) -> Vec<String> {
        let api = self.api().await;
        let mut names: Vec<String> = or_empty(api.list_namespaces().await, "namespaces", None)
            .into_iter()
            .map(|ns| ns.metadata.name)
            .collect();
        names.sort();
        names
    }

    pub async fn cluster_stats(&self) -> ClusterStats {
        let api = self.api().await;
        compute_cluster_stats(api.as_ref()).await
    }

    pub async fn list_contexts(&self) -> ContextList {
        ContextList {
            contexts: self.contexts.available(),
            active: self.contexts.current().await.name.clone(),
        }
    }

    pub async fn set_context(&self, name: &str) -> DashboardResult<ContextSwitched> {
        self.contexts.switch(name).await?;
        Ok(ContextSwitched {
            success: true,
            context: self.contexts.current().await.name.clone(),
        })
    }
}

/// Degrades a failed list read to an empty collection.
fn or_empty<T>(result: ClusterResult<Vec<T>>, kind: &str, namespace: Option<&str>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(
                kind,
                namespace = namespace.unwrap_or("*"),
                transient = e.is_transient(),
                error = %e,
                "list failed, returning no data"
            );
            Vec::new()
        }
    }
}
