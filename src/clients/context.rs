use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::ClusterApi;
use crate::error::DashboardError;

/// Source of cluster contexts and the clients that talk to them.
pub trait ClusterConnector: Send + Sync {
    fn contexts(&self) -> Vec<String>;
    fn default_context(&self) -> Option<String>;
    fn connect(&self, context: &str) -> Result<Arc<dyn ClusterApi>, DashboardError>;
}

/// Immutable snapshot of the context requests are served from.
pub struct ActiveContext {
    pub name: String,
    pub api: Arc<dyn ClusterApi>,
}

/// The single process-wide slot holding the active context. Switching
/// replaces the snapshot; requests already holding the old one finish on it.
pub struct ContextSlot {
    connector: Arc<dyn ClusterConnector>,
    active: RwLock<Arc<ActiveContext>>,
}

impl ContextSlot {
    /// Connects to `context`, or to the connector's default when `None`.
    pub fn new(
        connector: Arc<dyn ClusterConnector>,
        context: Option<String>,
    ) -> Result<Self, DashboardError> {
        let name = context
            .or_else(|| connector.default_context())
            .ok_or_else(|| DashboardError::Config("no cluster context available".to_string()))?;
        let api = connector.connect(&name)?;

        Ok(Self {
            connector,
            active: RwLock::new(Arc::new(ActiveContext { name, api })),
        })
    }

    pub async fn current(&self) -> Arc<ActiveContext> {
        self.active.read().await.clone()
    }

    pub fn available(&self) -> Vec<String> {
        self.connector.contexts()
    }

    /// Points subsequent requests at another context. Last write wins.
    pub async fn switch(&self, name: &str) -> Result<(), DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::InvalidInput(
                "context name must not be empty".to_string(),
            ));
        }
        if !self.connector.contexts().iter().any(|c| c == name) {
            return Err(DashboardError::InvalidInput(format!(
                "unknown context {:?}",
                name
            )));
        }

        let api = self.connector.connect(name)?;
        let next = Arc::new(ActiveContext {
            name: name.to_string(),
            api,
        });

        let previous = std::mem::replace(&mut *self.active.write().await, next);
        info!(from = %previous.name, to = %name, "switched cluster context");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::{FakeCluster, FakeConnector};

    #[tokio::test]
    async fn test_starts_on_default_context() {
        let connector = FakeConnector::new(&["a", "b"], FakeCluster::default());
        let slot = ContextSlot::new(Arc::new(connector), None).unwrap();
        assert_eq!(slot.current().await.name, "a");
        assert_eq!(slot.available(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_switch_replaces_snapshot() {
        let connector = FakeConnector::new(&["a", "b"], FakeCluster::default());
        let slot = ContextSlot::new(Arc::new(connector), Some("a".to_string())).unwrap();

        let before = slot.current().await;
        slot.switch("b").await.unwrap();

        assert_eq!(before.name, "a");
        assert_eq!(slot.current().await.name, "b");
    }

    #[tokio::test]
    async fn test_switch_rejects_unknown_and_empty_names() {
        let connector = FakeConnector::new(&["a"], FakeCluster::default());
        let slot = ContextSlot::new(Arc::new(connector), None).unwrap();

        assert!(matches!(
            slot.switch("zzz").await,
            Err(DashboardError::InvalidInput(_))
        ));
        assert!(matches!(
            slot.switch("  ").await,
            Err(DashboardError::InvalidInput(_))
        ));
        assert_eq!(slot.current().await.name, "a");
    }

    #[test]
    fn test_no_contexts_is_config_error() {
        let connector = FakeConnector::new(&[], FakeCluster::default());
        assert!(matches!(
            ContextSlot::new(Arc::new(connector), None),
            Err(DashboardError::Config(_))
        ));
    }
}
