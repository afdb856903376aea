use axum::{
    Form, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::AppState;
use crate::clients::aggregator::ClusterStats;
use crate::derive::events::EventRow;
use crate::error::DashboardResult;
use crate::models::views::*;

pub async fn handle_namespaces(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.dashboard.list_namespaces().await)
}

pub async fn handle_pods(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<PodSummary>> {
    Json(state.dashboard.list_pods(&namespace).await)
}

pub async fn handle_pod_detail(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> DashboardResult<Json<PodDetail>> {
    Ok(Json(state.dashboard.pod_detail(&namespace, &name).await?))
}

pub async fn handle_cluster_images(State(state): State<AppState>) -> Json<Vec<ClusterImage>> {
    Json(state.dashboard.cluster_images().await)
}

pub async fn handle_namespace_images(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<NamespaceImage>> {
    Json(state.dashboard.namespace_images(&namespace).await)
}

pub async fn handle_health(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<PodHealthRow>> {
    Json(state.dashboard.namespace_health(&namespace).await)
}

pub async fn handle_events(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<EventRow>> {
    Json(state.dashboard.events(&namespace).await)
}

pub async fn handle_config_maps(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<ConfigMapSummary>> {
    Json(state.dashboard.config_maps(&namespace).await)
}

pub async fn handle_secrets(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<SecretSummary>> {
    Json(state.dashboard.secrets(&namespace).await)
}

pub async fn handle_services(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<ServiceSummary>> {
    Json(state.dashboard.services(&namespace).await)
}

pub async fn handle_ingresses(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<IngressSummary>> {
    Json(state.dashboard.ingresses(&namespace).await)
}

pub async fn handle_quotas(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<Vec<QuotaSummary>> {
    Json(state.dashboard.quotas(&namespace).await)
}

pub async fn handle_debug(
    State(state): State<AppState>,
    Path((kind, namespace, name)): Path<(String, String, String)>,
) -> DashboardResult<Json<DebugReport>> {
    Ok(Json(
        state
            .dashboard
            .debug_resource(&kind, &namespace, &name)
            .await?,
    ))
}

pub async fn handle_stats(State(state): State<AppState>) -> Json<ClusterStats> {
    Json(state.dashboard.cluster_stats().await)
}

pub async fn handle_list_contexts(State(state): State<AppState>) -> Json<ContextList> {
    Json(state.dashboard.list_contexts().await)
}

#[derive(Debug, Deserialize)]
pub struct ContextForm {
    #[serde(default)]
    pub context: String,
}

pub async fn handle_set_context(
    State(state): State<AppState>,
    Form(form): Form<ContextForm>,
) -> DashboardResult<Json<ContextSwitched>> {
    Ok(Json(state.dashboard.set_context(&form.context).await?))
}

pub async fn handle_healthz() -> &'static str {
    "ok"
}
