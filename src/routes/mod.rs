pub mod api;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/namespaces", get(api::handle_namespaces))
        // Pods
        .route("/api/pods/{namespace}", get(api::handle_pods))
        .route("/api/pods/{namespace}/{name}", get(api::handle_pod_detail))
        .route("/api/health/{namespace}", get(api::handle_health))
        // Images
        .route("/api/images", get(api::handle_cluster_images))
        .route("/api/images/{namespace}", get(api::handle_namespace_images))
        // Namespace objects
        .route("/api/events/{namespace}", get(api::handle_events))
        .route("/api/configmaps/{namespace}", get(api::handle_config_maps))
        .route("/api/secrets/{namespace}", get(api::handle_secrets))
        .route("/api/services/{namespace}", get(api::handle_services))
        .route("/api/ingresses/{namespace}", get(api::handle_ingresses))
        .route("/api/quotas/{namespace}", get(api::handle_quotas))
        .route(
            "/api/debug/{kind}/{namespace}/{name}",
            get(api::handle_debug),
        )
        // Cluster
        .route("/api/stats", get(api::handle_stats))
        .route(
            "/api/contexts",
            get(api::handle_list_contexts).post(api::handle_set_context),
        )
        .route("/healthz", get(api::handle_healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
