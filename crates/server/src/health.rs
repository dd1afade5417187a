use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use shoprank_core::CatalogReader;

#[derive(Clone)]
pub struct HealthState {
    catalog: Arc<dyn CatalogReader>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(catalog: Arc<dyn CatalogReader>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { catalog })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(state.catalog.as_ref());
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "shoprank-server runtime initialized".to_string(),
        },
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(catalog: &dyn CatalogReader) -> HealthCheck {
    let count = catalog.all().len();
    if count == 0 {
        HealthCheck { status: "degraded", detail: "catalog has no items loaded".to_string() }
    } else {
        HealthCheck { status: "ready", detail: format!("catalog loaded with {count} items") }
    }
}

#[cfg(test)]
mod tests {
    use shoprank_core::{seed, InMemoryCatalog};

    use super::*;

    #[tokio::test]
    async fn health_is_ready_with_a_seeded_catalog() {
        let catalog: Arc<dyn CatalogReader> =
            Arc::new(InMemoryCatalog::new(seed::demo_catalog()));

        let (status, Json(payload)) = health(State(HealthState { catalog })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.status, "ready");
    }

    #[tokio::test]
    async fn health_degrades_with_an_empty_catalog() {
        let catalog: Arc<dyn CatalogReader> = Arc::new(InMemoryCatalog::new(Vec::new()));

        let (status, Json(payload)) = health(State(HealthState { catalog })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.catalog.status, "degraded");
    }
}
