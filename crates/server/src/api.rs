//! The two boundary contracts: behavior analysis and recommendations.
//!
//! Both endpoints are lenient about input shape. Missing or non-array
//! interaction data is treated as empty, and only an unparseable JSON body
//! produces a non-success response, with a generic message.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use shoprank_core::{
    FilterContext, InteractionEvent, InterfaceError, PageContext, RecommendationEngine,
    RecommendationRequest,
};
use shoprank_inference::InferenceAdapter;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<tokio::sync::Mutex<RecommendationEngine>>,
    pub adapter: Arc<InferenceAdapter>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, adapter: InferenceAdapter) -> Self {
        Self { engine: Arc::new(tokio::sync::Mutex::new(engine)), adapter: Arc::new(adapter) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/behavior/analyze", post(analyze))
        .route("/api/v1/recommendations", post(recommend))
        .with_state(state)
}

type ApiResponse = (StatusCode, Json<Value>);

fn invalid_body(correlation_id: &str) -> ApiResponse {
    warn!(correlation_id, "rejected unparseable request body");
    interface_failure(
        InterfaceError::BadRequest {
            message: "unparseable request body".to_owned(),
            correlation_id: correlation_id.to_owned(),
        },
        correlation_id,
    )
}

fn interface_failure(interface: InterfaceError, correlation_id: &str) -> ApiResponse {
    error!(correlation_id, error = %interface, "request failed");
    let status = match interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "success": false, "error": interface.user_message() })))
}

/// Pulls interaction events out of a lenient payload field. Anything that is
/// not an array, or any element that does not parse, is skipped.
fn extract_events(value: &Value, field: &str) -> Vec<InteractionEvent> {
    value[field]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn extract_string(value: &Value, field: &str) -> Option<String> {
    value[field].as_str().map(str::to_string).filter(|s| !s.is_empty())
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    let Ok(Json(body)) = payload else {
        return invalid_body(&correlation_id);
    };

    let session_id =
        extract_string(&body, "session_id").unwrap_or_else(|| Uuid::new_v4().to_string());
    let events = extract_events(&body, "interactions");

    let (profile, rule_result) = {
        let mut engine = state.engine.lock().await;
        engine.analyze(&session_id, events)
    };

    let analysis = state.adapter.classify(&profile, rule_result).await;
    {
        let mut engine = state.engine.lock().await;
        engine.apply_classification(&session_id, analysis.clone());
    }

    info!(
        correlation_id,
        session_id,
        label = analysis.label.as_str(),
        confidence = analysis.confidence,
        total_interactions = profile.total_interactions,
        "behavior analyzed"
    );

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "session_id": session_id,
            "analysis": analysis,
            "behavior_data": profile,
            "timestamp": Utc::now(),
        })),
    )
}

async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResponse {
    let correlation_id = Uuid::new_v4().to_string();
    let Ok(Json(body)) = payload else {
        return invalid_body(&correlation_id);
    };

    let session_id = extract_string(&body, "session_id")
        .or_else(|| extract_string(&body, "user_id"))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let page = extract_string(&body, "context")
        .and_then(|raw| serde_json::from_value::<PageContext>(Value::String(raw)).ok())
        .unwrap_or_default();

    let filters = serde_json::from_value::<FilterContext>(body["filters"].clone())
        .unwrap_or_default();

    let request = RecommendationRequest {
        session_id: Some(session_id.clone()),
        page,
        anchor_id: extract_string(&body, "current_product_id"),
        collection_handle: extract_string(&body, "collection"),
        search_query: extract_string(&body, "search_query"),
        sort: extract_string(&body, "sort"),
        filters,
        limit: body["limit"].as_u64().map(|limit| limit as usize),
    };

    let now = Utc::now();
    let result = {
        let mut engine = state.engine.lock().await;
        for event in extract_events(&body, "user_behavior") {
            engine.record_event(&session_id, event, now);
        }
        engine.flush_pending(&session_id, now);
        engine.recommend(&request, now)
    };

    info!(
        correlation_id,
        session_id,
        strategy = %result.metadata.strategy,
        returned = result.metadata.returned,
        "recommendations served"
    );

    let mut metadata = serde_json::to_value(&result.metadata).unwrap_or_else(|_| json!({}));
    if let Some(object) = metadata.as_object_mut() {
        object.insert("context".to_string(), json!(page.as_str()));
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "recommendations": result.recommendations,
            "metadata": metadata,
        })),
    )
}
