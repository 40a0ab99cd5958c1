use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::domain::{ProductSelection, Recommendation, SessionId};
use super::form::FormSubmission;
use super::repository::{ProfileRepository, RepositoryError};
use super::service::{RecommendationService, RecommendationServiceError};

/// Router builder exposing session intake and recommendation endpoints.
pub fn recommendation_router<R>(service: Arc<RecommendationService<R>>) -> Router
where
    R: ProfileRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/sessions/:session_id/profile",
            put(store_profile_handler::<R>),
        )
        .route("/recomendaciones/:product", get(session_handler::<R>))
        .route(
            "/api/v1/recommendations/:product",
            post(inline_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionQuery {
    pub(crate) session_id: Option<String>,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "success": false,
        "error": message.into(),
    });
    (status, Json(payload)).into_response()
}

fn success(recommendations: Vec<Recommendation>) -> Response {
    let payload = json!({
        "success": true,
        "recommendations": recommendations,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

fn service_failure(error: RecommendationServiceError) -> Response {
    match error {
        RecommendationServiceError::Profile(error) => {
            warn!(%error, "rejected invalid profile");
            failure(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        RecommendationServiceError::Repository(RepositoryError::NotFound) => {
            failure(StatusCode::NOT_FOUND, "session not found")
        }
        other => {
            error!(error = %other, "recommendation request failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn parse_selection(product: &str) -> Result<ProductSelection, Response> {
    product
        .parse::<ProductSelection>()
        .map_err(|error| failure(StatusCode::BAD_REQUEST, error.to_string()))
}

pub(crate) async fn store_profile_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(session_id): Path<String>,
    body: Result<Json<FormSubmission>, JsonRejection>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let Json(submission) = match body {
        Ok(body) => body,
        Err(rejection) => return failure(rejection.status(), rejection.body_text()),
    };

    match service.save_profile(SessionId(session_id), submission) {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "sessionId": record.session_id.0,
                "updatedAt": record.updated_at,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn session_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(product): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let selection = match parse_selection(&product) {
        Ok(selection) => selection,
        Err(response) => return response,
    };

    let session_id = match query.session_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => SessionId(id),
        None => return failure(StatusCode::BAD_REQUEST, "session_id is required"),
    };

    match service.recommend(&session_id, selection) {
        Ok(recommendations) => success(recommendations),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn inline_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(product): Path<String>,
    body: Result<Json<FormSubmission>, JsonRejection>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let selection = match parse_selection(&product) {
        Ok(selection) => selection,
        Err(response) => return response,
    };

    let Json(submission) = match body {
        Ok(body) => body,
        Err(rejection) => return failure(rejection.status(), rejection.body_text()),
    };

    match service.evaluate(&submission, selection) {
        Ok(recommendations) => success(recommendations),
        Err(error) => service_failure(error),
    }
}
