use crate::models::ProfileResponse;
use crate::startup::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use service_core::error::AppError;

pub const NOT_FOUND_MESSAGE: &str = "Resource not found on this API.";

/// `GET /me`. Always 200: fact source failures are absorbed by the provider.
pub async fn get_profile(State(state): State<AppState>) -> Json<ProfileResponse> {
    let fact = state.fact_provider.fetch_fact().await;

    Json(ProfileResponse::success(
        &state.config.profile,
        fact,
        Utc::now(),
    ))
}

/// Fallback for unknown paths and for methods other than GET on `/me`.
pub async fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
}
