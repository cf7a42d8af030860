pub mod health;
pub mod streak;

use crate::config::Config;
use crate::domain::{UserId, UserIdParseError};
use crate::error::AppError;
use crate::orchestration::StreakOrchestrator;
use axum::http::HeaderMap;
use axum::{
    routing::{get, post},
    Router,
};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Header carrying the signed-in user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<StreakOrchestrator>,
    pub config: Config,
}

impl AppState {
    pub fn new(orchestrator: Arc<StreakOrchestrator>, config: Config) -> Self {
        Self {
            orchestrator,
            config,
        }
    }
}

/// Caller identity from the request headers.
///
/// A missing or blank header means nobody is signed in and yields `None`;
/// the orchestrator turns that into a 401.
pub fn identity(headers: &HeaderMap) -> Result<Option<UserId>, AppError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("{} is not valid text", USER_ID_HEADER)))?;
    match UserId::from_str(raw) {
        Ok(user) => Ok(Some(user)),
        Err(UserIdParseError::Empty) => Ok(None),
        Err(e) => Err(AppError::BadRequest(e.to_string())),
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/streak", get(streak::get_streak))
        .route("/v1/streak/activity", post(streak::record_activity))
        .route("/v1/streak/window", get(streak::get_window))
        .layer(cors)
        .with_state(state)
}
