use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::{identity, AppState};
use crate::domain::{CellState, DayCell};
use crate::engine::Transition;
use crate::error::AppError;
use crate::orchestration::{ActivityEvent, RecordOutcome, StreakSummary};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityRequest {
    pub active_secs: Option<u64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeKind {
    Recorded,
    BelowThreshold,
    Skipped,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakSummary>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub days: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCellDto {
    pub date: NaiveDate,
    pub label: String,
    pub is_active: bool,
    pub is_today: bool,
    pub state: CellState,
}

impl From<DayCell> for DayCellDto {
    fn from(cell: DayCell) -> Self {
        let state = cell.state();
        Self {
            date: cell.date,
            label: cell.label,
            is_active: cell.is_active,
            is_today: cell.is_today,
            state,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResponse {
    pub streak: StreakSummary,
    pub days: Vec<DayCellDto>,
}

fn parse_activity(body: &[u8]) -> Result<ActivityEvent, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ActivityEvent::foreground());
    }
    let request: ActivityRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid activity body: {}", e)))?;
    Ok(match request.active_secs {
        Some(secs) => ActivityEvent::session(Duration::from_secs(secs)),
        None => ActivityEvent::foreground(),
    })
}

pub async fn record_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ActivityResponse>, AppError> {
    let user = identity(&headers)?;
    if user.is_none() {
        return Err(AppError::Unauthorized);
    }
    let event = parse_activity(&body)?;

    let response = match state
        .orchestrator
        .record_activity(user.as_ref(), event)
        .await?
    {
        RecordOutcome::Recorded {
            transition,
            summary,
        } => ActivityResponse {
            outcome: OutcomeKind::Recorded,
            transition: Some(transition),
            streak: Some(summary),
        },
        RecordOutcome::BelowThreshold => ActivityResponse {
            outcome: OutcomeKind::BelowThreshold,
            transition: None,
            streak: None,
        },
        RecordOutcome::Skipped => ActivityResponse {
            outcome: OutcomeKind::Skipped,
            transition: None,
            streak: None,
        },
    };

    Ok(Json(response))
}

pub async fn get_streak(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StreakSummary>, AppError> {
    let user = identity(&headers)?;
    let summary = state.orchestrator.summary(user.as_ref()).await?;
    Ok(Json(summary))
}

pub async fn get_window(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<WindowResponse>, AppError> {
    let user = identity(&headers)?;
    if user.is_none() {
        return Err(AppError::Unauthorized);
    }
    let Query(params) =
        query.map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())))?;

    let view = state.orchestrator.view(user.as_ref(), params.days).await?;

    Ok(Json(WindowResponse {
        streak: view.summary,
        days: view.days.into_iter().map(DayCellDto::from).collect(),
    }))
}
