use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::api::state::{AppState, RunHandle};
use crate::error::{AppError, Result};
use crate::models::{RunStatusResponse, StartRunRequest, StartRunResponse};

/// Start an agent run against a remote session.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRunRequest>,
) -> Result<Json<StartRunResponse>> {
    if request.goal.trim().is_empty() {
        return Err(AppError::Validation("goal must not be empty".to_string()));
    }
    if request.session_id.trim().is_empty() {
        return Err(AppError::Validation(
            "session_id must not be empty".to_string(),
        ));
    }

    let runner = state.factory.build(&request)?;
    let run_id = uuid::Uuid::new_v4().to_string();
    let cancel = CancellationToken::new();
    let finished = Arc::new(RwLock::new(None));

    state.runs.insert(
        run_id.clone(),
        RunHandle {
            goal: request.goal.clone(),
            session_id: request.session_id.clone(),
            cancel: cancel.clone(),
            finished: Arc::clone(&finished),
        },
    );

    let spawned_run_id = run_id.clone();
    tokio::spawn(async move {
        let final_state = runner
            .run_with_id(
                spawned_run_id.clone(),
                &request.goal,
                &request.session_id,
                cancel,
            )
            .await;
        tracing::info!(run_id = %spawned_run_id, status = ?final_state.status, "run finished");
        *finished.write().await = Some(final_state);
    });

    Ok(Json(StartRunResponse { run_id }))
}

/// Fetch a run: a running marker while live, the full state once finished.
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<RunStatusResponse>> {
    // Clone the slot out so the map shard is not held across the await
    let finished = {
        let handle = state
            .runs
            .get(&run_id)
            .ok_or_else(|| AppError::RunNotFound(run_id.clone()))?;
        Arc::clone(&handle.finished)
    };

    let final_state = finished.read().await.clone();
    Ok(Json(RunStatusResponse {
        run_id,
        running: final_state.is_none(),
        state: final_state,
    }))
}

/// Request cancellation. Observed at the next step boundary; any retry
/// sequence already in flight completes or exhausts first.
pub async fn cancel_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<Value>> {
    let handle = state
        .runs
        .get(&run_id)
        .ok_or_else(|| AppError::RunNotFound(run_id.clone()))?;

    handle.cancel.cancel();
    tracing::info!(run_id = %run_id, "cancellation requested");
    Ok(Json(json!({ "run_id": run_id, "cancelling": true })))
}
