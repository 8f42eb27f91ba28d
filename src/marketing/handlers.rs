// HTTP handlers for draft capture and the recovery batch trigger

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::marketing::{
    CreateDraftRequest, DraftBooking, MarketingError, RecoveryRunSummary, UpdateDraftRequest,
};

/// Handler for POST /api/drafts
/// Captures a partially completed booking from the public funnel
pub async fn create_draft_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<DraftBooking>), MarketingError> {
    request
        .validate()
        .map_err(|e| MarketingError::ValidationError(e.to_string()))?;

    let draft = state.draft_repo.create(&request).await?;

    tracing::debug!("Captured draft {} for {}", draft.id, draft.customer_email);
    Ok((StatusCode::CREATED, Json(draft)))
}

/// Handler for PATCH /api/drafts/{id}
/// Updates the draft as the customer progresses; touches last_active
pub async fn update_draft_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDraftRequest>,
) -> Result<Json<DraftBooking>, MarketingError> {
    request
        .validate()
        .map_err(|e| MarketingError::ValidationError(e.to_string()))?;

    let draft = state.draft_repo.update(id, &request).await?;

    Ok(Json(draft))
}

/// Handler for POST /api/admin/marketing/recovery-run (admin)
/// Processes one page of abandoned drafts and reports what happened
pub async fn recovery_run_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<RecoveryRunSummary>, MarketingError> {
    let summary = state.recovery.run().await?;

    Ok(Json(summary))
}
