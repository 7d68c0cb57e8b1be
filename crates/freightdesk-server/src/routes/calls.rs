use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use freightdesk_core::time::now_utc;
use freightdesk_core::{CallDraft, CallDto, CallId, CallRecordDto};
use freightdesk_store::error::StoreError;

use super::MessageResponse;
use crate::error::ApiError;
use crate::AppState;

pub async fn list_calls(State(state): State<AppState>) -> Result<Json<Vec<CallDto>>, ApiError> {
    let calls = state.with_store(|store| store.calls().list()).await?;
    Ok(Json(calls.into_iter().map(CallDto::from).collect()))
}

pub async fn create_call(
    State(state): State<AppState>,
    payload: Result<Json<CallDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<CallRecordDto>), ApiError> {
    let Json(draft) = payload?;
    let (fields, terms) = draft.into_parts()?;
    let record = state
        .with_store(move |store| store.calls().create(now_utc(), fields, terms))
        .await?;
    tracing::info!(
        call_id = %record.call.id,
        deal_id = record.deal.as_ref().map(|deal| deal.id.get()),
        "call recorded"
    );
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn get_call(
    State(state): State<AppState>,
    id: Result<Path<CallId>, PathRejection>,
) -> Result<Json<CallDto>, ApiError> {
    let Path(id) = id?;
    let call = state
        .with_store(move |store| {
            store
                .calls()
                .get(id)?
                .ok_or_else(|| StoreError::NotFound(format!("call {id}")))
        })
        .await?;
    Ok(Json(call.into()))
}

pub async fn update_call(
    State(state): State<AppState>,
    id: Result<Path<CallId>, PathRejection>,
    payload: Result<Json<CallDraft>, JsonRejection>,
) -> Result<Json<CallDto>, ApiError> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    let call = state
        .with_store(move |store| {
            if store.calls().get(id)?.is_none() {
                return Err(StoreError::NotFound(format!("call {id}")));
            }
            let fields = draft.into_fields()?;
            store.calls().update(id, fields)
        })
        .await?;
    Ok(Json(call.into()))
}

pub async fn delete_call(
    State(state): State<AppState>,
    id: Result<Path<CallId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.with_store(move |store| store.calls().delete(id)).await?;
    tracing::info!(call_id = %id, "call deleted");
    Ok(Json(MessageResponse::new("Call deleted successfully")))
}
