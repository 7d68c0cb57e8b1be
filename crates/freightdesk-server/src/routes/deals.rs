use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use freightdesk_core::time::now_utc;
use freightdesk_core::{DealDraft, DealDto, DealId, DealViewDto};
use freightdesk_store::error::StoreError;

use super::MessageResponse;
use crate::error::ApiError;
use crate::AppState;

pub async fn list_deals(
    State(state): State<AppState>,
) -> Result<Json<Vec<DealViewDto>>, ApiError> {
    let deals = state.with_store(|store| store.deals().list()).await?;
    Ok(Json(deals.into_iter().map(DealViewDto::from).collect()))
}

pub async fn create_deal(
    State(state): State<AppState>,
    payload: Result<Json<DealDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<DealDto>), ApiError> {
    let Json(draft) = payload?;
    let input = draft.into_new()?;
    let deal = state
        .with_store(move |store| store.deals().create(now_utc(), input))
        .await?;
    tracing::info!(deal_id = %deal.id, load_id = %deal.load_id, "deal recorded");
    Ok((StatusCode::CREATED, Json(deal.into())))
}

pub async fn get_deal(
    State(state): State<AppState>,
    id: Result<Path<DealId>, PathRejection>,
) -> Result<Json<DealViewDto>, ApiError> {
    let Path(id) = id?;
    let view = state
        .with_store(move |store| {
            store
                .deals()
                .get(id)?
                .ok_or_else(|| StoreError::NotFound(format!("deal {id}")))
        })
        .await?;
    Ok(Json(view.into()))
}

pub async fn update_deal(
    State(state): State<AppState>,
    id: Result<Path<DealId>, PathRejection>,
    payload: Result<Json<DealDraft>, JsonRejection>,
) -> Result<Json<DealDto>, ApiError> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    let deal = state
        .with_store(move |store| {
            if store.deals().get(id)?.is_none() {
                return Err(StoreError::NotFound(format!("deal {id}")));
            }
            let input = draft.into_new()?;
            store.deals().update(id, input)
        })
        .await?;
    Ok(Json(deal.into()))
}

pub async fn delete_deal(
    State(state): State<AppState>,
    id: Result<Path<DealId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.with_store(move |store| store.deals().delete(id)).await?;
    tracing::info!(deal_id = %id, "deal deleted");
    Ok(Json(MessageResponse::new("Deal deleted successfully")))
}
