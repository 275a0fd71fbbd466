//! Purchase, warranty and return window endpoints.

use api_types::{
    ListResponse,
    warranties::{
        PurchaseChildFilter, PurchaseNew, PurchaseReturn, PurchaseUpdate, PurchaseView, Reason,
        ReturnWindowNew, ReturnWindowUpdate, ReturnWindowView, WarrantyNew, WarrantyUpdate,
        WarrantyView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use engine::{PurchaseDetail, ReturnWindow, User, Warranty};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn purchase_view(detail: PurchaseDetail, now: DateTime<Utc>) -> PurchaseView {
    let has_active_warranty = detail.has_active_warranty(now);
    let can_be_returned = detail.can_be_returned(now);
    let purchase = detail.purchase;
    PurchaseView {
        id: purchase.id,
        user_id: purchase.user_id,
        product_name: purchase.product_name,
        category: purchase.category,
        store_name: purchase.store_name,
        purchase_date: purchase.purchase_date,
        price_minor: purchase.price_minor,
        model_number: purchase.model_number,
        serial_number: purchase.serial_number,
        status: purchase.status,
        notes: purchase.notes,
        created_at: purchase.created_at,
        has_active_warranty,
        can_be_returned,
    }
}

fn warranty_view(warranty: Warranty, now: DateTime<Utc>) -> WarrantyView {
    WarrantyView {
        days_remaining: warranty.days_remaining(now),
        is_expiring_soon: warranty.is_expiring_soon(now),
        id: warranty.id,
        purchase_id: warranty.purchase_id,
        warranty_type: warranty.warranty_type,
        provider: warranty.provider,
        start_date: warranty.start_date,
        end_date: warranty.end_date,
        duration_months: warranty.duration_months,
        coverage_details: warranty.coverage_details,
        registration_number: warranty.registration_number,
        status: warranty.status,
        claim_filed_date: warranty.claim_filed_date,
        notes: warranty.notes,
    }
}

fn return_window_view(window: ReturnWindow, now: DateTime<Utc>) -> ReturnWindowView {
    ReturnWindowView {
        is_open: window.is_open(now),
        is_closing_soon: window.is_closing_soon(now),
        days_remaining: window.days_remaining(now),
        id: window.id,
        purchase_id: window.purchase_id,
        start_date: window.start_date,
        end_date: window.end_date,
        duration_days: window.duration_days,
        policy_details: window.policy_details,
        restocking_fee_percent: window.restocking_fee_percent,
        status: window.status,
    }
}

pub async fn purchases(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ListResponse<PurchaseView>>, ServerError> {
    let purchases = state.engine.purchases(&user.username).await?;
    let now = Utc::now();
    Ok(Json(
        purchases
            .into_iter()
            .map(|detail| purchase_view(detail, now))
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn purchase(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<PurchaseView>, ServerError> {
    let detail = state.engine.purchase(id, &user.username).await?;
    Ok(Json(purchase_view(detail, Utc::now())))
}

pub async fn purchase_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PurchaseNew>, ServerError>,
) -> Result<(StatusCode, Json<PurchaseView>), ServerError> {
    let detail = state.engine.new_purchase(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(purchase_view(detail, Utc::now()))))
}

pub async fn purchase_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PurchaseUpdate>, ServerError>,
) -> Result<Json<PurchaseView>, ServerError> {
    let detail = state
        .engine
        .update_purchase(id, &user.username, payload)
        .await?;
    Ok(Json(purchase_view(detail, Utc::now())))
}

/// Mark a purchase returned, on `returned_on` or today.
pub async fn purchase_return(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(payload, _): WithRejection<Option<Json<PurchaseReturn>>, ServerError>,
) -> Result<Json<PurchaseView>, ServerError> {
    let now = Utc::now();
    let returned_on = payload
        .and_then(|Json(payload)| payload.returned_on)
        .unwrap_or(now);
    let detail = state
        .engine
        .return_purchase(id, &user.username, returned_on)
        .await?;
    Ok(Json(purchase_view(detail, now)))
}

pub async fn purchase_dispose(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<PurchaseView>, ServerError> {
    let detail = state.engine.dispose_purchase(id, &user.username).await?;
    Ok(Json(purchase_view(detail, Utc::now())))
}

pub async fn purchase_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_purchase(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn warranties(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<PurchaseChildFilter>, ServerError>,
) -> Result<Json<ListResponse<WarrantyView>>, ServerError> {
    let warranties = state.engine.warranties(&user.username, &filter).await?;
    let now = Utc::now();
    Ok(Json(
        warranties
            .into_iter()
            .map(|warranty| warranty_view(warranty, now))
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn warranty(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<WarrantyView>, ServerError> {
    let warranty = state.engine.warranty(id, &user.username).await?;
    Ok(Json(warranty_view(warranty, Utc::now())))
}

pub async fn warranty_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<WarrantyNew>, ServerError>,
) -> Result<(StatusCode, Json<WarrantyView>), ServerError> {
    let warranty = state.engine.new_warranty(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(warranty_view(warranty, Utc::now()))))
}

pub async fn warranty_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<WarrantyUpdate>, ServerError>,
) -> Result<Json<WarrantyView>, ServerError> {
    let warranty = state
        .engine
        .update_warranty(id, &user.username, payload)
        .await?;
    Ok(Json(warranty_view(warranty, Utc::now())))
}

pub async fn warranty_claim(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<WarrantyView>, ServerError> {
    let now = Utc::now();
    let warranty = state.engine.file_claim(id, &user.username, now).await?;
    Ok(Json(warranty_view(warranty, now)))
}

pub async fn warranty_claim_approve(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<WarrantyView>, ServerError> {
    let warranty = state.engine.approve_claim(id, &user.username).await?;
    Ok(Json(warranty_view(warranty, Utc::now())))
}

pub async fn warranty_claim_reject(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<Reason>, ServerError>,
) -> Result<Json<WarrantyView>, ServerError> {
    let warranty = state
        .engine
        .reject_claim(id, &user.username, &payload.reason)
        .await?;
    Ok(Json(warranty_view(warranty, Utc::now())))
}

pub async fn warranty_void(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<Reason>, ServerError>,
) -> Result<Json<WarrantyView>, ServerError> {
    let warranty = state
        .engine
        .void_warranty(id, &user.username, &payload.reason)
        .await?;
    Ok(Json(warranty_view(warranty, Utc::now())))
}

pub async fn warranty_expire(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<WarrantyView>, ServerError> {
    let warranty = state.engine.expire_warranty(id, &user.username).await?;
    Ok(Json(warranty_view(warranty, Utc::now())))
}

pub async fn warranty_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_warranty(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn return_windows(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<PurchaseChildFilter>, ServerError>,
) -> Result<Json<ListResponse<ReturnWindowView>>, ServerError> {
    let windows = state
        .engine
        .return_windows(&user.username, &filter)
        .await?;
    let now = Utc::now();
    Ok(Json(
        windows
            .into_iter()
            .map(|window| return_window_view(window, now))
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn return_window(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<ReturnWindowView>, ServerError> {
    let window = state.engine.return_window(id, &user.username).await?;
    Ok(Json(return_window_view(window, Utc::now())))
}

pub async fn return_window_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ReturnWindowNew>, ServerError>,
) -> Result<(StatusCode, Json<ReturnWindowView>), ServerError> {
    let window = state
        .engine
        .new_return_window(&user.username, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(return_window_view(window, Utc::now()))))
}

pub async fn return_window_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<ReturnWindowUpdate>, ServerError>,
) -> Result<Json<ReturnWindowView>, ServerError> {
    let window = state
        .engine
        .update_return_window(id, &user.username, payload)
        .await?;
    Ok(Json(return_window_view(window, Utc::now())))
}

pub async fn return_window_use(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<ReturnWindowView>, ServerError> {
    let window = state.engine.use_return_window(id, &user.username).await?;
    Ok(Json(return_window_view(window, Utc::now())))
}

pub async fn return_window_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_return_window(id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::warranties::{ReturnWindowStatus, WarrantyStatus, WarrantyType};
    use chrono::Duration;

    #[test]
    fn warranty_view_reports_days_left() {
        let now = Utc::now();
        let warranty = Warranty {
            id: Uuid::new_v4(),
            purchase_id: Uuid::new_v4(),
            warranty_type: WarrantyType::Extended,
            provider: Some("Shop".to_string()),
            start_date: now - Duration::days(300),
            end_date: now + Duration::days(10),
            duration_months: 12,
            coverage_details: None,
            registration_number: Some("R-1".to_string()),
            status: WarrantyStatus::Active,
            claim_filed_date: None,
            notes: None,
        };

        let view = warranty_view(warranty, now);
        assert_eq!(view.days_remaining, 10);
        assert!(view.is_expiring_soon);
        assert_eq!(view.warranty_type, WarrantyType::Extended);
        assert_eq!(view.registration_number.as_deref(), Some("R-1"));
    }

    #[test]
    fn used_return_window_is_not_open() {
        let now = Utc::now();
        let window = ReturnWindow {
            id: Uuid::new_v4(),
            purchase_id: Uuid::new_v4(),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(20),
            duration_days: 21,
            policy_details: None,
            restocking_fee_percent: Some(10.0),
            status: ReturnWindowStatus::Used,
        };

        let view = return_window_view(window, now);
        assert!(!view.is_open);
        assert!(!view.is_closing_soon);
        assert_eq!(view.restocking_fee_percent, Some(10.0));
    }
}
