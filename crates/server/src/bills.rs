//! Payee, bill and payment endpoints.

use api_types::{
    ListResponse,
    bills::{
        BillFilter, BillNew, BillUpdate, BillView, PayeeNew, PayeeUpdate, PayeeView,
        PaymentFilter, PaymentNew, PaymentUpdate, PaymentView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use engine::{Bill, Payee, Payment, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn payee_view(payee: Payee) -> PayeeView {
    PayeeView {
        id: payee.id,
        user_id: payee.user_id,
        name: payee.name,
        account_number: payee.account_number,
        website: payee.website,
        phone: payee.phone,
        notes: payee.notes,
        created_at: payee.created_at,
    }
}

fn bill_view(bill: Bill, now: DateTime<Utc>) -> BillView {
    BillView {
        is_overdue: bill.is_overdue(now),
        next_due_date: bill.next_due_date(),
        id: bill.id,
        user_id: bill.user_id,
        payee_id: bill.payee_id,
        name: bill.name,
        amount_minor: bill.amount_minor,
        due_date: bill.due_date,
        billing_frequency: bill.billing_frequency,
        status: bill.status,
        is_autopay: bill.is_autopay,
        notes: bill.notes,
        created_at: bill.created_at,
    }
}

fn payment_view(payment: Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        bill_id: payment.bill_id,
        amount_minor: payment.amount_minor,
        payment_date: payment.payment_date,
        payment_method: payment.payment_method,
        confirmation_number: payment.confirmation_number,
        notes: payment.notes,
        created_at: payment.created_at,
    }
}

pub async fn payees(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ListResponse<PayeeView>>, ServerError> {
    let payees = state.engine.payees(&user.username).await?;
    Ok(Json(
        payees.into_iter().map(payee_view).collect::<Vec<_>>().into(),
    ))
}

pub async fn payee(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<PayeeView>, ServerError> {
    let payee = state.engine.payee(id, &user.username).await?;
    Ok(Json(payee_view(payee)))
}

pub async fn payee_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PayeeNew>, ServerError>,
) -> Result<(StatusCode, Json<PayeeView>), ServerError> {
    let payee = state.engine.new_payee(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(payee_view(payee))))
}

pub async fn payee_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PayeeUpdate>, ServerError>,
) -> Result<Json<PayeeView>, ServerError> {
    let payee = state
        .engine
        .update_payee(id, &user.username, payload)
        .await?;
    Ok(Json(payee_view(payee)))
}

pub async fn payee_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_payee(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bills(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<BillFilter>, ServerError>,
) -> Result<Json<ListResponse<BillView>>, ServerError> {
    let bills = state.engine.bills(&user.username, &filter).await?;
    let now = Utc::now();
    Ok(Json(
        bills
            .into_iter()
            .map(|bill| bill_view(bill, now))
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn bill(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state.engine.bill(id, &user.username).await?;
    Ok(Json(bill_view(bill, Utc::now())))
}

pub async fn bill_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<BillNew>, ServerError>,
) -> Result<(StatusCode, Json<BillView>), ServerError> {
    let bill = state.engine.new_bill(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(bill_view(bill, Utc::now()))))
}

pub async fn bill_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<BillUpdate>, ServerError>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state.engine.update_bill(id, &user.username, payload).await?;
    Ok(Json(bill_view(bill, Utc::now())))
}

pub async fn bill_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_bill(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bill_pay(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state.engine.pay_bill(id, &user.username).await?;
    Ok(Json(bill_view(bill, Utc::now())))
}

pub async fn payments(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<PaymentFilter>, ServerError>,
) -> Result<Json<ListResponse<PaymentView>>, ServerError> {
    let payments = state.engine.payments(&user.username, &filter).await?;
    Ok(Json(
        payments
            .into_iter()
            .map(payment_view)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn payment(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<PaymentView>, ServerError> {
    let payment = state.engine.payment(id, &user.username).await?;
    Ok(Json(payment_view(payment)))
}

pub async fn payment_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PaymentNew>, ServerError>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let payment = state.engine.new_payment(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(payment_view(payment))))
}

pub async fn payment_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PaymentUpdate>, ServerError>,
) -> Result<Json<PaymentView>, ServerError> {
    let payment = state
        .engine
        .update_payment(id, &user.username, payload)
        .await?;
    Ok(Json(payment_view(payment)))
}

pub async fn payment_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_payment(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::bills::{BillStatus, BillingFrequency};
    use chrono::TimeZone;

    #[test]
    fn bill_view_copies_fields_and_derives_flags() {
        let due = Utc.with_ymd_and_hms(2026, 1, 31, 9, 0, 0).unwrap();
        let bill = Bill {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            payee_id: Uuid::new_v4(),
            name: "Rent".to_string(),
            amount_minor: 120_000,
            due_date: due,
            billing_frequency: BillingFrequency::Monthly,
            status: BillStatus::Pending,
            is_autopay: true,
            notes: Some("flat".to_string()),
            created_at: due,
        };

        let view = bill_view(bill.clone(), due + chrono::Duration::days(1));
        assert_eq!(view.id, bill.id);
        assert_eq!(view.payee_id, bill.payee_id);
        assert_eq!(view.amount_minor, 120_000);
        assert_eq!(view.notes.as_deref(), Some("flat"));
        assert!(view.is_autopay);
        assert!(view.is_overdue);
        assert_eq!(
            view.next_due_date,
            Some(Utc.with_ymd_and_hms(2026, 2, 28, 9, 0, 0).unwrap())
        );
    }
}
