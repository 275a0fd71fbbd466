//! Account, security audit and breach alert endpoints.

use api_types::{
    ListResponse,
    accounts::{
        AccountChildFilter, AccountNew, AccountUpdate, AccountView, BreachAlertNew,
        BreachAlertUpdate, BreachAlertView, SecurityAuditNew, SecurityAuditUpdate,
        SecurityAuditView, TwoFactorSet,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use engine::{Account, BreachAlert, SecurityAudit, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn account_view(account: Account, now: DateTime<Utc>) -> AccountView {
    AccountView {
        needs_password_change: account.needs_password_change(now),
        id: account.id,
        user_id: account.user_id,
        account_name: account.account_name,
        username: account.username,
        website_url: account.website_url,
        category: account.category,
        security_level: account.security_level,
        has_two_factor_auth: account.has_two_factor_auth,
        last_password_change: account.last_password_change,
        last_access_date: account.last_access_date,
        notes: account.notes,
        is_active: account.is_active,
        created_at: account.created_at,
    }
}

fn security_audit_view(audit: SecurityAudit) -> SecurityAuditView {
    SecurityAuditView {
        id: audit.id,
        account_id: audit.account_id,
        audit_type: audit.audit_type,
        status: audit.status,
        security_score: audit.security_score,
        findings: audit.findings,
        recommendations: audit.recommendations,
        audit_date: audit.audit_date,
        created_at: audit.created_at,
    }
}

fn breach_alert_view(alert: BreachAlert) -> BreachAlertView {
    BreachAlertView {
        id: alert.id,
        account_id: alert.account_id,
        severity: alert.severity,
        status: alert.status,
        description: alert.description,
        source: alert.source,
        breach_date: alert.breach_date,
        discovered_at: alert.discovered_at,
        notes: alert.notes,
        created_at: alert.created_at,
    }
}

pub async fn accounts(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ListResponse<AccountView>>, ServerError> {
    let accounts = state.engine.accounts(&user.username).await?;
    let now = Utc::now();
    Ok(Json(
        accounts
            .into_iter()
            .map(|account| account_view(account, now))
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn account(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(id, &user.username).await?;
    Ok(Json(account_view(account, Utc::now())))
}

pub async fn account_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountNew>, ServerError>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state.engine.new_account(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(account_view(account, Utc::now()))))
}

pub async fn account_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountUpdate>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .update_account(id, &user.username, payload)
        .await?;
    Ok(Json(account_view(account, Utc::now())))
}

pub async fn account_password_change(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let now = Utc::now();
    let account = state
        .engine
        .record_password_change(id, &user.username, now)
        .await?;
    Ok(Json(account_view(account, now)))
}

pub async fn account_two_factor(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<TwoFactorSet>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let now = Utc::now();
    let account = state
        .engine
        .set_two_factor(id, &user.username, payload.enabled, now)
        .await?;
    Ok(Json(account_view(account, now)))
}

pub async fn account_access(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let now = Utc::now();
    let account = state
        .engine
        .record_account_access(id, &user.username, now)
        .await?;
    Ok(Json(account_view(account, now)))
}

pub async fn account_toggle(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.toggle_account(id, &user.username).await?;
    Ok(Json(account_view(account, Utc::now())))
}

pub async fn account_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn security_audits(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<AccountChildFilter>, ServerError>,
) -> Result<Json<ListResponse<SecurityAuditView>>, ServerError> {
    let audits = state
        .engine
        .security_audits(&user.username, &filter)
        .await?;
    Ok(Json(
        audits
            .into_iter()
            .map(security_audit_view)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn security_audit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<SecurityAuditView>, ServerError> {
    let audit = state.engine.security_audit(id, &user.username).await?;
    Ok(Json(security_audit_view(audit)))
}

pub async fn security_audit_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<SecurityAuditNew>, ServerError>,
) -> Result<(StatusCode, Json<SecurityAuditView>), ServerError> {
    let audit = state
        .engine
        .new_security_audit(&user.username, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(security_audit_view(audit))))
}

pub async fn security_audit_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<SecurityAuditUpdate>, ServerError>,
) -> Result<Json<SecurityAuditView>, ServerError> {
    let audit = state
        .engine
        .update_security_audit(id, &user.username, payload)
        .await?;
    Ok(Json(security_audit_view(audit)))
}

pub async fn security_audit_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_security_audit(id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn breach_alerts(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<AccountChildFilter>, ServerError>,
) -> Result<Json<ListResponse<BreachAlertView>>, ServerError> {
    let alerts = state.engine.breach_alerts(&user.username, &filter).await?;
    Ok(Json(
        alerts
            .into_iter()
            .map(breach_alert_view)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn breach_alert(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<BreachAlertView>, ServerError> {
    let alert = state.engine.breach_alert(id, &user.username).await?;
    Ok(Json(breach_alert_view(alert)))
}

pub async fn breach_alert_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<BreachAlertNew>, ServerError>,
) -> Result<(StatusCode, Json<BreachAlertView>), ServerError> {
    let alert = state
        .engine
        .new_breach_alert(&user.username, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(breach_alert_view(alert))))
}

pub async fn breach_alert_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<BreachAlertUpdate>, ServerError>,
) -> Result<Json<BreachAlertView>, ServerError> {
    let alert = state
        .engine
        .update_breach_alert(id, &user.username, payload)
        .await?;
    Ok(Json(breach_alert_view(alert)))
}

pub async fn breach_alert_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_breach_alert(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
