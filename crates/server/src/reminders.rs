//! Important date and reminder endpoints.

use api_types::{
    ListResponse,
    reminders::{
        ImportantDateFilter, ImportantDateNew, ImportantDateUpdate, ImportantDateView,
        ReminderFilter, ReminderNew, ReminderSnooze, ReminderUpdate, ReminderView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use engine::{ImportantDate, Reminder, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn important_date_view(date: ImportantDate, now: DateTime<Utc>) -> ImportantDateView {
    ImportantDateView {
        next_occurrence: date.next_occurrence(now),
        id: date.id,
        user_id: date.user_id,
        person_name: date.person_name,
        date_type: date.date_type,
        date_value: date.date_value,
        recurrence_pattern: date.recurrence_pattern,
        relationship: date.relationship,
        notes: date.notes,
        is_active: date.is_active,
        created_at: date.created_at,
    }
}

fn reminder_view(reminder: Reminder, now: DateTime<Utc>) -> ReminderView {
    ReminderView {
        is_ready_to_send: reminder.is_ready_to_send(now),
        id: reminder.id,
        important_date_id: reminder.important_date_id,
        scheduled_time: reminder.scheduled_time,
        advance_notice_days: reminder.advance_notice_days,
        delivery_channel: reminder.delivery_channel,
        status: reminder.status,
        sent_at: reminder.sent_at,
    }
}

fn reminder_list(reminders: Vec<Reminder>) -> ListResponse<ReminderView> {
    let now = Utc::now();
    reminders
        .into_iter()
        .map(|reminder| reminder_view(reminder, now))
        .collect::<Vec<_>>()
        .into()
}

pub async fn important_dates(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<ImportantDateFilter>, ServerError>,
) -> Result<Json<ListResponse<ImportantDateView>>, ServerError> {
    let dates = state.engine.important_dates(&user.username, &filter).await?;
    let now = Utc::now();
    Ok(Json(
        dates
            .into_iter()
            .map(|date| important_date_view(date, now))
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn important_date(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<ImportantDateView>, ServerError> {
    let date = state.engine.important_date(id, &user.username).await?;
    Ok(Json(important_date_view(date, Utc::now())))
}

pub async fn important_date_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ImportantDateNew>, ServerError>,
) -> Result<(StatusCode, Json<ImportantDateView>), ServerError> {
    let date = state
        .engine
        .new_important_date(&user.username, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(important_date_view(date, Utc::now()))))
}

pub async fn important_date_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<ImportantDateUpdate>, ServerError>,
) -> Result<Json<ImportantDateView>, ServerError> {
    let date = state
        .engine
        .update_important_date(id, &user.username, payload)
        .await?;
    Ok(Json(important_date_view(date, Utc::now())))
}

pub async fn important_date_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_important_date(id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reminders(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<ReminderFilter>, ServerError>,
) -> Result<Json<ListResponse<ReminderView>>, ServerError> {
    let reminders = state.engine.reminders(&user.username, &filter).await?;
    Ok(Json(reminder_list(reminders)))
}

/// Reminders ready to go out right now.
pub async fn reminders_due(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ListResponse<ReminderView>>, ServerError> {
    let reminders = state
        .engine
        .due_reminders(&user.username, Utc::now())
        .await?;
    Ok(Json(reminder_list(reminders)))
}

pub async fn reminder(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<ReminderView>, ServerError> {
    let reminder = state.engine.reminder(id, &user.username).await?;
    Ok(Json(reminder_view(reminder, Utc::now())))
}

pub async fn reminder_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ReminderNew>, ServerError>,
) -> Result<(StatusCode, Json<ReminderView>), ServerError> {
    let reminder = state.engine.new_reminder(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(reminder_view(reminder, Utc::now()))))
}

pub async fn reminder_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<ReminderUpdate>, ServerError>,
) -> Result<Json<ReminderView>, ServerError> {
    let reminder = state
        .engine
        .update_reminder(id, &user.username, payload)
        .await?;
    Ok(Json(reminder_view(reminder, Utc::now())))
}

pub async fn reminder_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_reminder(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reminder_sent(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<ReminderView>, ServerError> {
    let now = Utc::now();
    let reminder = state
        .engine
        .mark_reminder_sent(id, &user.username, now)
        .await?;
    Ok(Json(reminder_view(reminder, now)))
}

pub async fn reminder_snooze(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<ReminderSnooze>, ServerError>,
) -> Result<Json<ReminderView>, ServerError> {
    let reminder = state
        .engine
        .snooze_reminder(id, &user.username, payload.minutes)
        .await?;
    Ok(Json(reminder_view(reminder, Utc::now())))
}

pub async fn reminder_dismiss(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<ReminderView>, ServerError> {
    let reminder = state.engine.dismiss_reminder(id, &user.username).await?;
    Ok(Json(reminder_view(reminder, Utc::now())))
}
