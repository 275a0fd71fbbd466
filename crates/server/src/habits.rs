//! Habit and streak endpoints.

use api_types::{
    ListResponse,
    habits::{
        HabitNew, HabitUpdate, HabitView, StreakComplete, StreakFilter, StreakNew, StreakUpdate,
        StreakView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use engine::{Habit, Streak, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn habit_view(habit: Habit) -> HabitView {
    HabitView {
        id: habit.id,
        user_id: habit.user_id,
        name: habit.name,
        description: habit.description,
        frequency: habit.frequency,
        target_days_per_week: habit.target_days_per_week,
        start_date: habit.start_date,
        is_active: habit.is_active,
        notes: habit.notes,
        created_at: habit.created_at,
    }
}

fn streak_view(streak: Streak, now: DateTime<Utc>) -> StreakView {
    StreakView {
        is_broken: streak.is_streak_broken(now),
        id: streak.id,
        habit_id: streak.habit_id,
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        last_completion_date: streak.last_completion_date,
        streak_start_date: streak.streak_start_date,
        is_active: streak.is_active,
    }
}

pub async fn habits(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ListResponse<HabitView>>, ServerError> {
    let habits = state.engine.habits(&user.username).await?;
    Ok(Json(
        habits.into_iter().map(habit_view).collect::<Vec<_>>().into(),
    ))
}

pub async fn habit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<HabitView>, ServerError> {
    let habit = state.engine.habit(id, &user.username).await?;
    Ok(Json(habit_view(habit)))
}

pub async fn habit_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<HabitNew>, ServerError>,
) -> Result<(StatusCode, Json<HabitView>), ServerError> {
    let habit = state.engine.new_habit(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(habit_view(habit))))
}

pub async fn habit_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<HabitUpdate>, ServerError>,
) -> Result<Json<HabitView>, ServerError> {
    let habit = state
        .engine
        .update_habit(id, &user.username, payload)
        .await?;
    Ok(Json(habit_view(habit)))
}

pub async fn habit_toggle(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<HabitView>, ServerError> {
    let habit = state.engine.toggle_habit(id, &user.username).await?;
    Ok(Json(habit_view(habit)))
}

pub async fn habit_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_habit(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn streaks(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(filter), _): WithRejection<Query<StreakFilter>, ServerError>,
) -> Result<Json<ListResponse<StreakView>>, ServerError> {
    let streaks = state.engine.streaks(&user.username, &filter).await?;
    let now = Utc::now();
    Ok(Json(
        streaks
            .into_iter()
            .map(|streak| streak_view(streak, now))
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn streak(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<StreakView>, ServerError> {
    let streak = state.engine.streak(id, &user.username).await?;
    Ok(Json(streak_view(streak, Utc::now())))
}

pub async fn streak_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<StreakNew>, ServerError>,
) -> Result<(StatusCode, Json<StreakView>), ServerError> {
    let streak = state.engine.new_streak(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(streak_view(streak, Utc::now()))))
}

pub async fn streak_update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<StreakUpdate>, ServerError>,
) -> Result<Json<StreakView>, ServerError> {
    let streak = state
        .engine
        .update_streak(id, &user.username, payload)
        .await?;
    Ok(Json(streak_view(streak, Utc::now())))
}

/// Record a completion, at `completed_at` or now.
pub async fn streak_complete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(payload, _): WithRejection<Option<Json<StreakComplete>>, ServerError>,
) -> Result<Json<StreakView>, ServerError> {
    let now = Utc::now();
    let at = payload
        .and_then(|Json(payload)| payload.completed_at)
        .unwrap_or(now);
    let streak = state
        .engine
        .complete_streak(id, &user.username, at)
        .await?;
    Ok(Json(streak_view(streak, now)))
}

pub async fn streak_reset(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<StreakView>, ServerError> {
    let streak = state.engine.reset_streak(id, &user.username).await?;
    Ok(Json(streak_view(streak, Utc::now())))
}

pub async fn streak_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_streak(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
