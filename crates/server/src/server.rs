use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::sync::Arc;

use crate::{accounts, bills, habits, reminders, warranties};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = match state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
    {
        Ok(user) => user,
        Err(EngineError::InvalidCredentials) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("authentication failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn api(state: ServerState) -> Router<ServerState> {
    Router::new()
        // bills
        .route("/payees", get(bills::payees).post(bills::payee_new))
        .route(
            "/payees/{id}",
            get(bills::payee)
                .put(bills::payee_update)
                .delete(bills::payee_delete),
        )
        .route("/bills", get(bills::bills).post(bills::bill_new))
        .route(
            "/bills/{id}",
            get(bills::bill)
                .put(bills::bill_update)
                .delete(bills::bill_delete),
        )
        .route("/bills/{id}/pay", post(bills::bill_pay))
        .route("/payments", get(bills::payments).post(bills::payment_new))
        .route(
            "/payments/{id}",
            get(bills::payment)
                .put(bills::payment_update)
                .delete(bills::payment_delete),
        )
        // reminders
        .route(
            "/important-dates",
            get(reminders::important_dates).post(reminders::important_date_new),
        )
        .route(
            "/important-dates/{id}",
            get(reminders::important_date)
                .put(reminders::important_date_update)
                .delete(reminders::important_date_delete),
        )
        .route(
            "/reminders",
            get(reminders::reminders).post(reminders::reminder_new),
        )
        .route("/reminders/due", get(reminders::reminders_due))
        .route(
            "/reminders/{id}",
            get(reminders::reminder)
                .put(reminders::reminder_update)
                .delete(reminders::reminder_delete),
        )
        .route("/reminders/{id}/sent", post(reminders::reminder_sent))
        .route("/reminders/{id}/snooze", post(reminders::reminder_snooze))
        .route("/reminders/{id}/dismiss", post(reminders::reminder_dismiss))
        // habits
        .route("/habits", get(habits::habits).post(habits::habit_new))
        .route(
            "/habits/{id}",
            get(habits::habit)
                .put(habits::habit_update)
                .delete(habits::habit_delete),
        )
        .route("/habits/{id}/toggle", post(habits::habit_toggle))
        .route("/streaks", get(habits::streaks).post(habits::streak_new))
        .route(
            "/streaks/{id}",
            get(habits::streak)
                .put(habits::streak_update)
                .delete(habits::streak_delete),
        )
        .route("/streaks/{id}/complete", post(habits::streak_complete))
        .route("/streaks/{id}/reset", post(habits::streak_reset))
        // accounts
        .route(
            "/accounts",
            get(accounts::accounts).post(accounts::account_new),
        )
        .route(
            "/accounts/{id}",
            get(accounts::account)
                .put(accounts::account_update)
                .delete(accounts::account_delete),
        )
        .route(
            "/accounts/{id}/password-change",
            post(accounts::account_password_change),
        )
        .route(
            "/accounts/{id}/two-factor",
            post(accounts::account_two_factor),
        )
        .route("/accounts/{id}/access", post(accounts::account_access))
        .route("/accounts/{id}/toggle", post(accounts::account_toggle))
        .route(
            "/security-audits",
            get(accounts::security_audits).post(accounts::security_audit_new),
        )
        .route(
            "/security-audits/{id}",
            get(accounts::security_audit)
                .put(accounts::security_audit_update)
                .delete(accounts::security_audit_delete),
        )
        .route(
            "/breach-alerts",
            get(accounts::breach_alerts).post(accounts::breach_alert_new),
        )
        .route(
            "/breach-alerts/{id}",
            get(accounts::breach_alert)
                .put(accounts::breach_alert_update)
                .delete(accounts::breach_alert_delete),
        )
        // warranties
        .route(
            "/purchases",
            get(warranties::purchases).post(warranties::purchase_new),
        )
        .route(
            "/purchases/{id}",
            get(warranties::purchase)
                .put(warranties::purchase_update)
                .delete(warranties::purchase_delete),
        )
        .route("/purchases/{id}/return", post(warranties::purchase_return))
        .route("/purchases/{id}/dispose", post(warranties::purchase_dispose))
        .route(
            "/warranties",
            get(warranties::warranties).post(warranties::warranty_new),
        )
        .route(
            "/warranties/{id}",
            get(warranties::warranty)
                .put(warranties::warranty_update)
                .delete(warranties::warranty_delete),
        )
        .route("/warranties/{id}/claim", post(warranties::warranty_claim))
        .route(
            "/warranties/{id}/claim/approve",
            post(warranties::warranty_claim_approve),
        )
        .route(
            "/warranties/{id}/claim/reject",
            post(warranties::warranty_claim_reject),
        )
        .route("/warranties/{id}/void", post(warranties::warranty_void))
        .route("/warranties/{id}/expire", post(warranties::warranty_expire))
        .route(
            "/return-windows",
            get(warranties::return_windows).post(warranties::return_window_new),
        )
        .route(
            "/return-windows/{id}",
            get(warranties::return_window)
                .put(warranties::return_window_update)
                .delete(warranties::return_window_delete),
        )
        .route(
            "/return-windows/{id}/use",
            post(warranties::return_window_use),
        )
        .route_layer(middleware::from_fn_with_state(state, auth))
}

/// Build the full application router: `/health` plus the authenticated `/api`.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };
    Router::new()
        .route("/health", get(health))
        .nest("/api", api(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
