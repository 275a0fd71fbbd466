use std::sync::Arc;

use engine::{BroadcastPublisher, Notification};
use migration::{Migrator, MigratorTrait};
use settings::Database;
use tokio::sync::broadcast::{self, error::RecvError};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "trackers={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no [server] section configured, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;

    let mut builder = engine::Engine::builder().database(db);
    if settings.notifications.enabled {
        let publisher = BroadcastPublisher::new(settings.notifications.capacity);
        let receiver = publisher.subscribe();
        builder = builder.publisher(Arc::new(publisher));
        tasks.spawn(notification_sink(receiver));
    }
    let engine = builder.build().await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

/// Log every notification published by the engine.
async fn notification_sink(mut receiver: broadcast::Receiver<Notification>) {
    loop {
        match receiver.recv().await {
            Ok(notification) => match serde_json::to_string(&notification) {
                Ok(payload) => tracing::info!(%payload, "notification delivered"),
                Err(err) => tracing::warn!("failed to encode notification: {err}"),
            },
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "notification sink lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
