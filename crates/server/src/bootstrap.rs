use std::sync::Arc;

use samm_core::config::{AppConfig, ConfigError, LoadOptions};
use samm_db::{connect_with_settings, migrations, DbPool, SqlMeetingStore};
use samm_slack::events::meeting_dispatcher;
use samm_slack::gateway::RecordingGateway;
use samm_slack::socket::{NoopSocketTransport, ReconnectPolicy, SocketModeRunner};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub slack_runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    // The noop transport and recording gateway keep the runner inert until
    // real Slack credentials and a wire transport are plugged in; every
    // layer behind them is fully wired.
    let store = Arc::new(SqlMeetingStore::new(db_pool.clone()));
    let gateway = Arc::new(RecordingGateway::new());
    let dispatcher = meeting_dispatcher(
        store,
        gateway,
        config.meetings.ack_reaction.clone(),
        config.meetings.default_reminder_period_hours,
    );
    let slack_runner = SocketModeRunner::new(
        Arc::new(NoopSocketTransport),
        dispatcher,
        ReconnectPolicy::default(),
    );

    Ok(Application { config, db_pool, slack_runner })
}
