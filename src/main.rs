use anyhow::Context;
use local_todo_webapp::{StoreConfig, TodoStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = store_config_from_env();
    let bind_addr =
        std::env::var("TODO_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

    let store = Arc::new(TodoStore::new(&config));
    store
        .ensure_initialized()
        .context("failed to create the todo document")?;

    tracing::info!(
        data_file = %config.data_file.display(),
        backup_dir = %config.backup_dir.display(),
        addr = %bind_addr,
        "todo server starting"
    );

    local_todo_webapp::http::serve(store, &bind_addr)
        .await
        .context("http server failed")
}

fn store_config_from_env() -> StoreConfig {
    let defaults = StoreConfig::default();
    StoreConfig {
        data_file: std::env::var_os("TODO_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_file),
        backup_dir: std::env::var_os("TODO_BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.backup_dir),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let log_dir = std::env::var_os("TODO_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("logs"));
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "todo-server.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
        .try_init()?;
    Ok(())
}
