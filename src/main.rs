//! DevBoard server
//!
//! Multi-user task board with labels, soft delete and restore, served as a
//! JSON API over SQLite.

use anyhow::{Result, anyhow};
use clap::Parser;
use devboard::cli::seed::seed;
use devboard::cli::{Cli, Command};
use devboard::config::{Config, ConfigLoader, ConfigPaths};
use devboard::db::{Database, now_ms};
use devboard::logging::{LogTarget, init_logging};
use devboard::retention::{run_sweep, start_retention_sweeper};
use devboard::revalidate::RevalidationBus;
use devboard::service::TaskService;
use devboard::web::{AppState, start_server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_target: LogTarget = cli.log.parse()?;
    init_logging(&log_target, cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths.explicit = Some(PathBuf::from(config_path));
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    if let Some(path) = loader.config_path() {
        info!("Loaded config from {}", path.display());
    }

    // CLI flags take precedence over every config tier
    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.server.db_path = PathBuf::from(db_path);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let config = loader.into_config();

    let db = Arc::new(Database::open(&config.server.db_path)?);
    info!("Using database {}", config.server.db_path.display());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(db, config).await,
        Command::Sweep => {
            let bus = RevalidationBus::new();
            let report = run_sweep(&db, &bus, &config.retention, now_ms())?;
            println!(
                "Purged {} task(s) deleted before {}",
                report.deleted,
                report.cutoff_rfc3339()
            );
            Ok(())
        }
        Command::Seed => {
            let report = seed(&db, config.auth.session_ttl_ms())?;
            println!(
                "Seeded {} users, {} labels, {} tasks",
                report.users, report.labels, report.tasks
            );
            println!("Demo session token: {}", report.demo_token);
            Ok(())
        }
        Command::Session { email } => {
            let user = db
                .get_user_by_email(&email)?
                .ok_or_else(|| anyhow!("No user with email {}", email))?;
            let session = db.create_session(&user.id, config.auth.session_ttl_ms())?;
            println!("{}", session.token);
            Ok(())
        }
    }
}

async fn serve(db: Arc<Database>, config: Config) -> Result<()> {
    let purged = db.purge_expired_sessions(now_ms())?;
    if purged > 0 {
        info!(purged, "Expired sessions removed");
    }

    let bus = Arc::new(RevalidationBus::new());
    let service = TaskService::new(Arc::clone(&db), Arc::clone(&bus));

    let sweeper = if config.retention.enabled {
        Some(start_retention_sweeper(
            Arc::clone(&db),
            Arc::clone(&bus),
            config.retention.clone(),
        ))
    } else {
        info!("Retention sweep disabled");
        None
    };
    if config.retention.cron_secret.is_none() {
        warn!("CRON_SECRET not set; /api/cron/cleanup-tasks will reject all callers");
    }

    let state = AppState::from_service(service, &config);
    let server = start_server(state, config.server.bind_addr()?).await?;
    info!("Server ready on http://{}", server.addr());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    server.shutdown().await;
    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }
    Ok(())
}
