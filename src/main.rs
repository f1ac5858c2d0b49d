use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use employee_sync::{
    AppConfig, AppState, Employee, EmployeeStore, MirrorStore, build_router, open_employee_store,
    open_mirror_store,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "employee-sync")]
#[command(about = "Employee store of record with a replicated secondary and a document mirror")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the employees table on the relational stores and exit
    Migrate,
    /// Insert sample employees through the regular save path
    Seed,
    /// Run one mirror synchronization pass
    Resync {
        /// Mirror every primary record instead of copying mirror documents
        #[arg(long)]
        reconcile: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load application configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Migrate => migrate(&config).await,
        Command::Seed => seed(&config).await,
        Command::Resync { reconcile } => resync(&config, reconcile).await,
    }
}

struct Stores {
    primary: Arc<EmployeeStore>,
    secondary: Option<Arc<EmployeeStore>>,
    mirror: Arc<MirrorStore>,
}

impl Stores {
    async fn open(config: &AppConfig) -> Result<Self> {
        let primary = open_employee_store(&config.primary_store())
            .await
            .with_context(|| format!("failed to open primary store {}", config.primary))?;

        let secondary = match config.secondary_store() {
            Some(store) => Some(
                open_employee_store(&store)
                    .await
                    .with_context(|| format!("failed to open secondary store {}", store.location))?,
            ),
            None => None,
        };

        let mirror = open_mirror_store(&config.mirror_store())
            .await
            .with_context(|| format!("failed to open mirror store {}", config.mirror))?;

        Ok(Self {
            primary,
            secondary,
            mirror,
        })
    }

    fn into_state(self, config: &AppConfig) -> AppState {
        AppState::from_stores(
            self.primary,
            self.secondary,
            self.mirror,
            config.upsert_strategy,
            config.auto_mirror,
        )
    }
}

async fn serve(config: &AppConfig) -> Result<()> {
    let state = Stores::open(config).await?.into_state(config);
    let app = build_router(state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        address = %addr,
        strategy = %config.upsert_strategy,
        auto_mirror = config.auto_mirror,
        "employee sync started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn migrate(config: &AppConfig) -> Result<()> {
    // opening a relational store applies pending migrations
    open_employee_store(&config.primary_store())
        .await
        .context("failed to migrate primary store")?;

    if let Some(store) = config.secondary_store() {
        open_employee_store(&store)
            .await
            .context("failed to migrate secondary store")?;
    }

    info!("migrations applied");
    Ok(())
}

async fn seed(config: &AppConfig) -> Result<()> {
    let state = Stores::open(config).await?.into_state(config);

    for (name, role) in [("Santiago", "Developer"), ("Camilo", "PO"), ("Jane Smith", "Manager")] {
        let saved = state
            .employees
            .save(Employee::new(name, role))
            .await
            .with_context(|| format!("failed to seed employee {name}"))?;
        info!(id = ?saved.id, name = %saved.name, role = %saved.role, "seeded employee");
    }

    Ok(())
}

async fn resync(config: &AppConfig, reconcile: bool) -> Result<()> {
    let state = Stores::open(config).await?.into_state(config);

    let written = if reconcile {
        state.mirror.reconcile().await
    } else {
        state.mirror.resynchronize().await
    }
    .context("mirror synchronization failed")?;

    info!(written = written.len(), reconcile, "mirror synchronization complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("employee_sync=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
