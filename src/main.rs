use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use train::api::{self, AppState};
use train::config::{Cli, Commands, Paths, ServeArgs};
use train::{db, legacy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "train=debug,train_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command() {
        Commands::Serve(args) => serve(&cli.paths, &args).await?,
        Commands::Import => match legacy::import(&cli.paths.db, &cli.paths.legacy_json)? {
            Some(summary) => println!(
                "Imported {} exercises, {} sessions and {} routines into {} (legacy file moved to {})",
                summary.exercises,
                summary.history,
                summary.routines,
                cli.paths.db.display(),
                cli.paths.backup_path().display()
            ),
            None => println!(
                "Nothing to import: {} already exists or {} is missing",
                cli.paths.db.display(),
                cli.paths.legacy_json.display()
            ),
        },
    }

    Ok(())
}

async fn serve(paths: &Paths, args: &ServeArgs) -> anyhow::Result<()> {
    legacy::import(&paths.db, &paths.legacy_json)?;

    let db = db::Database::open(&paths.db)
        .with_context(|| format!("failed to open database {}", paths.db.display()))?;
    db.migrate().context("failed to create schema")?;

    let state = AppState::new(db, &paths.legacy_json, &paths.static_dir);
    let app = api::create_router(state);

    let addr = args.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Train server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
