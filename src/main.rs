mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod menu;
mod models;
mod routes;
mod store;
mod templates;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::{catalog::CatalogService, config::Config, store::SeaOrmStore};

pub struct AppState {
    pub catalog: CatalogService<SeaOrmStore>,
}

#[derive(Parser, Debug)]
#[command(about = "Browse, search and get recommendations from a movie catalog")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu on stdin/stdout (default).
    Menu,
    /// Serve the web dashboard on HOST:PORT.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinelist=debug,sqlx=warn".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let catalog = CatalogService::new(SeaOrmStore::new(db.clone()), config.fetch_cap);

    let outcome = match args.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = std::io::stdin();
            menu::run(&catalog, stdin.lock(), std::io::stdout()).await
        },
        Command::Serve => serve(&config, catalog).await,
    };

    db.close().await?;
    tracing::debug!("database closed");
    outcome
}

async fn serve(config: &Config, catalog: CatalogService<SeaOrmStore>) -> anyhow::Result<()> {
    let app = routes::router(Arc::new(AppState { catalog }));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
