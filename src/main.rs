use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use grabbot::cli::{Cli, Commands};
use grabbot::core::{config::Config, init_logger, log_startup_configuration, metrics_server};
use grabbot::download::YtDlpDownloader;
use grabbot::storage::{ensure_storage_root, Janitor, Sweeper};
use grabbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, RequestHandler};

const MAX_DISPATCHER_RETRIES: u32 = 5;

/// Main entry point for the bot
///
/// Parses CLI arguments and dispatches to the subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::from_env()?;

    // Initialize logger (console + file)
    init_logger(&config.log_file_path)?;

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {}", panic_info);
    }));

    match cli.command() {
        Commands::Run => run_bot(config).await,
        Commands::Sweep { dry_run } => run_sweep(config, *dry_run).await,
    }
}

/// One sweep of the download folder, then exit
async fn run_sweep(config: Config, dry_run: bool) -> Result<()> {
    let janitor_config = config.janitor();
    log::info!(
        "Sweeping {} (retention: {}s, dry run: {})",
        janitor_config.storage_root.display(),
        janitor_config.retention.as_secs(),
        dry_run
    );

    let sweeper = Sweeper::new(&janitor_config).dry_run(dry_run);
    let report = tokio::task::spawn_blocking(move || sweeper.sweep()).await??;

    println!(
        "{} {} file(s), {} bytes ({} scanned, {} failed)",
        if dry_run { "Would delete" } else { "Deleted" },
        report.deleted_count,
        report.freed_bytes,
        report.scanned,
        report.failed
    );
    Ok(())
}

async fn run_bot(config: Config) -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    // Missing token is fatal before anything is started
    let token = config.require_token()?.clone();

    log_startup_configuration(&config);

    ensure_storage_root(&config.storage_root)?;

    let bot = create_bot(&config, &token)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let shutdown = CancellationToken::new();
    let janitor = Janitor::new(&config.janitor()).spawn(shutdown.clone());

    let metrics_task = if config.metrics_enabled {
        let port = config.metrics_port;
        let token = shutdown.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = metrics_server::start_metrics_server(port, token).await {
                log::error!("Metrics server failed: {}", e);
            }
        }))
    } else {
        None
    };

    let downloader = Arc::new(YtDlpDownloader::new(&config));
    let request_handler = Arc::new(RequestHandler::from_config(&config, downloader));
    let handler = schema(HandlerDeps::new(request_handler));

    log::info!("================================================");
    log::info!("🎉 Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    let mut retry_count = 0;
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // A panicking dispatcher surfaces through the JoinHandle
        let handle = tokio::spawn(async move {
            let listener = Polling::builder(bot_clone.clone()).build();

            Dispatcher::builder(bot_clone, handler_clone)
                // No key: every update is handled concurrently, even from the same chat
                .distribution_function(|_| None::<()>)
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() && retry_count < MAX_DISPATCHER_RETRIES => {
                retry_count += 1;
                log::error!(
                    "Dispatcher panicked: {}. Restarting (attempt {}/{})",
                    join_err,
                    retry_count,
                    MAX_DISPATCHER_RETRIES
                );
                sleep(Duration::from_secs(2u64.pow(retry_count))).await;
            }
            Err(join_err) => {
                log::error!("Dispatcher stopped: {}", join_err);
                break;
            }
        }
    }

    log::info!("Shutting down background tasks...");
    shutdown.cancel();
    janitor.shutdown().await;
    if let Some(task) = metrics_task {
        let _ = task.await;
    }

    Ok(())
}
