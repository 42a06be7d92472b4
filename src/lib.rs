pub mod core;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;
use crate::core::downloader::Downloader;
use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::http::build_http_client;
use crate::core::run::{Orchestrator, RunSummary};
use crate::core::state::settings::{log_dir, DEFAULT_LOG_LEVEL};
use crate::core::state::{Settings, SettingsFile};
use crate::core::ui::ConsoleUi;

const LOG_FILE: &str = "updater.log";

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let ui = ConsoleUi::new(cli.assume());

    let file = SettingsFile::load(cli.config.as_deref());
    let level = match (&file, cli.verbose) {
        (_, true) => "debug",
        (Ok(file), false) => file.log_level(),
        (Err(_), false) => DEFAULT_LOG_LEVEL,
    };
    let _guard = init_logging(level);

    tracing::info!("Minecraft Updater {} starting", env!("CARGO_PKG_VERSION"));
    ui.header(&format!("Minecraft Updater v{}", env!("CARGO_PKG_VERSION")));
    ui.blank();

    let result = file
        .and_then(|file| Settings::resolve(file, cli.overrides()))
        .and_then(|settings| execute(&settings, &ui));

    let code = match result {
        Ok(summary) => {
            let errors: usize = summary.reports.iter().map(|r| r.errored()).sum();
            if errors > 0 {
                ui.alert(&format!("Finished with {errors} errors, run again to retry."));
            } else if !summary.stopped_on_mismatch {
                ui.highlight("Everything is up to date.");
            }
            if summary.stopped_on_mismatch {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!("Update failed: {}", e);
            ui.fatal(&e);
            ExitCode::FAILURE
        }
    };

    if !cli.no_pause {
        ui.pause();
    }
    code
}

fn execute(settings: &Settings, ui: &ConsoleUi) -> UpdaterResult<RunSummary> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| UpdaterError::Other(format!("cannot start the async runtime: {e}")))?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current step");
                on_signal.cancel();
            }
        });

        let downloader = Downloader::new(build_http_client()?);
        Orchestrator::new(settings, downloader, ui, cancel).run().await
    })
}

/// stderr plus a daily rolling file. `RUST_LOG` wins over `level`.
/// The returned guard flushes the file writer when dropped.
fn init_logging(level: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,updater_lib={level}")));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let dir = log_dir();
    let (file_layer, guard) = match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}
