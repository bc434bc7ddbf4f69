//! Riser control plane - Entry Point
//!
//! Serves rollout and status APIs backed by the desired-state git repository.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use riserd::app::run::run;
use riserd::app::settings::Settings;
use riserd::errors::ServerError;
use riserd::filesys::file::File;
use riserd::logs::{init_logging, LogOptions};
use riserd::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let mut cli_args: HashMap<String, String> = HashMap::new();
    for arg in env::args().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            cli_args.insert(key.trim_start_matches('-').to_string(), value.to_string());
        } else if arg.starts_with("--") {
            cli_args.insert(arg.trim_start_matches('-').to_string(), "true".to_string());
        }
    }

    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return ExitCode::SUCCESS;
    }

    let settings = match load_settings(cli_args.get("config")).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_options = LogOptions {
        log_level: settings.log_level,
        json_format: settings.json_logs,
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let repo_settings = match settings.repo_settings() {
        Ok(repo_settings) => repo_settings,
        Err(e) => {
            error!("Invalid git settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = settings.app_options();

    info!("Running riserd {} with options: {:?}", version.version, options);
    if let Err(e) = run(repo_settings, options, await_shutdown_signal()).await {
        error!("Control plane failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn load_settings(config_path: Option<&String>) -> Result<Settings, ServerError> {
    let settings = match config_path {
        Some(path) => File::new(path).read_json::<Settings>().await?,
        None => Settings::default(),
    };
    settings.with_env_overrides()
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}
