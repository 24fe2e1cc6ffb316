//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `stickyboard_core` linkage and configuration loading.
//! - Open the configured store once so schema problems surface early.
//! - Keep output deterministic for quick local sanity checks.

use std::path::Path;
use std::process::ExitCode;
use stickyboard_core::config::CONFIG_FILE_NAME;
use stickyboard_core::{open_db, start_logging, AppConfig};

fn main() -> ExitCode {
    println!("stickyboard_core ping={}", stickyboard_core::ping());
    println!("stickyboard_core version={}", stickyboard_core::core_version());

    let config = match AppConfig::load(CONFIG_FILE_NAME) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = start_logging(&config.logging) {
        eprintln!("logging error: {err}");
        return ExitCode::FAILURE;
    }

    let db_path = config.database_path(Path::new("."));
    match open_db(&db_path) {
        Ok(_) => {
            println!("store={} status=ok", db_path.display());
            println!(
                "default_audience={}",
                config.ui.default_audience().as_str()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("store={} status=error error={err}", db_path.display());
            ExitCode::FAILURE
        }
    }
}
