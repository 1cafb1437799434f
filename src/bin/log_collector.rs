//! Standalone log collector.
//!
//! Usage: `log_collector [CONFIG.ini]`. Without a config file the collector
//! listens on `127.0.0.1:8081` and appends to `app.log` in the working
//! directory.

use std::{env, process::ExitCode};

use linecast::{CollectorConfig, LogCollector, load_ini, log_compat};
use log::{LevelFilter, error};

fn main() -> ExitCode {
    if let Err(err) = log_compat::install(LevelFilter::Info) {
        eprintln!("log_collector: {err}");
    }

    let config = match env::args_os().nth(1) {
        Some(path) => match load_ini(&path) {
            Ok(loaded) => loaded.collector,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => CollectorConfig::default(),
    };

    match LogCollector::with_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
