use std::process::ExitCode;

use clap::Parser;

mod app;
mod args;
mod config;
mod logging;
mod quad;
mod render_loop;
mod screenshot;

use app::App;
use args::Args;
use config::Config;
use logging::{init_logging, LoggingConfig};

fn main() -> ExitCode {
    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();

    init_logging(LoggingConfig {
        filter: args.log_level.clone(),
        ..Default::default()
    });

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match App::new(config).and_then(App::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
