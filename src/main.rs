use std::path::PathBuf;
use std::process;
use env_logger::Env;
use log::error;

use rasterpatch::commands::{build_cli, CommandFactory, RasterPatchCommandFactory};
use rasterpatch::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else if matches.get_flag("quiet") {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    let log_file = matches.get_one::<String>("log-file")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(rasterpatch::commands::cli::DEFAULT_LOG_FILE));
    let logger = match Logger::new(&log_file) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing run journal {}: {}", log_file.display(), e);
            process::exit(1);
        }
    };

    let factory = RasterPatchCommandFactory::new();

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };
}
