//! CLI command implementations
//!
//! Each subcommand is a `Command` built by `RasterPatchCommandFactory` from
//! the parsed arguments.

pub mod command_traits;
pub mod cli;
pub mod tile_command;
pub mod patches_command;
pub mod run_command;

pub use cli::build_cli;
pub use command_traits::{Command, CommandFactory};
pub use patches_command::PatchesCommand;
pub use run_command::RunCommand;
pub use tile_command::TileCommand;

use clap::ArgMatches;
use crate::error::{PipelineError, PipelineResult};
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
#[derive(Debug, Default)]
pub struct RasterPatchCommandFactory;

impl RasterPatchCommandFactory {
    pub fn new() -> Self {
        RasterPatchCommandFactory
    }
}

impl<'a> CommandFactory<'a> for RasterPatchCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> PipelineResult<Box<dyn Command + 'a>> {
        match args.subcommand() {
            Some(("tile", sub)) => Ok(Box::new(TileCommand::new(sub, logger)?)),
            Some(("patches", sub)) => Ok(Box::new(PatchesCommand::new(sub, logger)?)),
            Some(("run", sub)) => Ok(Box::new(RunCommand::new(sub, logger)?)),
            Some((other, _)) => Err(PipelineError::Configuration(format!("Unknown command '{}'", other))),
            None => Err(PipelineError::Configuration("No command given".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_dispatch() {
        let logger = Logger::disabled();
        let factory = RasterPatchCommandFactory::new();

        let matches = build_cli()
            .try_get_matches_from(["rasterpatch", "patches", "tiles", "-o", "out.geojson"])
            .unwrap();
        assert!(factory.create_command(&matches, &logger).is_ok());

        let matches = build_cli()
            .try_get_matches_from(["rasterpatch", "tile", "in.tif", "-d", "out", "--overlap", "5000"])
            .unwrap();
        assert!(factory.create_command(&matches, &logger).is_err());
    }
}
