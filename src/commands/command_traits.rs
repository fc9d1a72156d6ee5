//! Command pattern interfaces
//!
//! Each CLI subcommand is parsed into a command object up front, so argument
//! errors surface before any work starts.

use crate::error::PipelineResult;
use crate::utils::logger::Logger;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    fn execute(&self) -> PipelineResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory<'a> {
    /// Create the command selected by the parsed arguments
    ///
    /// # Arguments
    /// * `args` - Top-level argument matches from clap
    /// * `logger` - Run journal shared with the command
    fn create_command(&self, args: &clap::ArgMatches, logger: &'a Logger) -> PipelineResult<Box<dyn Command + 'a>>;
}
