//! Tiling command

use std::path::PathBuf;
use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::config::{TileCompression, TilingConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline;
use crate::utils::logger::Logger;

/// Reads the tiling options shared by `tile` and `run`
pub fn tiling_config(args: &ArgMatches) -> PipelineResult<TilingConfig> {
    let mut config = TilingConfig::default();
    if let Some(size) = args.get_one::<u32>("tile-size") {
        config.tile_size = *size;
    }
    if let Some(overlap) = args.get_one::<u32>("overlap") {
        config.overlap = *overlap;
    }
    if let Some(name) = args.get_one::<String>("compression") {
        config.compression = TileCompression::parse(name)?;
    }
    config.show_progress = !args.get_flag("quiet");
    config.validate()?;
    Ok(config)
}

pub(crate) fn required_path(args: &ArgMatches, name: &str) -> PipelineResult<PathBuf> {
    args.get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| PipelineError::Configuration(format!("Missing argument <{}>", name)))
}

/// Splits one raster into overlapping tiles
pub struct TileCommand<'a> {
    input: PathBuf,
    output_dir: PathBuf,
    config: TilingConfig,
    logger: &'a Logger,
}

impl<'a> TileCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> PipelineResult<Self> {
        Ok(TileCommand {
            input: required_path(args, "input")?,
            output_dir: required_path(args, "output-dir")?,
            config: tiling_config(args)?,
            logger,
        })
    }
}

impl<'a> Command for TileCommand<'a> {
    fn execute(&self) -> PipelineResult<()> {
        let summary = pipeline::tile_raster(&self.input, &self.output_dir, &self.config, self.logger)?;
        info!("{} tiles written to {} in {:.2}s",
              summary.tiles.len(), summary.tiles_dir.display(), summary.elapsed.as_secs_f64());
        println!("{}", summary.tiles_dir.display());
        Ok(())
    }
}
