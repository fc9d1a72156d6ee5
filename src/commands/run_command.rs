//! Both stages in one invocation

use std::path::PathBuf;
use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::patches_command::extraction_config;
use crate::commands::tile_command::{required_path, tiling_config};
use crate::config::{ExtractionConfig, TilingConfig};
use crate::error::PipelineResult;
use crate::pipeline;
use crate::utils::logger::Logger;
use crate::vector::OutputDriver;

/// Tiles a raster, then extracts and writes its patches
pub struct RunCommand<'a> {
    input: PathBuf,
    output_dir: PathBuf,
    output: PathBuf,
    tiling: TilingConfig,
    extraction: ExtractionConfig,
    logger: &'a Logger,
}

impl<'a> RunCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> PipelineResult<Self> {
        let output = required_path(args, "output")?;
        OutputDriver::from_path(&output)?;

        Ok(RunCommand {
            input: required_path(args, "input")?,
            output_dir: required_path(args, "output-dir")?,
            output,
            tiling: tiling_config(args)?,
            extraction: extraction_config(args)?,
            logger,
        })
    }
}

impl<'a> Command for RunCommand<'a> {
    fn execute(&self) -> PipelineResult<()> {
        let tiling = pipeline::tile_raster(&self.input, &self.output_dir, &self.tiling, self.logger)?;
        info!("Stage 1 done: {} tiles in {:.2}s", tiling.tiles.len(), tiling.elapsed.as_secs_f64());

        let summary = pipeline::extract_patches(&tiling.tiles_dir, &self.output, &self.extraction, self.logger)?;
        println!("{}", summary);
        Ok(())
    }
}
