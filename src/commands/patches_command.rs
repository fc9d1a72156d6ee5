//! Patch extraction command

use std::path::PathBuf;
use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::tile_command::required_path;
use crate::config::{resolve_worker_count, ExtractionConfig, MergeStrategy};
use crate::error::PipelineResult;
use crate::pipeline;
use crate::utils::logger::Logger;
use crate::vector::OutputDriver;

/// Reads the extraction options shared by `patches` and `run`
///
/// The output extension and worker count are checked here so a bad
/// invocation fails before any tile is touched.
pub fn extraction_config(args: &ArgMatches) -> PipelineResult<ExtractionConfig> {
    let workers = args.get_one::<usize>("workers").copied();
    resolve_worker_count(workers, num_cpus::get())?;

    Ok(ExtractionConfig {
        workers,
        zero_as_nodata: args.get_flag("zero-as-nodata"),
        merge_strategy: if args.get_flag("dissolve-all") {
            MergeStrategy::DissolveAll
        } else {
            MergeStrategy::MultiPartOnly
        },
        show_progress: !args.get_flag("quiet"),
    })
}

/// Extracts, merges and writes the patches of a tile directory
pub struct PatchesCommand<'a> {
    tiles_dir: PathBuf,
    output: PathBuf,
    config: ExtractionConfig,
    logger: &'a Logger,
}

impl<'a> PatchesCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> PipelineResult<Self> {
        let output = required_path(args, "output")?;
        OutputDriver::from_path(&output)?;

        Ok(PatchesCommand {
            tiles_dir: required_path(args, "tiles-dir")?,
            output,
            config: extraction_config(args)?,
            logger,
        })
    }
}

impl<'a> Command for PatchesCommand<'a> {
    fn execute(&self) -> PipelineResult<()> {
        info!("Extracting patches from {}", self.tiles_dir.display());
        let summary = pipeline::extract_patches(&self.tiles_dir, &self.output, &self.config, self.logger)?;
        println!("{}", summary);
        Ok(())
    }
}
