//! Command-line definition

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Default path of the run journal
pub const DEFAULT_LOG_FILE: &str = "rasterpatch.log";

fn tiling_args(command: ClapCommand) -> ClapCommand {
    command
        .arg(
            Arg::new("input")
                .help("Input single-band GeoTIFF")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output-dir")
                .short('d')
                .long("output-dir")
                .help("Directory receiving the tiles/ subdirectory")
                .value_name("DIR")
                .required(true),
        )
        .arg(
            Arg::new("tile-size")
                .long("tile-size")
                .help("Tile edge length in pixels")
                .value_name("PIXELS")
                .value_parser(value_parser!(u32))
                .default_value("2000"),
        )
        .arg(
            Arg::new("overlap")
                .long("overlap")
                .help("Overlap between neighbouring tiles in pixels")
                .value_name("PIXELS")
                .value_parser(value_parser!(u32))
                .default_value("20"),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Compression of the written tiles")
                .value_name("NAME")
                .value_parser(["none", "deflate", "zstd"])
                .default_value("deflate"),
        )
}

fn extraction_args(command: ClapCommand) -> ClapCommand {
    command
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output vector file (.geojson, .shp or .gpkg)")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .help("Number of extraction workers (default: cores - 2, at most 10)")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("zero-as-nodata")
                .long("zero-as-nodata")
                .help("Treat zero-valued pixels as background")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dissolve-all")
                .long("dissolve-all")
                .help("Union every patch, not only the multi-part ones")
                .action(ArgAction::SetTrue),
        )
}

/// Builds the `rasterpatch` argument parser
pub fn build_cli() -> ClapCommand {
    let tile = tiling_args(
        ClapCommand::new("tile").about("Split a GeoTIFF into overlapping tiles"),
    );

    let patches = extraction_args(
        ClapCommand::new("patches")
            .about("Extract, merge and write patch polygons from a tile directory")
            .arg(
                Arg::new("tiles-dir")
                    .help("Directory containing the GeoTIFF tiles")
                    .required(true)
                    .index(1),
            ),
    );

    let run = extraction_args(tiling_args(
        ClapCommand::new("run").about("Tile a GeoTIFF and extract its patches in one go"),
    ));

    ClapCommand::new("rasterpatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tile large GeoTIFFs and vectorise their connected patches")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug output")
                .action(ArgAction::SetTrue)
                .global(true)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only report warnings and errors, no progress bars")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Path of the run journal")
                .value_name("FILE")
                .default_value(DEFAULT_LOG_FILE)
                .global(true),
        )
        .subcommand(tile)
        .subcommand(patches)
        .subcommand(run)
}
