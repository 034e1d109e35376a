//! Parses command-line arguments for the dev node.

use std::path::PathBuf;

use clap::{crate_version, Parser};

#[derive(Debug, Parser)]
#[clap(
    name = "paychan-dev",
    about = "Runs two payment channel nodes in one process and pushes funds between them",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[clap(
        long,
        short = 'c',
        help = "The file containing the configuration for the dev node",
        default_value = "config.toml"
    )]
    pub config: PathBuf,

    #[clap(long, short = 'd', help = "Overrides the data directory of the configuration")]
    pub datadir: Option<PathBuf>,

    #[clap(long, short = 'n', help = "Overrides the number of pushes of the configuration")]
    pub num_pushes: Option<u32>,

    #[clap(long, help = "Annotates log lines with their source file and line")]
    pub log_source: bool,
}
