// cli.rs - Command-line interface configuration
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "space-occupancy")]
#[command(about = "Space labels and occupancy point sampling for glTF building models", long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the screen labels of every space for one frame
    Labels {
        scene: PathBuf,

        /// Viewport width in pixels
        #[arg(long)]
        width: Option<f64>,

        /// Viewport height in pixels
        #[arg(long)]
        height: Option<f64>,
    },
    /// Print random points inside an occupancy boundary's convex hull
    Sample {
        scene: PathBuf,

        /// Index of the boundary in document order
        #[arg(long, default_value_t = 0)]
        boundary: usize,

        #[arg(long, default_value_t = 100)]
        count: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Test points against the boundary's own closed mesh instead of its convex hull
        #[arg(long)]
        mesh: bool,
    },
}
