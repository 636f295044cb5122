use clap::Parser;
use std::path::PathBuf;

use polarpro::FillPolicy;

#[derive(Parser)]
#[command(name = "polarpro", version, about = "POLARPRO CLI")]
pub struct CliArgs {
    /// Input capture file (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing .pol captures (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output PNG filename (single file mode, default Output/<basename>.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Rotate so that azimuth 0 points up
    #[arg(long, default_value_t = false)]
    pub orient: bool,

    /// Sweep azimuths clockwise
    #[arg(long, default_value_t = false)]
    pub toggle_direction: bool,

    /// How to fill the Cartesian raster (scatter or nearest)
    #[arg(long, value_enum)]
    pub fill: Option<FillPolicy>,

    /// Distance covered by one output pixel, in header range units
    #[arg(long)]
    pub pixel_size: Option<f64>,

    /// Extra clockwise rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub rotation: Option<f64>,

    /// Draw the blind zone hidden by the sampling delay (SDRNG/SFREQ) before range bin 0
    #[arg(long, default_value_t = false)]
    pub blind_range: bool,

    /// Rotate by the heading stored in the header (BO2RA)
    #[arg(long, default_value_t = false)]
    pub heading: bool,

    /// JSON file with render parameters; flags given on the command line win
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// JSON attribute directory replacing the built-in descriptions
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Also write <output>.json with the header and descriptions
    #[arg(long, default_value_t = false)]
    pub sidecar: bool,

    /// Print the header of --input grouped by category and exit
    #[arg(long, default_value_t = false)]
    pub inspect: bool,

    /// Batch mode: keep going after a capture fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
