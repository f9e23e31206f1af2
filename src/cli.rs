use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_WINDOW_SIZE: usize = 4096;
pub const DEFAULT_SMOOTHING: f32 = 0.925;
pub const DEFAULT_RESOLUTION: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "beatline", about = "Turns a song into a beat-synced 3D track")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Output JSON report
    #[arg(short, long, default_value = "track.json")]
    pub output: PathBuf,

    /// Config file (defaults to beatline.toml or ~/.config/beatline/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analysis window size in samples (power of two)
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window_size: usize,

    /// Slope smoothing factor (0.0-1.0, exclusive)
    #[arg(long, default_value_t = DEFAULT_SMOOTHING)]
    pub smoothing: f32,

    /// Quads in the track mesh
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    pub resolution: usize,

    /// Playback frames to sample evenly over the song and include in the report
    #[arg(long, default_value_t = 0)]
    pub frames: usize,

    /// Raw mesh dump: two little-endian u32 counts, then vertices and indices
    #[arg(long)]
    pub mesh_out: Option<PathBuf>,
}
