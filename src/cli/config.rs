// CLI configuration
use clap::{Parser, Subcommand};

use super::OutputFormat;

/// Chunkscope - structural metadata for chunked audio containers
#[derive(Parser, Debug)]
#[command(name = "chunkscope")]
#[command(about = "Inspect the chunk structure of AIFF, ASF, Ogg Vorbis, FLAC and RealMedia files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages and warnings)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (show traversal diagnostics)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read header and tag information from audio file(s)
    Read {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Minimum file size in bytes
        #[arg(long, default_value_t = chunkscope::MINIMUM_SIZE_FOR_VALID_AUDIO_FILE)]
        min_size: u64,

        /// Skip tag contributions, keep only the header and chunk list
        #[arg(long)]
        no_tag: bool,
    },

    /// List every chunk seen during traversal
    Chunks {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,
    },

    /// Detect container format
    Detect {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,
    },

    /// Read every file in a directory matching a pattern
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.aiff", "*.ogg")
        #[arg(short, long)]
        pattern: String,
    },

    /// Show file information
    Info {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,

        /// Show encoding parameters as well
        #[arg(short, long)]
        detailed: bool,
    },
}
