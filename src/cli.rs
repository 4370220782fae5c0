//! CLI argument parsing for regsync

use crate::config::Config;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// regsync - Utility to synchronize container image registries
#[derive(Parser, Debug)]
#[command(name = "regsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file path
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a file with gzip (stdin to stdout without arguments)
    Compress(CompressArgs),

    /// Decompress a gzip file (stdin to stdout without arguments)
    Decompress(DecompressArgs),

    /// Exit with 0 if the input is gzipped
    #[command(name = "isgzip")]
    IsGzip(IsGzipArgs),

    /// Decompress and recompress; exit with 0 if recompression was transparent
    Recompressible(RecompressibleArgs),

    /// Create a delta between two files with the rsync algorithm
    Diff(DiffArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the compress command
#[derive(Parser, Debug)]
pub struct CompressArgs {
    /// Input file [default: stdin]
    pub input: Option<PathBuf>,

    /// Output file [default: <input>.gz, or stdout when reading stdin]
    pub output: Option<PathBuf>,

    /// Compression level (0-9) [default: from config]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: Option<u32>,
}

impl CompressArgs {
    /// Where compressed output goes; `None` means stdout
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(self.output.clone().unwrap_or_else(|| {
            let mut name = input.clone().into_os_string();
            name.push(".gz");
            PathBuf::from(name)
        }))
    }
}

/// Arguments for the decompress command
#[derive(Parser, Debug)]
pub struct DecompressArgs {
    /// Input file [default: stdin]
    pub input: Option<PathBuf>,

    /// Output file [default: <input> without .gz, or stdout when reading stdin]
    pub output: Option<PathBuf>,
}

impl DecompressArgs {
    /// Where decompressed output goes; `None` means stdout
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        if let Some(output) = &self.output {
            return Some(output.clone());
        }

        let name = input.to_string_lossy();
        Some(match name.strip_suffix(".gz") {
            Some(stem) => PathBuf::from(stem),
            None => PathBuf::from(format!("{}-decompressed", name)),
        })
    }
}

/// Arguments for the isgzip command
#[derive(Parser, Debug)]
pub struct IsGzipArgs {
    /// Input file [default: stdin]
    pub input: Option<PathBuf>,
}

/// Arguments for the recompressible command
#[derive(Parser, Debug)]
pub struct RecompressibleArgs {
    /// Input file [default: stdin]
    pub input: Option<PathBuf>,

    /// Compression level to recompress with (0-9) [default: from config]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: Option<u32>,
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Base (old) file
    pub base: PathBuf,

    /// Target (new) file
    pub target: PathBuf,

    /// Delta output file [default: stdout]
    pub output: Option<PathBuf>,

    /// Block size in bytes [default: from config]
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=64 * 1024 * 1024))]
    pub block_size: Option<u64>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show the configuration file path
    #[arg(long)]
    pub path: bool,

    /// Create default configuration file
    #[arg(long)]
    pub init: bool,
}

impl Cli {
    /// Load the config file named on the command line, or the default one
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Ok(Config::load().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unreadable config file");
                Config::default()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compress_output_names() {
        let cli = Cli::parse_from(["regsync", "compress", "layer.tar"]);
        let Commands::Compress(args) = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(args.output_path(), Some(PathBuf::from("layer.tar.gz")));

        let cli = Cli::parse_from(["regsync", "compress", "layer.tar", "out.gz", "-l", "9"]);
        let Commands::Compress(args) = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(args.output_path(), Some(PathBuf::from("out.gz")));
        assert_eq!(args.level, Some(9));

        let cli = Cli::parse_from(["regsync", "compress"]);
        let Commands::Compress(args) = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(args.output_path(), None);
    }

    #[test]
    fn test_decompress_output_names() {
        let args = DecompressArgs {
            input: Some(PathBuf::from("layer.tar.gz")),
            output: None,
        };
        assert_eq!(args.output_path(), Some(PathBuf::from("layer.tar")));

        let args = DecompressArgs {
            input: Some(PathBuf::from("blob")),
            output: None,
        };
        assert_eq!(args.output_path(), Some(PathBuf::from("blob-decompressed")));

        let args = DecompressArgs {
            input: None,
            output: None,
        };
        assert_eq!(args.output_path(), None);
    }

    #[test]
    fn test_diff_requires_two_files() {
        assert!(Cli::try_parse_from(["regsync", "diff", "old"]).is_err());

        let cli = Cli::parse_from(["regsync", "diff", "old", "new", "--block-size", "512"]);
        let Commands::Diff(args) = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(args.block_size, Some(512));
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_level_out_of_range() {
        assert!(Cli::try_parse_from(["regsync", "recompressible", "-l", "10"]).is_err());
    }

    #[test]
    fn test_isgzip_name() {
        let cli = Cli::parse_from(["regsync", "isgzip", "blob"]);
        assert!(matches!(cli.command, Commands::IsGzip(_)));
    }
}
