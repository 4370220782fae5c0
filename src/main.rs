//! regsync - Utility to synchronize container image registries

use anyhow::{bail, Context};
use clap::Parser;
use regsync::cli::{
    Cli, Commands, CompressArgs, ConfigArgs, DecompressArgs, DiffArgs, IsGzipArgs,
    RecompressibleArgs,
};
use regsync::config::Config;
use regsync::delta::{compute_delta, OperationWriter};
use regsync::format::delta_summary;
use regsync::gzip::{self, CompressionLevel, PeekReader};
use regsync::signature::build_signature;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json);

    let config = cli.load_config()?;

    match cli.command {
        Commands::Compress(args) => compress(args, &config),
        Commands::Decompress(args) => decompress(args),
        Commands::IsGzip(args) => is_gzip(args),
        Commands::Recompressible(args) => recompressible(args, &config),
        Commands::Diff(args) => diff(args, &config),
        Commands::Config(args) => handle_config_command(args, &config),
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("regsync=warn"),
        1 => EnvFilter::new("regsync=info"),
        2 => EnvFilter::new("regsync=debug"),
        _ => EnvFilter::new("regsync=trace"),
    };

    // stdout carries data, so logs always go to stderr
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn level_or_config(level: Option<u32>, config: &Config) -> anyhow::Result<CompressionLevel> {
    Ok(match level {
        Some(level) => CompressionLevel::new(level)?,
        None => config.level()?,
    })
}

fn compress(args: CompressArgs, config: &Config) -> anyhow::Result<()> {
    let level = level_or_config(args.level, config)?;
    let output_path = args.output_path();

    let input = open_input(args.input.as_deref())?;
    let output = open_output(output_path.as_deref())?;

    let bytes = gzip::compress(input, output, level)?;
    tracing::info!(bytes, %level, output = ?output_path, "Compressed");
    Ok(())
}

fn decompress(args: DecompressArgs) -> anyhow::Result<()> {
    let output_path = args.output_path();

    let input = open_input(args.input.as_deref())?;
    let output = open_output(output_path.as_deref())?;

    let bytes = gzip::decompress(input, output).map_err(|e| {
        if e.is_corrupt_input() {
            anyhow::Error::new(e).context("input is not a valid gzip stream")
        } else {
            e.into()
        }
    })?;
    tracing::info!(bytes, output = ?output_path, "Decompressed");
    Ok(())
}

fn is_gzip(args: IsGzipArgs) -> anyhow::Result<()> {
    let mut input = PeekReader::new(open_input(args.input.as_deref())?);

    if !gzip::is_gzip(&mut input)? {
        bail!("archive is not gzip");
    }

    match &args.input {
        Some(path) => println!("{}", path.display()),
        None => println!("-"),
    }
    Ok(())
}

fn recompressible(args: RecompressibleArgs, config: &Config) -> anyhow::Result<()> {
    let level = level_or_config(args.level, config)?;
    let input = open_input(args.input.as_deref())?;

    if !gzip::is_transparently_recompressible(input, level)? {
        bail!("archive is NOT recompressible");
    }

    println!("archive is recompressible");
    Ok(())
}

fn diff(args: DiffArgs, config: &Config) -> anyhow::Result<()> {
    let block_size = match args.block_size {
        Some(size) => usize::try_from(size).context("block size does not fit in memory")?,
        None => config.block_size,
    };

    let base = open_input(Some(args.base.as_path()))?;
    let signature = build_signature(base, block_size)?;
    tracing::info!(
        base = %args.base.display(),
        blocks = signature.block_count(),
        digest = %signature.base_digest_hex(),
        "Signature built"
    );

    let target = open_input(Some(args.target.as_path()))?;
    let mut writer = OperationWriter::new(open_output(args.output.as_deref())?);

    let stats = compute_delta(target, &signature, |op| writer.write(&op))?;
    let encoded = writer.bytes_written();
    writer.finish()?;

    tracing::info!(target_file = %args.target.display(), "{}", delta_summary(&stats, encoded));
    Ok(())
}

fn handle_config_command(args: ConfigArgs, config: &Config) -> anyhow::Result<()> {
    if args.path {
        match Config::default_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => eprintln!("Error: {}", e),
        }
    } else if args.init {
        let config = Config::default();
        config.save()?;
        println!(
            "Created default configuration at {}",
            Config::default_config_path()?.display()
        );
    } else {
        // Show current config
        println!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}
