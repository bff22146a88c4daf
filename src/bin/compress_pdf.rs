use clap::{Parser, ValueEnum};
use env_logger::Env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pdf_compressor_core::domains::compression::{
    format_megabytes, output_filename, CompressionConfig, CompressionJob, CompressionRequest, QualityLevel,
};

#[derive(Parser, Debug)]
#[command(name = "compress_pdf")]
#[command(author, version, about = "Compress a PDF with Ghostscript presets")]
struct Args {
    /// Input PDF file path
    #[arg(required_unless_present = "check")]
    input: Option<PathBuf>,

    /// Output PDF file path (defaults to compressed_<name> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compression level
    #[arg(short, long, value_enum, default_value = "medium")]
    quality: Quality,

    /// Ghostscript binary (overrides GHOSTSCRIPT_PATH)
    #[arg(long)]
    gs: Option<String>,

    /// Kill the tool after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Only check that Ghostscript can be launched
    #[arg(long)]
    check: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Quality {
    /// No compression, original quality
    None,
    /// Maximum compression and smaller size
    High,
    /// A balance between quality and size
    Medium,
    /// Minimal compression and higher quality
    Low,
}

impl From<Quality> for QualityLevel {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::None => QualityLevel::NoCompression,
            Quality::High => QualityLevel::High,
            Quality::Medium => QualityLevel::Medium,
            Quality::Low => QualityLevel::Low,
        }
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let name = output_filename(&input.to_string_lossy());
    input.with_file_name(name)
}

fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // -v only sets the default; RUST_LOG still wins when present.
    env_logger::Builder::from_env(Env::default().default_filter_or(default_log_filter(args.verbose))).init();

    let mut config = CompressionConfig::from_env();
    if let Some(gs) = args.gs.clone() {
        config.ghostscript_path = gs;
    }
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
    }

    let job = CompressionJob::with_ghostscript(config);

    if args.check {
        return match job.compressor().probe().await {
            Ok(version) => {
                println!("✅ {} {}", job.config().ghostscript_path, version);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let input = match args.input {
        Some(path) => path,
        None => return Ok(ExitCode::FAILURE),
    };

    let data = tokio::fs::read(&input)
        .await
        .map_err(|e| format!("Failed to read input file {}: {}", input.display(), e))?;
    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let quality = QualityLevel::from(args.quality);

    println!("📄 Original File Name: {}", filename);
    println!("📦 Original Size: {}", format_megabytes(data.len() as u64));

    let mut result = job.run(CompressionRequest::new(data, quality, filename)).await;

    if result.is_skipped() {
        println!("⚠️  You selected '{}'. Please select a level to compress.", quality.label());
        return Ok(ExitCode::from(2));
    }

    let output = match result.take_output() {
        Some(bytes) => bytes,
        None => {
            eprintln!("❌ Compression failed: {}", result.summary());
            return Ok(ExitCode::FAILURE);
        }
    };

    let output_path = args.output.unwrap_or_else(|| default_output_path(&input));
    tokio::fs::write(&output_path, &output)
        .await
        .map_err(|e| format!("Failed to write output file {}: {}", output_path.display(), e))?;

    println!("✅ {}", result.summary());
    println!("📦 New Size: {}", format_megabytes(result.compressed_size));
    println!("💾 Wrote {}", output_path.display());

    Ok(ExitCode::SUCCESS)
}
