use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use alpha_premultiply::{
    compare_encoded, is_supported_source, ArchivePackager, BatchPipeline, BatchSession,
    ConversionJob, DirectoryPackager, PipelineOptions, PngCodec, TargetVariant, Verdict,
};

#[derive(Parser)]
#[command(
    name = "premult",
    about = "Premultiply alpha in PNG images for video switchers",
    version
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert PNG files (or directories of PNGs) to premultiplied artifacts
    Convert(ConvertArgs),
    /// Compare two images on a sampled pixel grid
    Compare(CompareArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Input PNG files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Worker threads (default: one per CPU)
    #[arg(long)]
    threads: Option<NonZeroUsize>,
}

#[derive(Args)]
struct CompareArgs {
    /// First image (usually the generated artifact)
    a: PathBuf,

    /// Second image (usually the reference)
    b: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Premultiplied PNG, `<name>_premult.png`
    Png,
    /// Uncompressed 32-bit TGA, `<name>.tga`
    Tga,
}

impl From<Format> for TargetVariant {
    fn from(f: Format) -> Self {
        match f {
            Format::Png => TargetVariant::StandardPremultiplied,
            Format::Tga => TargetVariant::RawContainer,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let ok = match cli.cmd {
        Command::Convert(args) => convert(&args, cli.quiet),
        Command::Compare(args) => compare(&args, cli.quiet),
    };
    if !ok {
        process::exit(1);
    }
}

/// Expand directories into their supported files, keeping argument order.
fn collect_sources(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            sources.push(input.clone());
            continue;
        }
        match std::fs::read_dir(input) {
            Ok(rd) => {
                let mut found: Vec<PathBuf> = rd
                    .filter_map(std::result::Result::ok)
                    .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                    .map(|e| e.path())
                    .filter(|p| is_supported_source(p))
                    .collect();
                found.sort();
                sources.extend(found);
            }
            Err(e) => eprintln!("[FAIL] {}: Failed to read directory: {e}", input.display()),
        }
    }
    sources
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

fn convert(args: &ConvertArgs, quiet: bool) -> bool {
    let opts = PipelineOptions {
        threads: args.threads,
    };
    let pipeline = match BatchPipeline::new(PngCodec, opts) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Fatal: {e}");
            return false;
        }
    };

    let variant = TargetVariant::from(args.format);
    let mut session = BatchSession::new();
    let mut read_failures = 0u32;
    for path in collect_sources(&args.inputs) {
        if !is_supported_source(&path) {
            eprintln!("[FAIL] {}: not a .png file", path.display());
            read_failures += 1;
            continue;
        }
        match std::fs::read(&path) {
            Ok(bytes) => session.add(file_name(&path), bytes, variant),
            Err(e) => {
                eprintln!("[FAIL] {}: Failed to read: {e}", path.display());
                read_failures += 1;
            }
        }
    }

    let summary = session.run(&pipeline);

    let artifacts: Vec<_> = session.artifacts().collect();
    let mut write_failed = false;
    if let Err(e) = DirectoryPackager::new(&args.output).package(&artifacts) {
        eprintln!("[FAIL] {}: Failed to write output: {e}", args.output.display());
        write_failed = true;
    }

    for job in session.jobs() {
        print_job(job, write_failed, quiet);
    }

    if summary.total() > 1 && !quiet {
        eprintln!();
        eprint!("[Summary] Converted: {}", summary.succeeded);
        if summary.failed > 0 {
            eprint!(", Failed: {}", summary.failed);
        }
        eprintln!(" (Total: {})", summary.total());
    }

    summary.failed == 0 && read_failures == 0 && !write_failed
}

fn print_job(job: &ConversionJob, write_failed: bool, quiet: bool) {
    match job_status(job, write_failed) {
        Some(Ok(line)) if !quiet => eprintln!("{line}"),
        Some(Err(line)) => eprintln!("{line}"),
        _ => {}
    }
}

/// Status line for a settled job: `Ok` for a written artifact, `Err` otherwise.
fn job_status(job: &ConversionJob, write_failed: bool) -> Option<Result<String, String>> {
    if let Some(artifact) = job.artifact() {
        let (src, out) = (job.source_name(), &artifact.filename);
        Some(if write_failed {
            Err(format!("[FAIL] {src} -> {out}: not written"))
        } else {
            Ok(format!("[OK] {src} -> {out}"))
        })
    } else {
        job.failure()
            .map(|e| Err(format!("[FAIL] {} ({:?}): {e}", job.source_name(), e.kind())))
    }
}

fn compare(args: &CompareArgs, quiet: bool) -> bool {
    let read = |p: &Path| match std::fs::read(p) {
        Ok(b) => Some(b),
        Err(e) => {
            eprintln!("Error: cannot read {}: {e}", p.display());
            None
        }
    };
    let (Some(a), Some(b)) = (read(args.a.as_path()), read(args.b.as_path())) else {
        return false;
    };

    let report = compare_encoded(&PngCodec, &a, &b);
    match &report.verdict {
        Verdict::Match => {
            if !quiet {
                eprintln!("[MATCH] {} sampled pixels identical", report.checked_count);
            }
        }
        Verdict::ContentMismatch => {
            eprintln!(
                "[DIFF] {} of {} sampled pixels differ",
                report.mismatch_count, report.checked_count
            );
            if !quiet {
                for m in &report.mismatches {
                    eprintln!("  ({}, {}): {:?} vs {:?}", m.x, m.y, m.pixel_a, m.pixel_b);
                }
                if report.mismatch_count as usize > report.mismatches.len() {
                    eprintln!(
                        "  ... and {} more",
                        report.mismatch_count as usize - report.mismatches.len()
                    );
                }
            }
        }
        Verdict::DimensionMismatch { a, b } => {
            eprintln!("[DIFF] dimensions differ: {}x{} vs {}x{}", a.0, a.1, b.0, b.1);
        }
        Verdict::DecodeFailure { side, message } => {
            eprintln!("[FAIL] cannot decode image {side:?}: {message}");
        }
    }
    report.is_match()
}
