use anyhow::Context;
use clap::Parser;
use heic_convert::config::{DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR};
use heic_convert::{BatchConverter, ConfigError, OutputFormat, PageSize, RunConfig};
use shared_utils::{print_summary_report, LogConfig, Quality, RunLog};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::Level;

const PROGRAM_NAME: &str = "heic_convert";
const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "heic-convert")]
#[command(version, about = "Convert a folder of HEIC/HEIF photos to PNG, JPG or PDF", long_about = None)]
struct Cli {
    /// Folder containing the .heic / .heif files (not searched recursively).
    #[arg(short, long, value_name = "FOLDER", default_value = DEFAULT_SOURCE_DIR)]
    source: PathBuf,

    /// Folder that receives the converted files.
    #[arg(short, long, value_name = "FOLDER", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    #[arg(short, long, value_enum, ignore_case = true, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// JPG quality, 1-100. Ignored for PNG and PDF.
    #[arg(short, long, default_value_t = Quality::DEFAULT as i64, allow_negative_numbers = true)]
    quality: i64,

    /// PDF page size. Ignored for PNG and JPG.
    #[arg(long, value_enum, ignore_case = true, default_value_t = PageSize::Letter)]
    page_size: PageSize,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,

    /// Keep existing files in the output folder (same-name outputs are overwritten).
    #[arg(long)]
    no_clear: bool,

    /// Folder for the per-run log files.
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Print the run statistics as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    run(&cli).map(ExitCode::from)
}

fn build_config(cli: &Cli) -> Result<RunConfig, ConfigError> {
    RunConfig::builder(&cli.source, &cli.output)
        .format(cli.format)
        .quality(cli.quality)
        .page_size(cli.page_size)
        .clear_output_first(!cli.no_clear)
        .verbose(cli.verbose)
        .build()
}

/// Returns the process exit code.
fn run(cli: &Cli) -> anyhow::Result<u8> {
    let started = Instant::now();

    // no folder is touched, the log folder included, until the options are valid
    let config = match build_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let log_config = LogConfig::new()
        .with_log_dir(&cli.log_dir)
        .with_level(if cli.verbose { Level::DEBUG } else { Level::INFO });
    let log = RunLog::open(PROGRAM_NAME, &log_config).context("Failed to set up run logging")?;
    let log_path = log.path().map(|p| p.to_path_buf());

    let stats = match BatchConverter::new(config).run(log) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("❌ {}", e);
            if let Some(path) = &log_path {
                eprintln!("   See log: {}", path.display());
            }
            return Ok(EXIT_FAILED);
        }
    };

    let report = stats.to_report(started.elapsed(), log_path);
    if cli.json {
        // keep stdout machine-readable
        eprint!("{}", report.render("HEIC Conversion"));
        eprintln!("{}", report.summary_line());
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialize run statistics")?
        );
    } else {
        print_summary_report(&report, "HEIC Conversion");
    }

    Ok(if stats.all_succeeded() {
        EXIT_OK
    } else {
        EXIT_FAILED
    })
}
