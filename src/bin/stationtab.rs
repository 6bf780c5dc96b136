//! CLI binary for stationtab.
//!
//! A thin shim over the library crate that maps CLI flags to an
//! `ExtractionConfig` preset and prints or writes the resulting CSV.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use stationtab::{
    extract, extract_to_file, inspect, presets, ExtractionConfigBuilder, PageSelection,
    ProgressCallback, ScanProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single bar that advances as pages are
/// scanned, with per-page match counts in the message line.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set by
    /// `on_scan_start` (called before any pages are scanned).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Scanning");
    }
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_scan_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_scanned(&self, page_num: usize, _total: usize, lines_matched: usize) {
        self.bar
            .set_message(format!("page {page_num}: {lines_matched} stations"));
        self.bar.inc(1);
    }

    fn on_page_empty(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}: empty"));
        self.bar.inc(1);
    }

    fn on_scan_complete(&self, total_pages: usize, stations_matched: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} scanned {} pages, matched {} stations",
            green("✔"),
            bold(&total_pages.to_string()),
            bold(&stations_matched.to_string()),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Seasonal temperature means to stdout
  stationtab --doc-type temperature normals_2017.pdf

  # Rainfall normals to a CSV file
  stationtab --doc-type rainfall normals_2017.pdf -o rainfall.csv

  # Boro-season temperature spanning two calendar years
  stationtab --doc-type boro-temperature --first-year 2016 --second-year 2017 \
      boro_2016_17.pdf -o boro_temp.csv

  # Crop-yield tables, pages 1-18 are the default for this type
  stationtab --doc-type crop yield_report.pdf -o yield.csv

  # Extract from a URL
  stationtab --doc-type humidity https://example.org/normals.pdf -o rh.csv

  # Structured JSON (table + metadata + scan statistics)
  stationtab --doc-type rainfall --json normals_2017.pdf > run.json

  # Inspect PDF metadata only
  stationtab --inspect-only normals_2017.pdf

DOCUMENT TYPES:
  temperature        Monthly mean temperature normals (March-December)
  humidity           Monthly mean relative humidity (March-December)
  rainfall           Monthly total rainfall (March-December)
  boro-temperature   Two-page boro-season temperature (Nov-June)
  boro-rainfall      Two-page boro-season rainfall (Nov-June)
  crop               Crop-yield tables filtered by region name

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH    Path to an existing libpdfium shared library
  RUST_LOG           Tracing filter, overrides -v / -q
"#;

/// Extract station-indexed data tables from PDF reports to CSV.
#[derive(Parser, Debug)]
#[command(
    name = "stationtab",
    version,
    about = "Extract station-indexed data tables from PDF reports to CSV",
    long_about = "Extract weather-station and crop-region tables from PDF reports (local \
files or URLs) into deterministic CSV datasets. Every station of the chosen document \
type's registry gets exactly one output row, in a fixed canonical order, with missing \
observations kept as empty fields.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Document type to extract.
    #[arg(short = 't', long, value_enum, default_value = "temperature")]
    doc_type: DocType,

    /// Write CSV to this file instead of stdout.
    #[arg(short, long, env = "STATIONTAB_OUTPUT")]
    output: Option<PathBuf>,

    /// First calendar year of a boro season (November-December page).
    #[arg(long, default_value_t = 2016)]
    first_year: u16,

    /// Second calendar year of a boro season (January-June page).
    #[arg(long, default_value_t = 2017)]
    second_year: u16,

    /// Page selection override: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "STATIONTAB_PAGES")]
    pages: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "STATIONTAB_PASSWORD")]
    password: Option<String>,

    /// Output structured JSON (table + metadata + stats) instead of CSV.
    #[arg(long, env = "STATIONTAB_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "STATIONTAB_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "STATIONTAB_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "STATIONTAB_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "STATIONTAB_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum DocType {
    Temperature,
    Humidity,
    Rainfall,
    BoroTemperature,
    BoroRainfall,
    Crop,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides the feedback that matters. Verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta =
            inspect(&cli.input, cli.password.as_deref()).context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ScanProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = extract_to_file(&cli.input, output_path, &config)
            .context("Extraction failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} stations  {}ms  →  {}",
                if stats.stations_missing == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.stations_matched,
                config.registry.len(),
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
            if stats.values_missing > 0 {
                eprintln!(
                    "   {} missing values across {} matched lines",
                    dim(&stats.values_missing.to_string()),
                    dim(&stats.lines_matched.to_string()),
                );
            }
        }
    } else {
        let output = extract(&cli.input, &config).context("Extraction failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            stationtab::pipeline::write::write_csv_to(&output.table, &config, &mut handle)
                .context("Failed to write to stdout")?;
            handle.flush().ok();
        }

        if !cli.quiet && !show_progress && !cli.json {
            eprintln!(
                "Matched {}/{} stations across {} pages in {}ms",
                output.stats.stations_matched,
                config.registry.len(),
                output.stats.pages_scanned,
                output.stats.total_duration_ms
            );
        }
    }

    Ok(())
}

/// Map CLI args to an `ExtractionConfig` via the preset builders.
fn build_config(
    cli: &Cli,
    progress: Option<ProgressCallback>,
) -> Result<stationtab::ExtractionConfig> {
    let mut builder: ExtractionConfigBuilder = match cli.doc_type {
        DocType::Temperature => presets::monthly_temperature(),
        DocType::Humidity => presets::monthly_humidity(),
        DocType::Rainfall => presets::monthly_rainfall(),
        DocType::BoroTemperature => presets::boro_temperature(cli.first_year, cli.second_year),
        DocType::BoroRainfall => presets::boro_rainfall(cli.first_year, cli.second_year),
        DocType::Crop => presets::crop_yield(),
    };

    if let Some(ref pages) = cli.pages {
        builder = builder.pages(parse_pages(pages)?);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder = builder.download_timeout_secs(cli.download_timeout);

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!("Invalid page range '{}-{}': start must be <= end", start, end);
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        for &p in &pages {
            if p < 1 {
                anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
            }
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
