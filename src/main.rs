use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use env_logger::{Builder, Env};
use splitcheck::{AnalysisOptions, DEFAULT_REPORT_FILE, DatasetAnalyzer};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "splitcheck",
    version,
    about = "Find duplicate images and labels across train/val/test splits"
)]
struct Cli {
    /// Dataset root containing train/, val/ and test/
    #[arg(value_name = "DIR", default_value = ".")]
    path: PathBuf,

    /// Where to write the JSON report
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_REPORT_FILE)]
    output: PathBuf,

    /// Worker threads for hashing (default: one per core)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Hide progress bars
    #[arg(long)]
    no_progress: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

fn init_logging(cli: &Cli) {
    // Without -v/-q an explicit RUST_LOG wins.
    let use_env = cli.verbose == 0 && !cli.quiet && std::env::var_os("RUST_LOG").is_some();

    let mut logger = if use_env {
        Builder::from_env(Env::default())
    } else {
        let mut b = Builder::new();
        b.filter_level(cli.log_level());
        b
    };
    logger.format_timestamp(None).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    if !cli.path.is_dir() {
        log::warn!(
            "{} is not a directory; the report will be empty",
            cli.path.display()
        );
    }

    println!("▶ Analyzing dataset in: {}", cli.path.display());

    let analyzer = DatasetAnalyzer::new(AnalysisOptions {
        jobs: cli.jobs,
        progress: !cli.no_progress,
    })
    .context("Failed to set up analyzer")?;

    let report = benchmark("dataset analysis", || analyzer.analyze(&cli.path));

    report
        .save(&cli.output)
        .with_context(|| format!("Failed to write report {:?}", cli.output))?;

    let stdout = io::stdout();
    report.write_summary(&mut stdout.lock())?;

    println!(
        "\nDetailed report saved to '{}'",
        cli.output.display()
    );

    Ok(())
}

/// Run `f()`, print how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    println!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
