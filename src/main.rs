use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nedkit::config::{CliArgs, HarnessConfig};
use nedkit::recorder::{self, ResultRecorder};
use nedkit::{DifferentialHarness, HarnessSummary, NativeEngine, ReferenceOracle};

fn main() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();

    // Init tracing; stdout may carry records, so logs go to stderr
    let filter = if args.verbose {
        EnvFilter::new("nedkit=debug")
    } else {
        EnvFilter::new("nedkit=info")
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config: HarnessConfig = args.into();

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    let summary = match &config.replay {
        Some(path) => {
            info!(records = %path.display(), "Summarizing recorded trials");
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let records = recorder::read_records(BufReader::new(file))
                .with_context(|| format!("Failed to read records from {}", path.display()))?;
            HarnessSummary::from_records(&records)
        }
        None => run_harness(&config)?,
    };

    if let Some(path) = &config.summary {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }

    for (kind, stats) in &summary.kinds {
        eprintln!(
            "{kind:<15} trials {:>7}  failures {:>6}  max error {:.3e}",
            stats.trials, stats.failures, stats.max_error
        );
    }

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_harness(config: &HarnessConfig) -> anyhow::Result<HarnessSummary> {
    let oracle = ReferenceOracle::new();
    let harness = DifferentialHarness::new(config.clone(), &NativeEngine, &oracle);

    let result = match &config.output {
        Some(path) => {
            let mut recorder = ResultRecorder::create(path)?;
            harness.run(&mut recorder)
        }
        None => {
            let mut recorder = ResultRecorder::new(io::stdout().lock());
            harness.run(&mut recorder)
        }
    };

    result.map_err(|e| {
        error!(%e, "Differential run failed");
        anyhow::anyhow!(e)
    })
    .context("nedkit differential run failed")
}
