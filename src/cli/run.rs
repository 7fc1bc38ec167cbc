//! Handler for the `run` command.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::info;

use crate::adapter::metrics::JsonLinesSink;
use crate::adapter::workload::FileWorkload;
use crate::cli::{output, summary, Cli, RunArgs};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;

/// Execute the run command.
pub fn execute(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    config.logging = config
        .logging
        .with_overrides(cli.log_level_override(), args.json_logs);
    config.init_logging();

    info!(
        config = %args.config.display(),
        workload = %args.workload.display(),
        "ratewise starting"
    );

    let mut workload = FileWorkload::load(&args.workload)?
        .with_default_period_length(config.adaptive.rolling_horizon.period_length());
    let mut simulation = bootstrap::build_simulation(&config)?;

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::sink()),
    };
    let mut sink = JsonLinesSink::new(writer);
    let summary = simulation.run(&mut workload, &mut sink)?;

    output::section("Run summary");
    output::table(&summary::metrics_table(&summary));
    if !summary.pricing.tiers.is_empty() {
        output::section("By tier");
        output::table(&summary::tier_table(&summary));
    }
    if let Some(path) = &args.output {
        println!();
        output::ok(&format!(
            "Wrote {} lines to {}",
            sink.lines(),
            path.display()
        ));
    }
    println!();

    Ok(())
}
