//! `stitch-scan`: merge stitch scan reconstructions by renumbering a slice
//! range, optionally aligning and scaling every slice.

mod cli;
mod logging;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use stitchscan_core::SliceTransformer;
use tracing::info;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;
    let job = SliceTransformer::new(cli.into_config()?)?;
    let mapping = job.mapping();

    info!(
        first = mapping.range().start(),
        last = mapping.range().end(),
        output_first = mapping.output_start(),
        output_last = mapping.output_end(),
        transform = ?job.config().transform,
        gain = job.config().gain,
        "Stitching slices"
    );

    // Per-slice log lines replace the bar in verbose mode
    let progress = if verbose {
        ProgressBar::hidden()
    } else {
        progress_bar(job.len())
    };

    let result = job.run_with(|event| {
        progress.set_message(format!("{} -> {}", event.input_index, event.output_index));
        progress.inc(1);
    });
    progress.finish_and_clear();

    let written = result.with_context(|| {
        format!(
            "stitching slices {}-{} into {}-{}",
            mapping.range().start(),
            mapping.range().end(),
            mapping.output_start(),
            mapping.output_end()
        )
    })?;

    info!(written, "Done");
    Ok(())
}

fn progress_bar(len: u32) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(480));
    bar
}
