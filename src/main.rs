#![allow(clippy::needless_doctest_main)]
//! Command-line entry point for originscan.
use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use originscan::candidates::DatasetLocation;
use originscan::input::{Config, Opts, OutputFormat};
use originscan::location::LocationResolver;
use originscan::network::{check_ipv4_connectivity, IPV4_PROBE_TARGET, PRECHECK_TIMEOUT};
use originscan::output;
use originscan::scanner::{HttpProber, RegionScan, Scanner, MAX_CONCURRENCY};
use originscan::tui::progress_bar;
use originscan::{detail, warning};
use std::process;

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() {
    env_logger::init();

    let mut opts = Opts::read();
    let config = match Config::read(opts.config_path.clone()) {
        Ok(config) => config,
        Err(e) => {
            warning!(format!("{e}\nAborting scan."));
            process::exit(1);
        }
    };
    opts.merge(&config);

    debug!("Main() `opts` arguments are {:?}", opts);

    if !opts.quiet() && !opts.accessible && !opts.no_banner {
        print_opening();
    }

    if let Err(e) = run(&opts).await {
        warning!(format!("{e:#}"));
        process::exit(1);
    }
}

/// Runs one scan end to end. Errors returned here abort the process.
#[cfg(not(tarpaulin_include))]
async fn run(opts: &Opts) -> Result<()> {
    let quiet = opts.quiet();

    check_ipv4_connectivity(IPV4_PROBE_TARGET, PRECHECK_TIMEOUT)
        .await
        .context(
            "This program requires a working IPv4 network stack. IPv6-only environment detected.",
        )?;
    detail!("IPv4 connectivity check: OK", quiet, opts.accessible);

    let region = match &opts.region {
        Some(region) => region.clone(),
        None => LocationResolver::new().resolve().await,
    };
    detail!(
        format!("Detected local region: {region}"),
        quiet,
        opts.accessible
    );

    detail!("Fetching university list.", quiet, opts.accessible);
    let bar = progress_bar(0, quiet || opts.accessible);
    let scanner = Scanner::new(HttpProber::new(), MAX_CONCURRENCY, opts.limit);
    let scan = scanner
        .scan_region(
            &DatasetLocation::parse(&opts.dataset),
            &region,
            |candidates| {
                detail!(
                    format!(
                        "Found {} universities. Starting concurrent analysis (pool size: {MAX_CONCURRENCY})...",
                        candidates.len()
                    ),
                    quiet,
                    opts.accessible
                );
                let probeable = candidates
                    .iter()
                    .filter(|candidate| candidate.primary_domain().is_some())
                    .count();
                bar.set_length(probeable as u64);
            },
            |done| bar.set_position(done as u64),
        )
        .await?;
    bar.finish_and_clear();

    // Status lines go to stderr, so these two are printed in every format.
    let (candidates, report) = match scan {
        RegionScan::NoCandidates => {
            warning!(
                format!("No universities found for region: {region}"),
                false,
                opts.accessible
            );
            return Ok(());
        }
        RegionScan::Scanned { candidates, report } => (candidates, report),
    };

    if report.failed_tasks > 0 {
        warning!(
            format!("{} probe tasks did not complete.", report.failed_tasks),
            quiet,
            opts.accessible
        );
    }
    output!(
        format!("Analysis complete in {:.2?}", report.elapsed),
        quiet,
        opts.accessible
    );
    output!(
        format!("Identified {} origin servers.", report.accepted),
        quiet,
        opts.accessible
    );

    if report.found_none() {
        warning!("No origin servers identified.", false, opts.accessible);
        if opts.format == OutputFormat::Table {
            return Ok(());
        }
    }

    let rendered = output::render(&report, &region, candidates, opts.format, opts.accessible)
        .context("Failed to render the results")?;
    if !quiet {
        println!();
    }
    print!("{rendered}");
    Ok(())
}

/// Prints the opening banner.
#[cfg(not(tarpaulin_include))]
fn print_opening() {
    let banner = format!(
        "{}\n{}",
        "originscan".bold().cyan(),
        format!(
            "v{} - origin servers first, CDN edges last",
            env!("CARGO_PKG_VERSION")
        )
        .dimmed()
    );
    println!("{banner}");
    println!("{}", "-".repeat(48).dimmed());
}
