//! Core functionality for actual scanning behaviour.
//!
//! The [`Scanner`] fans one probe task out per candidate, never keeping more
//! than its pool size in flight, and waits for every task before ranking.
use crate::candidates::{load_candidates, Candidate, DatasetLocation};
use crate::classifier::classify;
use crate::results::{ResultSet, ScanRecord};
use anyhow::Result;
use futures::{stream, StreamExt};
use log::{debug, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod probe;
pub use probe::{HttpProber, Probe, ProbeOutcome, NETWORK_TIMEOUT};

/// Number of probes allowed to run at the same time.
pub const MAX_CONCURRENCY: usize = 50;

/// The frozen outcome of a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Origin hits, fastest first, truncated to the requested limit.
    pub records: Vec<ScanRecord>,
    /// Candidates handed to the pool (those with at least one domain).
    pub submitted: usize,
    /// Origin hits found before truncation.
    pub accepted: usize,
    /// Tasks that did not run to completion.
    pub failed_tasks: usize,
    /// Wall-clock time of the whole fan-out.
    pub elapsed: Duration,
}

impl ScanReport {
    /// Whether no origin server was found at all. A zero limit leaves
    /// `records` empty without making the scan empty.
    pub const fn found_none(&self) -> bool {
        self.accepted == 0
    }
}

/// What came of scanning one region.
#[derive(Debug)]
pub enum RegionScan {
    /// The dataset has no candidates for the region; nothing was probed.
    NoCandidates,
    /// The pool ran over every candidate of the region.
    Scanned {
        /// Candidates found for the region, with or without domains.
        candidates: usize,
        /// The frozen scan outcome.
        report: ScanReport,
    },
}

/// The class for the scanner.
///
/// `P` is the probe used for every candidate, `concurrency` is how many
/// probes may be in flight at once, and `limit` is how many ranked records
/// the report keeps.
#[derive(Debug)]
pub struct Scanner<P> {
    prober: Arc<P>,
    concurrency: usize,
    limit: usize,
}

impl<P: Probe> Scanner<P> {
    /// Builds a scanner; a `concurrency` of zero is treated as one.
    pub fn new(prober: P, concurrency: usize, limit: usize) -> Self {
        Self {
            prober: Arc::new(prober),
            concurrency: concurrency.max(1),
            limit,
        }
    }

    /// Loads the candidates of `region` and scans them.
    ///
    /// `on_loaded` sees the candidate list before the first probe starts and
    /// is skipped when the region is empty. `on_done` is the progress
    /// callback of [`Scanner::run_with_progress`].
    pub async fn scan_region<L, F>(
        &self,
        location: &DatasetLocation,
        region: &str,
        on_loaded: L,
        on_done: F,
    ) -> Result<RegionScan>
    where
        L: FnOnce(&[Candidate]),
        F: FnMut(usize),
    {
        let candidates = load_candidates(location, region).await?;
        if candidates.is_empty() {
            debug!("No candidates for region {}, skipping the scan", region);
            return Ok(RegionScan::NoCandidates);
        }

        on_loaded(&candidates);
        let report = self.run_with_progress(&candidates, on_done).await;
        Ok(RegionScan::Scanned {
            candidates: candidates.len(),
            report,
        })
    }

    /// Runs the scan without progress reporting.
    pub async fn run(&self, candidates: &[Candidate]) -> ScanReport {
        self.run_with_progress(candidates, |_| {}).await
    }

    /// Runs the scan, calling `on_done` once per finished task with the
    /// number of tasks finished so far.
    pub async fn run_with_progress<F>(&self, candidates: &[Candidate], mut on_done: F) -> ScanReport
    where
        F: FnMut(usize),
    {
        let started = Instant::now();
        let results = Arc::new(ResultSet::new());

        let jobs = candidates
            .iter()
            .enumerate()
            .filter_map(|(sequence, candidate)| {
                let domain = candidate.primary_domain()?;
                Some((sequence, candidate.name.clone(), domain.to_owned()))
            })
            .collect::<Vec<_>>();
        let submitted = jobs.len();

        debug!(
            "Start probing candidates.\nPool size {}\nCandidates {}\nWith domains {}",
            self.concurrency,
            candidates.len(),
            submitted
        );

        let mut finished = 0;
        let mut failed_tasks = 0;
        let mut tasks = stream::iter(jobs)
            .map(|(sequence, name, domain)| {
                let prober = Arc::clone(&self.prober);
                let results = Arc::clone(&results);
                let task_domain = domain.clone();
                let handle = tokio::spawn(async move {
                    probe_candidate(&*prober, &results, sequence, name, task_domain).await;
                });
                async move { (domain, handle.await) }
            })
            .buffer_unordered(self.concurrency);

        while let Some((domain, joined)) = tasks.next().await {
            finished += 1;
            if let Err(e) = joined {
                failed_tasks += 1;
                warn!("Probe task for {} did not complete: {}", domain, e);
            }
            on_done(finished);
        }

        if results.is_empty() {
            debug!("None of the {} probed candidates is an origin server", submitted);
        }
        let accepted = results.len();
        let records = results.ranked(self.limit);
        let elapsed = started.elapsed();

        debug!(
            "Scan finished in {:?}: {} accepted, {} failed tasks",
            elapsed, accepted, failed_tasks
        );

        ScanReport {
            records,
            submitted,
            accepted,
            failed_tasks,
            elapsed,
        }
    }
}

/// Probes one domain, classifies the answer and records origin hits.
async fn probe_candidate<P: Probe>(
    prober: &P,
    results: &ResultSet,
    sequence: usize,
    name: String,
    domain: String,
) {
    let Some(outcome) = prober.probe(&domain).await else {
        debug!("{} unreachable over HTTP and HTTPS", domain);
        return;
    };

    let kind = classify(&outcome.server);
    if !kind.is_origin() {
        debug!("{} is behind an edge network ({:?})", domain, outcome.server);
        return;
    }

    debug!(
        "{} answered in {:?} as {:?} ({:?})",
        domain, outcome.latency, kind, outcome.server
    );
    results.push(ScanRecord {
        name,
        domain,
        latency: outcome.latency,
        server: outcome.server,
        sequence,
    });
}
