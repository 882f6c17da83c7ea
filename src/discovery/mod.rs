pub mod commands;
pub mod fetcher;
pub mod parser;
pub mod runner;

pub use commands::{bandwidth_commands, traceroute_commands, BandwidthCommand, TracerouteCommand};
pub use fetcher::{HttpTransport, ReqwestTransport};
pub use runner::ParallelRunner;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::shared::{Error, ARCHIVE_TIMEOUT, DEFAULT_POOL_SIZE, TRACEROUTE_TIMEOUT};
use crate::site_table::SiteTable;
use crate::topology::Topology;

use fetcher::{fetch_throughput, fetch_traceroute};

/// Daily average throughput observed for one ordered site pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub source: String,
    pub destination: String,
    pub average: f64,
}

/// Discovers the hop-level topology of the mesh by fanning reverse
/// traceroute queries over the worker pool and unioning the parsed paths.
pub struct TracerouteDiscovery<T = ReqwestTransport> {
    transport: T,
    pool_size: usize,
    timeout: Duration,
    show_progress: bool,
}

impl TracerouteDiscovery<ReqwestTransport> {
    pub fn new() -> Result<Self, Error> {
        Ok(TracerouteDiscovery::with_transport(ReqwestTransport::new()?))
    }
}

impl<T: HttpTransport> TracerouteDiscovery<T> {
    pub fn with_transport(transport: T) -> Self {
        TracerouteDiscovery {
            transport,
            pool_size: DEFAULT_POOL_SIZE,
            timeout: TRACEROUTE_TIMEOUT,
            show_progress: false,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Runs the whole batch and unions every successful parse. A failed
    /// command is logged with its URL and contributes nothing; it never
    /// aborts the batch.
    pub fn discover(&self, sites: &SiteTable) -> Result<Topology, Error> {
        let commands = traceroute_commands(sites)?;
        info!("issuing {} reverse traceroute queries", commands.len());

        let runner = ParallelRunner::new(self.pool_size)?;
        let progress = batch_progress(self.show_progress, commands.len());
        let results = runner.run(&commands, |command| {
            let result = fetch_traceroute(&self.transport, command, self.timeout);
            if let Some(bar) = &progress {
                bar.inc(1);
            }
            result
        });
        if let Some(bar) = &progress {
            bar.finish();
        }

        let mut segments = Vec::new();
        let mut failed = 0usize;
        for (command, result) in commands.iter().zip(results) {
            match result {
                Ok(segment) => segments.push(segment),
                Err(err) => {
                    failed += 1;
                    warn!("traceroute query {} failed: {}", command.url, err);
                }
            }
        }
        if failed > 0 {
            info!(
                "{} of {} traceroute queries produced no path",
                failed,
                commands.len()
            );
        }

        Ok(Topology::from_segments(segments))
    }
}

/// Collects one throughput snapshot per ordered site pair over the worker
/// pool. Pairs with no measurement stream or an empty sample window yield
/// nothing rather than a zero.
pub struct BandwidthDiscovery<T = ReqwestTransport> {
    transport: T,
    pool_size: usize,
    timeout: Duration,
    show_progress: bool,
}

impl BandwidthDiscovery<ReqwestTransport> {
    pub fn new() -> Result<Self, Error> {
        Ok(BandwidthDiscovery::with_transport(ReqwestTransport::new()?))
    }
}

impl<T: HttpTransport> BandwidthDiscovery<T> {
    pub fn with_transport(transport: T) -> Self {
        BandwidthDiscovery {
            transport,
            pool_size: DEFAULT_POOL_SIZE,
            timeout: ARCHIVE_TIMEOUT,
            show_progress: false,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn discover(&self, sites: &SiteTable) -> Result<Vec<Measurement>, Error> {
        let commands = bandwidth_commands(sites)?;
        info!("issuing {} throughput archive queries", commands.len());

        let runner = ParallelRunner::new(self.pool_size)?;
        let progress = batch_progress(self.show_progress, commands.len());
        let results = runner.run(&commands, |command| {
            let result = fetch_throughput(&self.transport, command, self.timeout);
            if let Some(bar) = &progress {
                bar.inc(1);
            }
            result
        });
        if let Some(bar) = &progress {
            bar.finish();
        }

        let mut measurements = Vec::new();
        for (command, result) in commands.iter().zip(results) {
            match result {
                Ok(Some(measurement)) => measurements.push(measurement),
                Ok(None) => debug!(
                    "no throughput stream for {} -> {}",
                    command.source, command.destination
                ),
                Err(err) => warn!(
                    "throughput query {} failed: {}",
                    command.archive_url, err
                ),
            }
        }
        info!(
            "collected {} throughput averages from {} pairs",
            measurements.len(),
            commands.len()
        );
        Ok(measurements)
    }
}

fn batch_progress(show: bool, total: usize) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} queries")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    Some(bar)
}
