use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use perftopo::discovery::{BandwidthDiscovery, TracerouteDiscovery};
use perftopo::geolocation::{Coordinates, GeoLocator};
use perftopo::map_render::MercatorMap;
use perftopo::report;
use perftopo::shared::DEFAULT_POOL_SIZE;
use perftopo::site_table::SiteTable;
use perftopo::topology::{NodeAddr, Topology};

#[derive(Parser)]
#[command(
    name = "perftopo",
    version,
    about = "Discovers perfSONAR mesh topology and bandwidth"
)]
struct Cli {
    /// TOML site table; the built-in reference mesh is used when omitted
    #[arg(long, value_name = "FILE")]
    sites: Option<PathBuf>,

    /// Worker pool size for remote queries
    #[arg(long, value_name = "N", default_value_t = DEFAULT_POOL_SIZE)]
    pool_size: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover the traceroute topology and render a geolocated map
    Trace {
        /// Write the topology map to this SVG file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Also write the deduplicated edge list to this file
        #[arg(long, value_name = "FILE")]
        dump_edges: Option<PathBuf>,
    },
    /// Collect per-pair daily throughput averages and print the report
    Bandwidth,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if cli.pool_size == 0 {
        anyhow::bail!("--pool-size must be at least 1");
    }

    let sites = match &cli.sites {
        Some(path) => SiteTable::from_file(path)
            .with_context(|| format!("loading site table {}", path.display()))?,
        None => SiteTable::reference_mesh(),
    };

    match &cli.command {
        Command::Trace { output, dump_edges } => {
            run_trace(&sites, cli.pool_size, output, dump_edges.as_deref())
        }
        Command::Bandwidth => run_bandwidth(&sites, cli.pool_size),
    }
}

fn run_trace(
    sites: &SiteTable,
    pool_size: usize,
    output: &Path,
    dump_edges: Option<&Path>,
) -> anyhow::Result<()> {
    let discovery = TracerouteDiscovery::new()?
        .with_pool_size(pool_size)
        .with_progress(true);
    let topology = discovery.discover(sites)?;
    info!(
        "discovered {} nodes and {} edges",
        topology.node_count(),
        topology.edge_count()
    );
    if topology.is_empty() {
        warn!("every traceroute query failed; the map will be empty");
    }

    if let Some(path) = dump_edges {
        write_edge_list(&topology, path)
            .with_context(|| format!("writing edge list {}", path.display()))?;
    }

    let locator = GeoLocator::new()?;
    let mut locations: HashMap<NodeAddr, Coordinates> = locator.locate_all(topology.nodes.iter());
    // Hand-placed positions win over whatever the lookup service said.
    for (addr, coordinates) in &sites.coordinate_overrides {
        locations.insert(addr.clone(), *coordinates);
    }

    MercatorMap::new().render(
        &topology,
        &locations,
        &sites.site_labels,
        &sites.router_labels,
        output,
    )?;
    Ok(())
}

fn run_bandwidth(sites: &SiteTable, pool_size: usize) -> anyhow::Result<()> {
    let discovery = BandwidthDiscovery::new()?
        .with_pool_size(pool_size)
        .with_progress(true);
    let measurements = discovery.discover(sites)?;
    if measurements.is_empty() {
        warn!("no pair produced a throughput average");
    }
    report::print_report(&measurements)?;
    Ok(())
}

fn write_edge_list(topology: &Topology, path: &Path) -> std::io::Result<()> {
    let mut lines = String::new();
    for edge in topology.sorted_edges() {
        lines.push_str(&format!("{edge}\n"));
    }
    fs::write(path, lines)
}
