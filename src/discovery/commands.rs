use url::Url;

use crate::shared::{ConfigError, AVERAGING_WINDOW_SECS};
use crate::site_table::SiteTable;

/// One reverse traceroute query against a remote toolkit host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerouteCommand {
    pub url: String,
}

/// One throughput archive lookup for an ordered (source, destination) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandwidthCommand {
    pub source: String,
    pub destination: String,
    pub archive_url: String,
}

/// Enumerates one reverse traceroute query from every site toward every
/// other site's host. A site is never traced against itself; the exclusion
/// is exact hostname equality, so a host that happens to be a substring of
/// another site's host is still queried.
pub fn traceroute_commands(sites: &SiteTable) -> Result<Vec<TracerouteCommand>, ConfigError> {
    let hosts = site_hosts(sites)?;
    let mut commands = Vec::new();
    for base_url in sites.sites.values() {
        let own_host = host_component(base_url)?;
        for target in &hosts {
            if *target == own_host {
                continue;
            }
            commands.push(TracerouteCommand {
                url: format!(
                    "{base_url}gui/reverse_traceroute.cgi?target={target}&function=traceroute"
                ),
            });
        }
    }
    Ok(commands)
}

/// Enumerates one archive lookup per ordered pair of distinct site hosts.
/// The scheme is a per-host policy choice, not a TLS probe.
pub fn bandwidth_commands(sites: &SiteTable) -> Result<Vec<BandwidthCommand>, ConfigError> {
    let hosts = site_hosts(sites)?;
    let mut commands = Vec::new();
    for source in &hosts {
        for destination in &hosts {
            if source == destination {
                continue;
            }
            let scheme = if sites.is_secure_host(source) {
                "https"
            } else {
                "http"
            };
            commands.push(BandwidthCommand {
                source: source.clone(),
                destination: destination.clone(),
                archive_url: format!(
                    "{scheme}://{source}/esmond/perfsonar/archive/?event-type=throughput&format=json&source={source}&destination={destination}"
                ),
            });
        }
    }
    Ok(commands)
}

/// Builds the stage-two averages URL from the archive URL and the stream's
/// metadata key: query string off, key and the daily window on.
pub fn averages_url(archive_url: &str, metadata_key: &str) -> String {
    let base = match archive_url.split_once('?') {
        Some((base, _)) => base,
        None => archive_url,
    };
    format!("{base}{metadata_key}/throughput/averages/{AVERAGING_WINDOW_SECS}?format=json")
}

fn site_hosts(sites: &SiteTable) -> Result<Vec<String>, ConfigError> {
    sites.sites.values().map(|url| host_component(url)).collect()
}

/// Network location component of a site URL: the host, plus the port when
/// one is present. Malformed site URLs are configuration mistakes and fail
/// the whole enumeration.
fn host_component(base_url: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(base_url).map_err(|source| ConfigError::MalformedSiteUrl {
        url: base_url.to_string(),
        source,
    })?;
    let host = parsed.host_str().ok_or_else(|| ConfigError::MissingHost {
        url: base_url.to_string(),
    })?;
    Ok(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
