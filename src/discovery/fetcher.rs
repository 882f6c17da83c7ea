use std::time::Duration;

use tracing::debug;

use crate::shared::{Error, FetchError};
use crate::topology::PathSegments;

use super::commands::{averages_url, BandwidthCommand, TracerouteCommand};
use super::parser::{parse_metadata_key, parse_throughput_average, parse_traceroute};
use super::Measurement;

/// Blocking HTTP seam. One transport is shared by every worker, so
/// implementations must tolerate concurrent calls.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

impl<'a, T: HttpTransport> HttpTransport for &'a T {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        (**self).get(url, timeout)
    }
}

/// reqwest-backed transport. The client's own default timeout is disabled;
/// every request carries an explicit per-request bound instead.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(FetchError::Client)?;
        Ok(ReqwestTransport { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|source| classify(url, source))?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        response.text().map_err(|source| classify(url, source))
    }
}

fn classify(url: &str, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source,
        }
    }
}

/// One traceroute exchange: fetch the CGI output and parse it into path
/// segments.
pub fn fetch_traceroute<T: HttpTransport>(
    transport: &T,
    command: &TracerouteCommand,
    timeout: Duration,
) -> Result<PathSegments, Error> {
    let body = transport.get(&command.url, timeout)?;
    Ok(parse_traceroute(&body)?)
}

/// The two-stage throughput exchange: resolve the stream's metadata key,
/// then fetch the daily averages it keys. Stage two is never attempted
/// when stage one finds no stream.
pub fn fetch_throughput<T: HttpTransport>(
    transport: &T,
    command: &BandwidthCommand,
    timeout: Duration,
) -> Result<Option<Measurement>, Error> {
    let listing = transport.get(&command.archive_url, timeout)?;
    let key = match parse_metadata_key(&listing)? {
        Some(key) => key,
        None => return Ok(None),
    };

    let body = transport.get(&averages_url(&command.archive_url, &key), timeout)?;
    Ok(parse_throughput_average(&body)?.map(|average| Measurement {
        source: command.source.clone(),
        destination: command.destination.clone(),
        average,
    }))
}
