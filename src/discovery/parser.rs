use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::shared::ParseError;
use crate::topology::{Edge, PathSegments};

lazy_static! {
    /// Dotted-quad pattern. Hop addresses are matched, never parsed.
    static ref ADDR_PATTERN: Regex =
        Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").unwrap();
    static ref TITLE_SELECTOR: Selector = Selector::parse("title").unwrap();
    static ref PRE_SELECTOR: Selector = Selector::parse("pre").unwrap();
}

/// Parses one reverse traceroute response into its path segments.
///
/// The probing host's address comes from the title tag; the pre block
/// carries one line per responding hop. The probing host starts the node
/// list but is not edge-connected to the first hop, since the CGI does not
/// report the leg between them. A missing required tag fails the whole
/// command rather than partial-parsing.
pub fn parse_traceroute(body: &str) -> Result<PathSegments, ParseError> {
    let document = Html::parse_document(body);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .ok_or(ParseError::MissingTitle)?;
    let title_text: String = title.text().collect();
    let source = ADDR_PATTERN
        .find(&title_text)
        .ok_or(ParseError::MissingProbeAddress)?
        .as_str()
        .to_string();

    let pre = document
        .select(&PRE_SELECTOR)
        .next()
        .ok_or(ParseError::MissingHopBlock)?;
    let pre_text: String = pre.text().collect();
    let path = hop_addresses(&pre_text);

    let edges = path
        .windows(2)
        .map(|pair| Edge::new(pair[0].clone(), pair[1].clone()))
        .collect();
    let mut nodes = vec![source];
    nodes.extend(path);

    Ok(PathSegments { nodes, edges })
}

/// A hop line must carry a round-trip time ("ms") and a dotted-quad; the
/// first dotted-quad on the line is the hop's address. Header lines,
/// unresponsive hops and banners all fall through the filter.
fn hop_addresses(pre_text: &str) -> Vec<String> {
    // CGI output that crossed an intermediate encoding carries literal
    // backslash-n markers instead of newlines; normalize before splitting.
    let normalized = pre_text.replace("\\n", "\n");
    normalized
        .lines()
        .filter(|line| line.contains("ms"))
        .filter_map(|line| ADDR_PATTERN.find(line))
        .map(|found| found.as_str().to_string())
        .collect()
}

#[derive(Debug, Deserialize)]
struct ArchiveEntry {
    #[serde(rename = "metadata-key", default)]
    metadata_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThroughputSample {
    val: f64,
}

/// Extracts the measurement stream's metadata key from a stage-one archive
/// listing. An empty listing is a normal no-stream outcome, not an error.
pub fn parse_metadata_key(body: &str) -> Result<Option<String>, ParseError> {
    let entries: Vec<ArchiveEntry> = serde_json::from_str(body)?;
    match entries.into_iter().next() {
        None => Ok(None),
        Some(entry) => match entry.metadata_key {
            Some(key) => Ok(Some(key)),
            None => Err(ParseError::MissingMetadataKey),
        },
    }
}

/// Arithmetic mean of the val samples, or None when the window holds no
/// samples. An empty window is never reported as zero.
pub fn parse_throughput_average(body: &str) -> Result<Option<f64>, ParseError> {
    let samples: Vec<ThroughputSample> = serde_json::from_str(body)?;
    if samples.is_empty() {
        return Ok(None);
    }
    let total: f64 = samples.iter().map(|sample| sample.val).sum();
    Ok(Some(total / samples.len() as f64))
}
