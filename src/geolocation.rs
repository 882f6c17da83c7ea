use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::discovery::{HttpTransport, ReqwestTransport};
use crate::shared::{Error, FetchError, ParseError};
use crate::topology::NodeAddr;

const DEFAULT_ENDPOINT: &str = "https://freegeoip.net/json/";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Geographic position attached to a node for map placement.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

/// Per-node lookup against a freegeoip-style json endpoint. Lookups run one
/// at a time; a node whose lookup fails, or that the service cannot place
/// (0.0/0.0 or missing fields), simply gets no coordinates.
pub struct GeoLocator<T = ReqwestTransport> {
    transport: T,
    endpoint: String,
    timeout: Duration,
}

impl GeoLocator<ReqwestTransport> {
    pub fn new() -> Result<Self, FetchError> {
        Ok(GeoLocator::with_transport(ReqwestTransport::new()?))
    }
}

impl<T: HttpTransport> GeoLocator<T> {
    pub fn with_transport(transport: T) -> Self {
        GeoLocator {
            transport,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: LOOKUP_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Resolves coordinates for every node that the service can place.
    pub fn locate_all<'a, I>(&self, nodes: I) -> HashMap<NodeAddr, Coordinates>
    where
        I: IntoIterator<Item = &'a NodeAddr>,
    {
        let mut located = HashMap::new();
        for node in nodes {
            match self.locate(node) {
                Ok(Some(coordinates)) => {
                    located.insert(node.clone(), coordinates);
                }
                Ok(None) => debug!("no usable location for {}", node),
                Err(err) => warn!("geolocation lookup for {} failed: {}", node, err),
            }
        }
        info!("located {} nodes", located.len());
        located
    }

    fn locate(&self, node: &str) -> Result<Option<Coordinates>, Error> {
        let url = format!("{}{}", self.endpoint, node);
        let body = self.transport.get(&url, self.timeout)?;
        let response: GeoResponse =
            serde_json::from_str(&body).map_err(ParseError::from)?;
        if response.latitude != 0.0 && response.longitude != 0.0 {
            Ok(Some(Coordinates {
                latitude: response.latitude,
                longitude: response.longitude,
            }))
        } else {
            Ok(None)
        }
    }
}
