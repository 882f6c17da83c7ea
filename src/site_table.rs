use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::geolocation::Coordinates;
use crate::shared::ConfigError;

/// Display metadata for one measurement site on the rendered map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteLabel {
    pub name: String,
    pub index: u32,
}

/// The static mesh under measurement: site name to base toolkit URL, plus
/// the label and override tables the map renderer consumes.
///
/// Sites are kept in a BTreeMap so command enumeration is deterministic.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteTable {
    /// Site name to base toolkit URL, trailing slash included.
    pub sites: BTreeMap<String, String>,

    /// Node address to the site label shown on the map legend.
    #[serde(default)]
    pub site_labels: HashMap<String, SiteLabel>,

    /// Node address to a short router label.
    #[serde(default)]
    pub router_labels: HashMap<String, String>,

    /// Node address to fixed coordinates applied over geolocation results.
    #[serde(default)]
    pub coordinate_overrides: HashMap<String, Coordinates>,

    /// Hosts whose name contains any of these markers are queried over
    /// https; everything else over http.
    #[serde(default = "default_secure_host_markers")]
    pub secure_host_markers: Vec<String>,
}

fn default_secure_host_markers() -> Vec<String> {
    vec!["fnal".to_string()]
}

const REFERENCE_SITES: &[(&str, &str)] = &[
    ("T1_US_FNAL", "https://psonar3.fnal.gov/toolkit/"),
    ("T2_BR_Sprace", "http://perfsonar-bw.sprace.org.br/toolkit/"),
    ("T2_US_Caltech", "http://perfsonar.ultralight.org/toolkit/"),
    ("T2_US_Florida", "http://perfsonar2.ihepa.ufl.edu/toolkit/"),
    ("T2_US_MIT", "http://perfsonar02.cmsaf.mit.edu/toolkit/"),
    ("T2_US_Nebraska", "http://hcc-ps02.unl.edu/toolkit/"),
    ("T2_US_Purdue", "http://perfsonar-cms2.itns.purdue.edu/toolkit/"),
    ("T2_US_UCSD", "http://perfsonar-1.t2.ucsd.edu/toolkit/"),
    ("T2_US_Vanderbilt", "http://perfsonar-bwctl.accre.vanderbilt.edu/toolkit/"),
    ("T2_US_Wisconsin", "http://perfsonar02.hep.wisc.edu/toolkit/"),
];

const REFERENCE_SITE_LABELS: &[(&str, &str, u32)] = &[
    ("18.12.1.172", "MIT", 1),
    ("192.84.86.121", "Caltech", 2),
    ("128.211.143.4", "Purdue", 3),
    ("200.136.80.19", "Sprace", 4),
    ("128.227.221.45", "UFL", 5),
    ("169.228.130.41", "UCSD", 6),
    ("192.111.108.111", "Vanderbilt", 7),
    ("144.92.180.76", "WISC", 8),
    ("129.93.239.163", "Nebraska", 9),
    ("131.225.205.23", "Fermilab", 10),
];

const REFERENCE_ROUTER_LABELS: &[(&str, &str)] = &[
    ("64.57.30.225", "I2"),
    ("190.103.185.145", "ampath"),
    ("198.124.80.149", "esnet"),
    ("149.165.255.193", "gigapop"),
    ("137.164.26.197", "cenic"),
    ("169.228.130.1", "ucsd"),
    ("143.215.193.3", "sox"),
    ("143.108.254.241", "ansp"),
    ("164.113.255.253", "greatplains"),
];

// Addresses the public geolocation service places badly; positions here are
// hand checked against the operators' own records.
const REFERENCE_COORDINATE_OVERRIDES: &[(&str, f64, f64)] = &[
    ("192.84.86.121", 34.137835, -120.126106),
    ("169.228.130.41", 31.5875, -119.2819),
    ("198.32.155.205", 29.6516, -82.3248),
    ("198.32.252.229", 29.6516, -82.3248),
    ("198.32.155.206", 29.6516, -82.3248),
    ("198.32.252.237", 29.6516, -82.3248),
];

impl SiteTable {
    /// The ten-site CMS deployment the tool was built around.
    pub fn reference_mesh() -> Self {
        SiteTable {
            sites: REFERENCE_SITES
                .iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
            site_labels: REFERENCE_SITE_LABELS
                .iter()
                .map(|(addr, name, index)| {
                    (
                        addr.to_string(),
                        SiteLabel {
                            name: name.to_string(),
                            index: *index,
                        },
                    )
                })
                .collect(),
            router_labels: REFERENCE_ROUTER_LABELS
                .iter()
                .map(|(addr, label)| (addr.to_string(), label.to_string()))
                .collect(),
            coordinate_overrides: REFERENCE_COORDINATE_OVERRIDES
                .iter()
                .map(|(addr, latitude, longitude)| {
                    (
                        addr.to_string(),
                        Coordinates {
                            latitude: *latitude,
                            longitude: *longitude,
                        },
                    )
                })
                .collect(),
            secure_host_markers: default_secure_host_markers(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::SiteTableIo {
            path: path.display().to_string(),
            source,
        })?;
        SiteTable::from_toml_str(&raw, &path.display().to_string())
    }

    pub fn from_toml_str(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::SiteTableToml {
            path: origin.to_string(),
            source,
        })
    }

    pub fn is_secure_host(&self, host: &str) -> bool {
        self.secure_host_markers
            .iter()
            .any(|marker| host.contains(marker.as_str()))
    }
}
