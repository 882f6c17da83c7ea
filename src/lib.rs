pub mod discovery;
pub mod geolocation;
pub mod map_render;
pub mod report;
pub mod shared;
pub mod site_table;
pub mod topology;

pub use discovery::{BandwidthDiscovery, Measurement, TracerouteDiscovery};
pub use geolocation::{Coordinates, GeoLocator};
pub use map_render::MercatorMap;
pub use shared::{ConfigError, Error, FetchError, ParseError};
pub use site_table::{SiteLabel, SiteTable};
pub use topology::{Edge, NodeAddr, PathSegments, Topology};
