use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use plotters::prelude::{ChartBuilder, Circle, IntoDrawingArea, Rectangle, SVGBackend, Text};
use plotters::series::LineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontStyle, IntoFont, RGBColor, WHITE};
use tracing::{debug, info};

use crate::geolocation::Coordinates;
use crate::shared::Error;
use crate::site_table::SiteLabel;
use crate::topology::{NodeAddr, Topology};

const CANVAS_FILL: RGBColor = RGBColor(0xdc, 0xe9, 0xf2);
const EDGE_STROKE: RGBColor = RGBColor(0x55, 0x55, 0x55);
const SITE_FILL: RGBColor = RGBColor(0xcc, 0x33, 0x33);
const ROUTER_FILL: RGBColor = RGBColor(0x2e, 0x8b, 0x57);

/// Mercator viewport over the mesh's footprint. The default window covers
/// the Americas from the US northern border down past Brazil, matching the
/// reference deployment.
pub struct MercatorMap {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    pub width: f64,
    pub height: f64,
}

impl MercatorMap {
    pub fn new() -> Self {
        MercatorMap {
            west: -130.0,
            south: -35.0,
            east: -40.0,
            north: 50.0,
            width: 1200.0,
            height: 600.0,
        }
    }

    pub fn with_bounds(mut self, west: f64, south: f64, east: f64, north: f64) -> Self {
        self.west = west;
        self.south = south;
        self.east = east;
        self.north = north;
        self
    }

    /// Draws every locatable edge and its endpoints, then writes the SVG.
    pub fn render(
        &self,
        topology: &Topology,
        locations: &HashMap<NodeAddr, Coordinates>,
        site_labels: &HashMap<String, SiteLabel>,
        router_labels: &HashMap<String, String>,
        output: &Path,
    ) -> Result<(), Error> {
        let svg = self.render_svg(topology, locations, site_labels, router_labels)?;
        fs::write(output, svg)?;
        info!("wrote topology map to {}", output.display());
        Ok(())
    }

    /// Projects latitude and longitude onto the canvas, y growing downward.
    fn project(&self, coordinates: &Coordinates) -> (f64, f64) {
        let merc = |lat: f64| ((lat.to_radians() / 2.0 + PI / 4.0).tan()).ln();
        let x = (coordinates.longitude - self.west) / (self.east - self.west) * self.width;
        let y = (merc(self.north) - merc(coordinates.latitude))
            / (merc(self.north) - merc(self.south))
            * self.height;
        (x, y)
    }

    fn render_svg(
        &self,
        topology: &Topology,
        locations: &HashMap<NodeAddr, Coordinates>,
        site_labels: &HashMap<String, SiteLabel>,
        router_labels: &HashMap<String, String>,
    ) -> Result<String, Error> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width as u32, self.height as u32))
                .into_drawing_area();
            root.fill(&CANVAS_FILL)?;
            // The chart space is the projected canvas itself, with the y
            // range reversed so north stays at the top.
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(0.0..self.width, self.height..0.0)?;

            // Only edges with both endpoints placed get drawn; the rest are
            // noted and skipped, in line with the partial-output policy of
            // the discovery run.
            let mut placed: HashMap<&str, (f64, f64)> = HashMap::new();
            for edge in topology.sorted_edges() {
                match (locations.get(&edge.hop_a), locations.get(&edge.hop_b)) {
                    (Some(a), Some(b)) => {
                        let (xa, ya) = self.project(a);
                        let (xb, yb) = self.project(b);
                        placed.insert(edge.hop_a.as_str(), (xa, ya));
                        placed.insert(edge.hop_b.as_str(), (xb, yb));
                        chart.draw_series(LineSeries::new(
                            vec![(xa, ya), (xb, yb)],
                            EDGE_STROKE,
                        ))?;
                    }
                    _ => debug!("no location for {} or {}", edge.hop_a, edge.hop_b),
                }
            }

            let mut nodes: Vec<(&str, (f64, f64))> = placed.into_iter().collect();
            nodes.sort_by(|a, b| a.0.cmp(b.0));
            chart.draw_series(nodes.iter().map(|(addr, (x, y))| {
                if site_labels.contains_key(*addr) {
                    Circle::new((*x, *y), 5, SITE_FILL.filled())
                } else {
                    Circle::new((*x, *y), 3, ROUTER_FILL.filled())
                }
            }))?;

            let marker_font = ("sans-serif", 9)
                .into_font()
                .style(FontStyle::Bold)
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(nodes.iter().filter_map(|(addr, (x, y))| {
                let label = site_labels
                    .get(*addr)
                    .map(|site| site.index.to_string())
                    .or_else(|| router_labels.get(*addr).cloned())?;
                Some(Text::new(label, (*x, *y), marker_font.clone()))
            }))?;

            let mut legend: Vec<&SiteLabel> = site_labels.values().collect();
            legend.sort_by_key(|label| label.index);
            if !legend.is_empty() {
                let box_bottom = 14 + legend.len() as i32 * 14 + 10;
                root.draw(&Rectangle::new(
                    [(14, 14), (164, box_bottom)],
                    SITE_FILL.mix(0.5).filled(),
                ))?;
                let row_font = ("sans-serif", 10).into_font();
                for (row, label) in legend.iter().enumerate() {
                    root.draw(&Text::new(
                        format!("{} - {}", label.index, label.name),
                        (20, 22 + row as i32 * 14),
                        row_font.clone(),
                    ))?;
                }
            }

            root.present()?;
        }
        Ok(svg)
    }
}

impl Default for MercatorMap {
    fn default() -> Self {
        MercatorMap::new()
    }
}
