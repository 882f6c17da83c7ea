use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dotted-quad address of one observed hop. Addresses stay textual; node
/// identity is exact string equality.
pub type NodeAddr = String;

/// Two temporally adjacent hops from one traceroute. The fields keep the
/// order the parser produced them in, but equality and hashing treat the
/// pair as unordered so aggregate sets collapse reversed sightings.
#[derive(Debug, Clone, Eq)]
pub struct Edge {
    pub hop_a: NodeAddr,
    pub hop_b: NodeAddr,
}

impl Edge {
    pub fn new(hop_a: impl Into<NodeAddr>, hop_b: impl Into<NodeAddr>) -> Self {
        Edge {
            hop_a: hop_a.into(),
            hop_b: hop_b.into(),
        }
    }

    fn canonical(&self) -> (&str, &str) {
        if self.hop_a <= self.hop_b {
            (&self.hop_a, &self.hop_b)
        } else {
            (&self.hop_b, &self.hop_a)
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Edge) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.hop_a, self.hop_b)
    }
}

/// One command's contribution: the probing host plus every responding hop
/// in path order, possibly with repeats. Dedup happens at aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSegments {
    pub nodes: Vec<NodeAddr>,
    pub edges: Vec<Edge>,
}

/// Deduplicated union of every successful command's partial results.
#[derive(Debug, Clone)]
pub struct Topology {
    pub nodes: HashSet<NodeAddr>,
    pub edges: HashSet<Edge>,
}

impl Topology {
    pub fn new() -> Self {
        Topology {
            nodes: HashSet::new(),
            edges: HashSet::new(),
        }
    }

    /// Set-union aggregation. Edge endpoints are inserted into the node set
    /// as well, so every edge always connects two known nodes.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = PathSegments>,
    {
        let mut topology = Topology::new();
        for segment in segments {
            topology.nodes.extend(segment.nodes);
            for edge in segment.edges {
                topology.nodes.insert(edge.hop_a.clone());
                topology.nodes.insert(edge.hop_b.clone());
                topology.edges.insert(edge);
            }
        }
        topology
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Edges in lexicographic field order, for stable dumps and drawing.
    pub fn sorted_edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges.iter().collect();
        edges.sort_by(|a, b| (&a.hop_a, &a.hop_b).cmp(&(&b.hop_a, &b.hop_b)));
        edges
    }
}

impl Default for Topology {
    fn default() -> Self {
        Topology::new()
    }
}
