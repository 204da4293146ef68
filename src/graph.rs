//! Graph-based region partitioning.
//!
//! Pixels are nodes of a neighbor graph weighted by luma difference. Regions
//! are grown in two passes over a union-find forest:
//!
//! 1. Threshold merge: walk edges from lightest to heaviest and join the two
//!    endpoints' regions whenever either region is still below a minimum
//!    size, stopping as soon as the requested count is reached.
//! 2. Size refinement: repeatedly fold the globally smallest region into its
//!    smallest neighbor until exactly the requested count remains. Edge
//!    weights play no part here.
//!
//! Every region is painted with the original color of its root pixel.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::color::{luma_difference_weight, Argb};
use crate::disjoint_set::DisjointSet;
use crate::error::SegmentError;
use crate::segmentation::{validate_request, Segmentation, Segmenter};

/// Which neighbors count as adjacent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Connectivity {
    /// Right and lower neighbors
    Four,
    /// Right, lower-left, lower and lower-right neighbors
    #[default]
    Eight,
}

impl Connectivity {
    /// Forward `(dx, dy)` offsets. Looking only forward visits each
    /// unordered pair once.
    fn forward_offsets(self) -> &'static [(isize, usize)] {
        match self {
            Connectivity::Four => &[(1, 0), (0, 1)],
            Connectivity::Eight => &[(1, 0), (-1, 1), (0, 1), (1, 1)],
        }
    }

    /// Call `f(a, b)` once for every adjacent pixel pair, `a` before `b` in scan order.
    pub fn for_each_pair(self, width: usize, height: usize, mut f: impl FnMut(usize, usize)) {
        let offsets = self.forward_offsets();
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                for &(dx, dy) in offsets {
                    let nx = x as isize + dx;
                    let ny = y + dy;
                    if nx < 0 || nx as usize >= width || ny >= height {
                        continue;
                    }
                    f(idx, ny * width + nx as usize);
                }
            }
        }
    }
}

/// Configuration for graph partitioning
#[derive(Clone, Debug)]
pub struct GraphConfig {
    /// Neighborhood used for both edge building and region adjacency
    pub connectivity: Connectivity,
    /// Threshold-merge minimum region size is `pixels / (divisor * segments)`
    pub min_size_divisor: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            min_size_divisor: 5,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GraphSegmenter {
    config: GraphConfig,
}

impl GraphSegmenter {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }
}

impl Segmenter for GraphSegmenter {
    fn segment(&self, image: &PixelBuffer, segments: usize) -> Result<Segmentation, SegmentError> {
        graph_segment(image, segments, &self.config)
    }
}

/// Undirected weighted edge between two pixel indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: u32,
}

/// Build the neighbor graph and sort it by weight, keeping scan order among
/// equal weights.
pub fn build_edges(image: &PixelBuffer, connectivity: Connectivity) -> Vec<Edge> {
    let lumas: Vec<f64> = image.pixels().iter().map(|&raw| Argb(raw).luma()).collect();
    let per_pixel = connectivity.forward_offsets().len();
    let mut edges = Vec::with_capacity(image.len() * per_pixel);

    connectivity.for_each_pair(image.width(), image.height(), |a, b| {
        edges.push(Edge {
            a,
            b,
            weight: luma_difference_weight(lumas[a], lumas[b]),
        });
    });

    edges.sort_by_key(|e| e.weight);
    edges
}

/// Minimum size below which the threshold pass still merges a region.
pub fn min_region_size(pixels: usize, segments: usize, divisor: usize) -> usize {
    let denom = divisor.max(1).saturating_mul(segments).max(1);
    (pixels / denom).max(1)
}

/// Partition `image` into exactly `min(segments, pixels)` regions.
pub fn graph_segment(
    image: &PixelBuffer,
    segments: usize,
    config: &GraphConfig,
) -> Result<Segmentation, SegmentError> {
    validate_request(segments)?;

    let mut ctx = GraphContext::new(image.len(), segments);
    if ctx.live > ctx.target {
        let edges = build_edges(image, config.connectivity);
        let min_size = min_region_size(image.len(), segments, config.min_size_divisor);
        debug!(
            "graph: {} edges, minimum region size {}",
            edges.len(),
            min_size
        );

        ctx.threshold_merge(&edges, min_size);
        debug!("graph: {} regions after threshold merge", ctx.live);

        ctx.refine(image.width(), image.height(), config.connectivity);
        debug!("graph: {} regions after refinement", ctx.live);
    }

    let roots = ctx.roots();
    let source = image.pixels();
    let pixels = roots.iter().map(|&root| source[root]).collect();
    Ok(Segmentation::from_region_keys(image, &roots, pixels))
}

/// Ordering key for regions: smaller first, ties by root index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct RegionKey {
    size: usize,
    id: usize,
}

/// Working state of one partitioning call.
struct GraphContext {
    forest: DisjointSet,
    /// Regions currently alive
    live: usize,
    /// Requested region count
    target: usize,
}

impl GraphContext {
    fn new(pixels: usize, target: usize) -> Self {
        Self {
            forest: DisjointSet::new(pixels),
            live: pixels,
            target,
        }
    }

    fn threshold_merge(&mut self, edges: &[Edge], min_size: usize) {
        for edge in edges {
            if self.live <= self.target {
                break;
            }
            let root_a = self.forest.find(edge.a);
            let root_b = self.forest.find(edge.b);
            if root_a == root_b {
                continue;
            }
            if self.forest.set_size(root_a) >= min_size && self.forest.set_size(root_b) >= min_size {
                continue;
            }
            if self.forest.union(root_a, root_b).is_some() {
                self.live -= 1;
            }
        }
    }

    fn refine(&mut self, width: usize, height: usize, connectivity: Connectivity) {
        if self.live <= self.target {
            return;
        }

        let mut adjacency = RegionAdjacency::build(&mut self.forest, width, height, connectivity);

        while self.live > self.target {
            let Some(smallest) = adjacency.order.pop_first() else {
                break;
            };
            let Some(nearest) = adjacency.smallest_neighbor(smallest.id) else {
                warn!(
                    "graph: region {} has no neighbors, stopping at {} regions",
                    smallest.id, self.live
                );
                break;
            };

            if let Some(root) = self.forest.union(nearest.id, smallest.id) {
                let size = self.forest.set_size(root);
                adjacency.merge(smallest, nearest, RegionKey { size, id: root });
                self.live -= 1;
            }
        }
    }

    fn roots(&mut self) -> Vec<usize> {
        (0..self.forest.len()).map(|i| self.forest.find(i)).collect()
    }
}

/// Neighbor sets of live regions plus a global size order.
///
/// Keys held in neighbor sets always carry the neighbor's current size.
#[derive(Debug, Default)]
struct RegionAdjacency {
    neighbors: HashMap<usize, BTreeSet<RegionKey>>,
    order: BTreeSet<RegionKey>,
}

impl RegionAdjacency {
    fn build(
        forest: &mut DisjointSet,
        width: usize,
        height: usize,
        connectivity: Connectivity,
    ) -> Self {
        let roots: Vec<usize> = (0..forest.len()).map(|i| forest.find(i)).collect();
        let mut keys: HashMap<usize, RegionKey> = HashMap::new();
        for &root in &roots {
            keys.entry(root).or_insert_with(|| RegionKey {
                size: forest.set_size(root),
                id: root,
            });
        }

        let mut adjacency = Self::default();
        for key in keys.values() {
            adjacency.order.insert(*key);
            adjacency.neighbors.insert(key.id, BTreeSet::new());
        }

        connectivity.for_each_pair(width, height, |a, b| {
            let (root_a, root_b) = (roots[a], roots[b]);
            if root_a == root_b {
                return;
            }
            let (key_a, key_b) = (keys[&root_a], keys[&root_b]);
            adjacency.neighbors.entry(root_a).or_default().insert(key_b);
            adjacency.neighbors.entry(root_b).or_default().insert(key_a);
        });

        adjacency
    }

    fn smallest_neighbor(&self, id: usize) -> Option<RegionKey> {
        self.neighbors.get(&id).and_then(|set| set.first()).copied()
    }

    /// Replace regions `a` and `b` by `merged`, which inherits both neighbor
    /// sets and takes their place in every neighbor's set.
    fn merge(&mut self, a: RegionKey, b: RegionKey, merged: RegionKey) {
        let set_a = self.neighbors.remove(&a.id).unwrap_or_default();
        let set_b = self.neighbors.remove(&b.id).unwrap_or_default();
        self.order.remove(&a);
        self.order.remove(&b);

        for n in &set_a {
            if let Some(set) = self.neighbors.get_mut(&n.id) {
                set.remove(&a);
            }
        }
        for n in &set_b {
            if let Some(set) = self.neighbors.get_mut(&n.id) {
                set.remove(&b);
            }
        }

        let combined: BTreeSet<RegionKey> = set_a
            .into_iter()
            .chain(set_b)
            .filter(|n| n.id != a.id && n.id != b.id)
            .collect();
        for n in &combined {
            if let Some(set) = self.neighbors.get_mut(&n.id) {
                set.insert(merged);
            }
        }

        self.neighbors.insert(merged.id, combined);
        self.order.insert(merged);
    }
}
