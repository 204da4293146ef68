//! K-means pixel clustering.
//!
//! Centroids are pixel indices: each one anchors a cluster both spatially
//! (its row and column) and in color (the color currently stored at that
//! pixel). Every pass recolors the whole image with the nearest centroid's
//! color, moves each centroid to the mean position of its members, and the
//! loop stops once a pass reproduces the previous pass's recoloring exactly.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::buffer::PixelBuffer;
use crate::color::Argb;
use crate::error::SegmentError;
use crate::segmentation::{validate_request, Segmentation, Segmenter};

/// Pass cap. Exact color ties can in principle make the recoloring cycle.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

#[derive(Clone, Debug)]
pub struct KMeansConfig {
    /// Seed for the initial centroid draw (`None` = fresh entropy per call)
    pub seed: Option<u64>,
    /// Maximum assignment/update passes before giving up on a fixed point
    pub max_iterations: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            seed: Some(crate::rng::DEFAULT_SEED),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct KMeansSegmenter {
    config: KMeansConfig,
}

impl KMeansSegmenter {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }
}

impl Segmenter for KMeansSegmenter {
    fn segment(&self, image: &PixelBuffer, segments: usize) -> Result<Segmentation, SegmentError> {
        let mut rng = crate::rng::new(self.config.seed);
        kmeans_segment_with_rng(image, segments, self.config.max_iterations, &mut rng)
    }
}

/// Cluster `image` into at most `k` regions, drawing the initial centroids
/// from `rng`.
pub fn kmeans_segment_with_rng<R: Rng + ?Sized>(
    image: &PixelBuffer,
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Segmentation, SegmentError> {
    validate_request(k)?;
    if k > image.len() {
        return Err(SegmentError::TooManyClusters {
            k,
            pixels: image.len(),
        });
    }

    let centroids = initial_centroids(image.len(), k, rng);
    let mut ctx = KMeansContext::new(image, centroids);

    let max_iterations = max_iterations.max(1);
    let mut iterations = 0;
    loop {
        ctx.assign();
        ctx.update_centroids();
        ctx.swap_buffers();
        iterations += 1;

        if !ctx.changed() {
            debug!(
                "k-means converged after {} iterations with {} clusters",
                iterations,
                ctx.centroids.len()
            );
            break;
        }
        if iterations >= max_iterations {
            warn!(
                "k-means stopped at the {} iteration cap without reaching a fixed point",
                max_iterations
            );
            break;
        }
    }

    let KMeansContext {
        current,
        assignment,
        ..
    } = ctx;
    Ok(Segmentation::from_region_keys(image, &assignment, current))
}

/// `k` distinct pixel indices: a shuffle of every index, truncated.
fn initial_centroids<R: Rng + ?Sized>(len: usize, k: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices
}

/// Working state of one clustering call.
struct KMeansContext {
    width: usize,
    /// Pixel index of each live cluster's representative
    centroids: Vec<usize>,
    /// Colors the next pass measures against; after a swap, the latest recoloring
    current: Vec<u32>,
    /// Recoloring being built; after a swap, the previous colors
    next: Vec<u32>,
    /// Cluster ordinal of each pixel from the latest pass
    assignment: Vec<usize>,
}

impl KMeansContext {
    fn new(image: &PixelBuffer, centroids: Vec<usize>) -> Self {
        let len = image.len();
        Self {
            width: image.width(),
            centroids,
            current: image.pixels().to_vec(),
            next: vec![0; len],
            assignment: vec![0; len],
        }
    }

    fn assign(&mut self) {
        let centroid_colors: Vec<Argb> = self
            .centroids
            .iter()
            .map(|&c| Argb(self.current[c]))
            .collect();

        for (i, &raw) in self.current.iter().enumerate() {
            let color = Argb(raw);
            let mut best = 0;
            let mut best_dist = u32::MAX;
            for (ordinal, &center) in centroid_colors.iter().enumerate() {
                let dist = color.distance_squared(center);
                if dist < best_dist {
                    best_dist = dist;
                    best = ordinal;
                }
            }
            self.next[i] = centroid_colors[best].0;
            self.assignment[i] = best;
        }

        // A centroid always belongs to its own cluster.
        for (ordinal, &c) in self.centroids.iter().enumerate() {
            self.assignment[c] = ordinal;
        }
    }

    /// Move each centroid to the floor of its members' mean row and column.
    /// Clusters without members are dropped for good.
    fn update_centroids(&mut self) {
        let n = self.centroids.len();
        let mut row_sum = vec![0usize; n];
        let mut col_sum = vec![0usize; n];
        let mut count = vec![0usize; n];

        for (i, &ordinal) in self.assignment.iter().enumerate() {
            row_sum[ordinal] += i / self.width;
            col_sum[ordinal] += i % self.width;
            count[ordinal] += 1;
        }

        self.centroids = (0..n)
            .filter(|&c| count[c] > 0)
            .map(|c| (row_sum[c] / count[c]) * self.width + col_sum[c] / count[c])
            .collect();
    }

    fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    fn changed(&self) -> bool {
        self.current != self.next
    }
}
