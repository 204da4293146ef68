//! WebAssembly interface for the segmenter.

use crate::buffer::PixelBuffer;
use crate::error::SegmentError;
use crate::graph::{Connectivity, GraphConfig};
use crate::kmeans::KMeansConfig;
use crate::segmentation::{segment_image, Segmentation, SegmentationMethod};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmSegmenter {
    kmeans: KMeansConfig,
    graph: GraphConfig,
    method: u8,
}

#[wasm_bindgen]
impl WasmSegmenter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            kmeans: KMeansConfig::default(),
            graph: GraphConfig::default(),
            method: 1,
        }
    }

    /// 0 = K-means, anything else = graph partitioning
    pub fn set_method(&mut self, method: u8) {
        self.method = method;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.kmeans.seed = Some(seed);
    }

    pub fn set_random_seed(&mut self) {
        self.kmeans.seed = None;
    }

    pub fn set_max_iterations(&mut self, iterations: usize) {
        self.kmeans.max_iterations = iterations;
    }

    /// 4 or 8
    pub fn set_connectivity(&mut self, neighbors: u8) {
        self.graph.connectivity = match neighbors {
            4 => Connectivity::Four,
            _ => Connectivity::Eight,
        };
    }

    pub fn set_min_size_divisor(&mut self, divisor: usize) {
        self.graph.min_size_divisor = divisor;
    }

    /// Segment canvas RGBA bytes into `segments` regions.
    pub fn process(
        &self,
        image_data: &[u8],
        width: usize,
        height: usize,
        segments: usize,
    ) -> Result<WasmSegmentResult, JsError> {
        let image = PixelBuffer::from_rgba_bytes(image_data, width, height)?;
        let method = if self.method == 0 {
            SegmentationMethod::KMeans(self.kmeans.clone())
        } else {
            SegmentationMethod::Graph(self.graph.clone())
        };
        let result = segment_image(&image, segments, &method)?;
        Ok(WasmSegmentResult::try_from(result)?)
    }
}

impl Default for WasmSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
pub struct WasmSegmentResult {
    width: usize,
    height: usize,
    num_segments: usize,
    rgba_data: Vec<u8>,
    labels: Vec<u32>,
}

#[wasm_bindgen]
impl WasmSegmentResult {
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn num_segments(&self) -> usize {
        self.num_segments
    }
    pub fn get_rgba_data(&self) -> Vec<u8> {
        self.rgba_data.clone()
    }
    pub fn get_labels(&self) -> Vec<u32> {
        self.labels.clone()
    }
}

impl TryFrom<Segmentation> for WasmSegmentResult {
    type Error = SegmentError;

    fn try_from(result: Segmentation) -> Result<Self, Self::Error> {
        let labels = result.labels.iter().map(|&l| l as u32).collect();
        let width = result.width;
        let height = result.height;
        let num_segments = result.num_segments;
        let rgba_data = result.into_buffer()?.to_rgba_bytes();
        Ok(Self {
            width,
            height,
            num_segments,
            rgba_data,
            labels,
        })
    }
}
