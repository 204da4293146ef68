//! End-to-end properties of both segmentation engines.

use smart_segmenter::prelude::*;
use std::collections::{HashSet, VecDeque};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every pixel a different color.
fn distinct_image(width: usize, height: usize) -> PixelBuffer {
    let pixels = (0..width * height)
        .map(|i| Argb::rgb((i % 251) as u8, (i * 3 % 256) as u8, (i / 251) as u8).0)
        .collect();
    PixelBuffer::new(pixels, width, height, false).unwrap()
}

/// Blocky image with a few flat regions and a soft gradient.
fn blocks_image(width: usize, height: usize) -> PixelBuffer {
    let pixels = (0..width * height)
        .map(|i| {
            let x = i % width;
            let y = i / width;
            let base = if x < width / 3 {
                (220u8, 30u8, 30u8)
            } else if y < height / 2 {
                (30, 200, 60)
            } else {
                (20, 40, 210)
            };
            Argb::rgb(base.0, base.1.saturating_add((x % 4) as u8), base.2).0
        })
        .collect();
    PixelBuffer::new(pixels, width, height, false).unwrap()
}

fn four_colors() -> PixelBuffer {
    PixelBuffer::new(
        vec![0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0xFFFF_FF00],
        2,
        2,
        false,
    )
    .unwrap()
}

fn distinct_colors(pixels: &[u32]) -> HashSet<u32> {
    pixels.iter().copied().collect()
}

/// True when every label's pixels form one connected component.
fn regions_connected(seg: &Segmentation, connectivity: Connectivity) -> bool {
    let (w, h) = (seg.width, seg.height);
    let mut seen = vec![false; w * h];
    let mut components_per_label = vec![0usize; seg.num_segments];

    for start in 0..w * h {
        if seen[start] {
            continue;
        }
        let label = seg.labels[start];
        components_per_label[label] += 1;
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            let (x, y) = ((idx % w) as isize, (idx / w) as isize);
            for dy in -1isize..=1 {
                for dx in -1isize..=1 {
                    if (dx, dy) == (0, 0) {
                        continue;
                    }
                    if connectivity == Connectivity::Four && dx != 0 && dy != 0 {
                        continue;
                    }
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                        continue;
                    }
                    let n = ny as usize * w + nx as usize;
                    if !seen[n] && seg.labels[n] == label {
                        seen[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
    }

    components_per_label.iter().all(|&c| c == 1)
}

#[test]
fn test_output_length_matches_input() {
    init_logging();
    let image = blocks_image(17, 11);
    for method in [
        SegmentationMethod::KMeans(KMeansConfig::default()),
        SegmentationMethod::Graph(GraphConfig::default()),
    ] {
        for n in [1, 3, 10] {
            let seg = segment_image(&image, n, &method).unwrap();
            assert_eq!(seg.pixels.len(), image.len());
            assert_eq!(seg.labels.len(), image.len());
        }
    }
}

#[test]
fn test_two_by_two_scenarios() {
    init_logging();
    let image = four_colors();
    let graph = GraphSegmenter::default();

    let one = graph.segment(&image, 1).unwrap();
    let colors = distinct_colors(&one.pixels);
    assert_eq!(colors.len(), 1);
    assert!(colors.is_subset(&distinct_colors(image.pixels())));

    let four = graph.segment(&image, 4).unwrap();
    assert_eq!(four.pixels, image.pixels());

    let kmeans = KMeansSegmenter::default().segment(&image, 4).unwrap();
    assert_eq!(kmeans.pixels, image.pixels());
}

#[test]
fn test_graph_exact_region_count() {
    init_logging();
    let image = distinct_image(9, 7);
    let input_colors = distinct_colors(image.pixels());
    for n in 1..=image.len() + 3 {
        let seg = GraphSegmenter::default().segment(&image, n).unwrap();
        let colors = distinct_colors(&seg.pixels);
        assert_eq!(colors.len(), n.min(image.len()), "n = {}", n);
        assert_eq!(seg.num_segments, n.min(image.len()));
        assert!(colors.is_subset(&input_colors));
    }
}

#[test]
fn test_graph_regions_are_connected() {
    init_logging();
    let image = blocks_image(24, 18);
    for connectivity in [Connectivity::Four, Connectivity::Eight] {
        let segmenter = GraphSegmenter::new(GraphConfig {
            connectivity,
            ..Default::default()
        });
        for n in [1, 2, 3, 7, 20, 60] {
            let seg = segmenter.segment(&image, n).unwrap();
            assert!(
                regions_connected(&seg, connectivity),
                "disconnected region with n = {} and {:?}",
                n,
                connectivity
            );
        }
    }
}

#[test]
fn test_graph_colors_come_from_region_members() {
    init_logging();
    let image = blocks_image(20, 20);
    let seg = GraphSegmenter::default().segment(&image, 5).unwrap();
    let colors = seg.segment_colors();
    for (label, color) in colors.iter().enumerate() {
        let member = (0..image.len()).any(|i| seg.labels[i] == label && image.pixels()[i] == color.0);
        assert!(member, "region {} painted with a foreign color", label);
    }
}

#[test]
fn test_kmeans_color_count_bounded() {
    init_logging();
    let image = blocks_image(30, 20);
    for k in [1, 2, 4, 8, 16] {
        let seg = KMeansSegmenter::default().segment(&image, k).unwrap();
        assert!(distinct_colors(&seg.pixels).len() <= k);
    }
}

#[test]
fn test_kmeans_fixed_seed_is_deterministic() {
    init_logging();
    let image = blocks_image(25, 25);
    let method = SegmentationMethod::KMeans(KMeansConfig {
        seed: Some(2024),
        ..Default::default()
    });
    let a = segment_image(&image, 6, &method).unwrap();
    let b = segment_image(&image, 6, &method).unwrap();
    assert_eq!(a.pixels, b.pixels);
    assert_eq!(a.labels, b.labels);
}

#[test]
fn test_kmeans_identity_when_k_is_pixel_count() {
    init_logging();
    let image = distinct_image(5, 4);
    let seg = KMeansSegmenter::default().segment(&image, 20).unwrap();
    let mut expected: Vec<u32> = image.pixels().to_vec();
    let mut actual = seg.pixels.clone();
    expected.sort_unstable();
    actual.sort_unstable();
    assert_eq!(actual, expected);
}

#[test]
fn test_uniform_image_unchanged() {
    init_logging();
    let image = PixelBuffer::new(vec![0xFF12_3456; 48], 8, 6, false).unwrap();
    for n in [1, 2, 5, 48, 100] {
        let graph = GraphSegmenter::default().segment(&image, n).unwrap();
        assert_eq!(graph.pixels, image.pixels());
    }
    for k in [1, 2, 5, 48] {
        let kmeans = KMeansSegmenter::default().segment(&image, k).unwrap();
        assert_eq!(kmeans.pixels, image.pixels());
    }
}

#[test]
fn test_alpha_flag_survives_round_trip() {
    init_logging();
    // A, B, G, R per pixel.
    let bytes: Vec<u8> = (0..12u8)
        .flat_map(|i| [0x80 + i, i * 20, 255 - i * 20, i * 10])
        .collect();
    let image = PixelBuffer::decode(&bytes, 4, 3, true).unwrap();

    let seg = GraphSegmenter::default().segment(&image, 12).unwrap();
    let out = seg.into_buffer().unwrap();
    assert!(out.has_alpha());
    assert_eq!(out.encode(), bytes);

    let seg = KMeansSegmenter::default().segment(&image, 3).unwrap();
    assert!(seg.has_alpha);
    assert_eq!(seg.into_buffer().unwrap().encode().len(), bytes.len());
}

#[test]
fn test_invalid_arguments() {
    init_logging();
    assert_eq!(
        PixelBuffer::new(vec![0; 5], 2, 2, false).unwrap_err(),
        SegmentError::DimensionMismatch {
            len: 5,
            width: 2,
            height: 2
        }
    );

    let image = four_colors();
    assert_eq!(
        GraphSegmenter::default().segment(&image, 0).unwrap_err(),
        SegmentError::InvalidSegmentCount(0)
    );
    assert_eq!(
        KMeansSegmenter::default().segment(&image, 0).unwrap_err(),
        SegmentError::InvalidSegmentCount(0)
    );
    assert!(matches!(
        KMeansSegmenter::default().segment(&image, 5),
        Err(SegmentError::TooManyClusters { k: 5, pixels: 4 })
    ));
}
