// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Center voting for the gradient Hough circle transform.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Edge pixel with its Sobel gradient.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgePoint {
    pub x: u32,
    pub y: u32,
    pub gx: f32,
    pub gy: f32,
}

/// Canny edges of `gray` that carry a non-zero gradient.
pub(crate) fn edge_points(gray: &GrayImage, canny_high: f32) -> Vec<EdgePoint> {
    let edges = canny(gray, canny_high / 2.0, canny_high);
    let gx: ImageBuffer<Luma<i16>, Vec<i16>> = horizontal_sobel(gray);
    let gy: ImageBuffer<Luma<i16>, Vec<i16>> = vertical_sobel(gray);

    edges
        .enumerate_pixels()
        .filter(|(_, _, px)| px.0[0] != 0)
        .filter_map(|(x, y, _)| {
            let dx = gx.get_pixel(x, y).0[0] as f32;
            let dy = gy.get_pixel(x, y).0[0] as f32;
            (dx != 0.0 || dy != 0.0).then_some(EdgePoint { x, y, gx: dx, gy: dy })
        })
        .collect()
}

/// Vote grid at `1/dp` of the image resolution, padded by one cell on every
/// side so that neighbour lookups never leave the buffer.
pub(crate) struct Accumulator {
    cols: usize,
    rows: usize,
    stride: usize,
    dp: f32,
    votes: Vec<u32>,
}

impl Accumulator {
    /// `None` when the image is too small to hold a single cell.
    pub fn new(width: u32, height: u32, dp: f32) -> Option<Self> {
        let cols = (width as f32 / dp) as usize;
        let rows = (height as f32 / dp) as usize;
        if cols == 0 || rows == 0 {
            return None;
        }
        let stride = cols + 2;
        Some(Self {
            cols,
            rows,
            stride,
            dp,
            votes: vec![0; stride * (rows + 2)],
        })
    }

    /// Cast votes along the gradient line of `point`, in both directions,
    /// for every radius in `min_radius..=max_radius`.
    pub fn vote(&mut self, point: &EdgePoint, min_radius: u32, max_radius: u32) {
        let inv_dp = 1.0 / self.dp;
        let magnitude = point.gx.hypot(point.gy);
        let step_x = point.gx * inv_dp / magnitude;
        let step_y = point.gy * inv_dp / magnitude;
        let origin_x = point.x as f32 * inv_dp;
        let origin_y = point.y as f32 * inv_dp;

        for sign in [1.0f32, -1.0] {
            let (sx, sy) = (step_x * sign, step_y * sign);
            for r in min_radius..=max_radius {
                let cx = (origin_x + r as f32 * sx).floor();
                let cy = (origin_y + r as f32 * sy).floor();
                if cx < 0.0 || cy < 0.0 || cx >= self.cols as f32 || cy >= self.rows as f32 {
                    break;
                }
                let idx = self.index(cx as usize, cy as usize);
                self.votes[idx] += 1;
            }
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (y + 1) * self.stride + x + 1
    }

    /// Votes summed over the 3×3 block around every interior cell. Padding
    /// cells stay zero.
    fn block_sums(&self) -> Vec<u32> {
        let mut sums = vec![0; self.votes.len()];
        for y in 0..self.rows {
            for x in 0..self.cols {
                let idx = self.index(x, y);
                sums[idx] = self.block(idx).map(|(_, _, v)| v).sum();
            }
        }
        sums
    }

    /// Raw votes of the 3×3 block centred on `idx`, with cell offsets.
    fn block(&self, idx: usize) -> impl Iterator<Item = (f32, f32, u32)> + '_ {
        (-1isize..=1).flat_map(move |dy| {
            (-1isize..=1).map(move |dx| {
                let at = idx.wrapping_add_signed(dy * self.stride as isize + dx);
                (dx as f32, dy as f32, self.votes[at])
            })
        })
    }

    /// Local maxima of the block-summed votes above `threshold`, strongest
    /// first.
    ///
    /// A cell must beat its left and upper neighbours strictly and match or
    /// beat its right and lower neighbours, so plateaus yield one candidate.
    /// Ties keep raster order. The reported position is the vote-weighted
    /// centroid of the block, so a plateau corner still lands on its votes.
    pub fn centers(&self, threshold: u32) -> Vec<Candidate> {
        let sums = self.block_sums();
        let mut found = Vec::new();
        for y in 0..self.rows {
            for x in 0..self.cols {
                let idx = self.index(x, y);
                let v = sums[idx];
                if v > threshold
                    && v > sums[idx - 1]
                    && v >= sums[idx + 1]
                    && v > sums[idx - self.stride]
                    && v >= sums[idx + self.stride]
                {
                    let (mut ox, mut oy) = (0.0f32, 0.0f32);
                    for (dx, dy, w) in self.block(idx) {
                        ox += dx * w as f32;
                        oy += dy * w as f32;
                    }
                    let total = v as f32;
                    found.push(Candidate {
                        x: (x as f32 + ox / total + 0.5) * self.dp,
                        y: (y as f32 + oy / total + 0.5) * self.dp,
                        votes: v,
                    });
                }
            }
        }
        found.sort_by(|a, b| b.votes.cmp(&a.votes));
        found
    }

    #[cfg(test)]
    pub fn votes_at(&self, x: usize, y: usize) -> u32 {
        self.votes[self.index(x, y)]
    }
}

/// Candidate circle center in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub x: f32,
    pub y: f32,
    pub votes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_image_has_no_accumulator() {
        assert!(Accumulator::new(1, 1, 1.5).is_none());
        assert!(Accumulator::new(2, 2, 1.5).is_some());
    }

    #[test]
    fn vote_walks_both_directions() {
        let mut acc = Accumulator::new(40, 40, 1.0).expect("acc");
        let point = EdgePoint { x: 20, y: 20, gx: 1.0, gy: 0.0 };
        acc.vote(&point, 5, 5);
        assert_eq!(acc.votes_at(25, 20), 1);
        assert_eq!(acc.votes_at(15, 20), 1);
        assert_eq!(acc.votes_at(20, 20), 0);
    }

    #[test]
    fn vote_stops_at_border() {
        let mut acc = Accumulator::new(10, 10, 1.0).expect("acc");
        let point = EdgePoint { x: 8, y: 5, gx: 1.0, gy: 0.0 };
        // Forward walk leaves the grid immediately; backward walk covers x=6..=0.
        acc.vote(&point, 2, 20);
        assert_eq!(acc.votes_at(9, 5), 0);
        assert_eq!(acc.votes_at(6, 5), 1);
        assert_eq!(acc.votes_at(0, 5), 1);
    }

    #[test]
    fn centers_are_sorted_and_thresholded() {
        let mut acc = Accumulator::new(30, 30, 1.0).expect("acc");
        let strong = EdgePoint { x: 10, y: 10, gx: 1.0, gy: 0.0 };
        let weak = EdgePoint { x: 10, y: 25, gx: 1.0, gy: 0.0 };
        for _ in 0..5 {
            acc.vote(&strong, 4, 4);
        }
        for _ in 0..3 {
            acc.vote(&weak, 4, 4);
        }

        let centers = acc.centers(2);
        assert_eq!(centers.len(), 4);
        assert_eq!(centers[0].votes, 5);
        assert_eq!(centers[3].votes, 3);
        // An isolated cell is reported at its own center.
        assert_eq!((centers[0].x, centers[0].y), (6.5, 10.5));
        assert!(acc.centers(5).is_empty());
    }

    #[test]
    fn split_votes_merge_into_one_center() {
        let mut acc = Accumulator::new(30, 30, 1.0).expect("acc");
        let left = EdgePoint { x: 5, y: 10, gx: 1.0, gy: 0.0 };
        let right = EdgePoint { x: 6, y: 10, gx: 1.0, gy: 0.0 };
        for _ in 0..3 {
            acc.vote(&left, 5, 5);
            acc.vote(&right, 5, 5);
        }
        assert_eq!(acc.votes_at(10, 10), 3);
        assert_eq!(acc.votes_at(11, 10), 3);

        // Neither cell alone clears the threshold; together they do.
        let centers = acc.centers(4);
        let forward: Vec<_> = centers.iter().filter(|c| c.x > 5.0).collect();
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].votes, 6);
        assert!((forward[0].x - 11.0).abs() < 1e-4, "x = {}", forward[0].x);
        assert!((forward[0].y - 10.5).abs() < 1e-4, "y = {}", forward[0].y);
    }

    #[test]
    fn edge_points_of_flat_image_are_empty() {
        let flat = GrayImage::from_pixel(32, 32, Luma([90u8]));
        assert!(edge_points(&flat, 100.0).is_empty());
    }

    #[test]
    fn edge_points_follow_disk_boundary() {
        let img = crate::test_support::disks(80, 80, &[(40, 40, 20)]);
        let points = edge_points(&img, 100.0);
        assert!(points.len() > 60, "only {} edge points", points.len());
        for p in &points {
            let d = ((p.x as f32 - 40.0).powi(2) + (p.y as f32 - 40.0).powi(2)).sqrt();
            assert!((d - 20.0).abs() < 4.0, "edge point {p:?} at distance {d}");
        }
    }
}
