// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Radius estimation for an accepted circle center.

/// Radius with the best edge support among `distances`.
///
/// `distances` must be sorted ascending. They are swept in bands no wider
/// than `band`; each band is scored by its point count relative to its
/// median radius, so larger circles do not win merely for having a longer
/// circumference. On an equal ratio the earlier, smaller-radius band is
/// kept. Returns `(radius, support)` of the best band, or `None` when there
/// are no distances.
pub(crate) fn best_radius(distances: &[f32], band: f32) -> Option<(f32, usize)> {
    let first = *distances.first()?;

    let mut best_r = 0.0f32;
    let mut best_count = 0usize;
    let mut start_idx = 0usize;
    let mut start_dist = first;

    let mut score = |start: usize, end: usize| {
        let count = end - start;
        let r_cur = distances[(start + end - 1) / 2];
        if best_count == 0 || count as f32 * best_r > best_count as f32 * r_cur {
            best_r = r_cur;
            best_count = count;
        }
    };

    for (j, &d) in distances.iter().enumerate().skip(1) {
        if d - start_dist > band {
            score(start_idx, j);
            start_idx = j;
            start_dist = d;
        }
    }
    score(start_idx, distances.len());

    Some((best_r, best_count))
}
