//! Palette and slot reordering.
//!
//! Sorting runs after learning and never changes which colors a palette
//! holds, only where they sit:
//!
//! 1. For every pair of palettes a slot correspondence is found by random
//!    swaps, and its total distance becomes the distance between the pair.
//! 2. Palettes are ordered as an open path with 2-opt segment reversals.
//! 3. The first palette's slots are ordered the same way.
//! 4. Every following palette inherits its slot order from the previous one
//!    through the correspondence, then is tuned by swaps that favor matching
//!    the slot above and the neighbors to the left and right.
//!
//! Slots below `start_index` (the shared color) are never moved.

use rand::Rng;

use crate::color::Color;
use crate::palette::{Palette, PaletteSet};

const PAIR_TRIALS: usize = 2_000;
const PATH_TRIALS: usize = 100_000;
const CHAIN_TRIALS: usize = 10_000;

const VERTICAL_WEIGHT: f64 = 2.0;
const HORIZONTAL_WEIGHT: f64 = 1.0;

/// Randomized reordering of palettes and their slots.
#[derive(Debug, Clone, Copy)]
pub struct PaletteSorter {
    start_index: usize,
}

impl PaletteSorter {
    /// Create a sorter that leaves slots below `start_index` in place.
    pub fn new(start_index: usize) -> Self {
        Self { start_index }
    }

    /// Reorder `set`. Palettes must share one length.
    pub fn sort<R: Rng>(&self, set: &PaletteSet, rng: &mut R) -> PaletteSet {
        let Some(len) = set.uniform_len() else {
            return set.clone();
        };
        if len <= self.start_index + 1 {
            return set.clone();
        }
        let count = set.len();

        // Pass 1: correspondence between every pair
        let mut distance = vec![vec![0.0; count]; count];
        let mut mapping = vec![vec![Vec::new(); count]; count];
        for a in 0..count {
            for b in (a + 1)..count {
                let (map, cost) = self.match_slots(&set[a], &set[b], rng);
                distance[a][b] = cost;
                distance[b][a] = cost;
                mapping[b][a] = invert(&map);
                mapping[a][b] = map;
            }
        }

        // Pass 2: palette order
        let mut order: Vec<usize> = (0..count).collect();
        optimize_path(&mut order, 0, rng, |a, b| distance[a][b]);
        tracing::debug!(
            cost = path_cost(&order, |a, b| distance[a][b]),
            "Ordered palettes"
        );

        // Pass 3: slots of the first palette
        let first = &set[order[0]];
        let mut slots: Vec<usize> = (0..len).collect();
        optimize_path(&mut slots, self.start_index, rng, |a, b| {
            first[a].distance(&first[b])
        });

        let mut sorted = PaletteSet::new(Vec::with_capacity(count));
        sorted.push(Palette::new(slots.iter().map(|&s| first[s]).collect()));

        // Pass 4: chain the rest through the correspondences
        for k in 1..count {
            let map = &mapping[order[k - 1]][order[k]];
            let current = &set[order[k]];
            slots = slots.iter().map(|&s| map[s]).collect();
            if len >= 4 {
                self.tune_against(&mut slots, current, sorted[k - 1].colors(), rng);
            }
            sorted.push(Palette::new(slots.iter().map(|&s| current[s]).collect()));
        }

        sorted
    }

    /// Slot mapping from `a` to `b` minimizing the summed distance of paired
    /// slots, and that sum.
    fn match_slots<R: Rng>(&self, a: &Palette, b: &Palette, rng: &mut R) -> (Vec<usize>, f64) {
        let len = a.len();
        let mut map: Vec<usize> = (0..len).collect();
        let pair = |i: usize, j: usize| a[i].distance(&b[j]);

        for _ in 0..PAIR_TRIALS {
            let i = rng.gen_range(self.start_index..len);
            let j = rng.gen_range(self.start_index..len);
            if i == j {
                continue;
            }
            let before = pair(i, map[i]) + pair(j, map[j]);
            let after = pair(i, map[j]) + pair(j, map[i]);
            if after < before {
                map.swap(i, j);
            }
        }

        let cost = (0..len).map(|i| pair(i, map[i])).sum();
        (map, cost)
    }

    /// Swap entries of `slots` (source slots of `palette`) while the
    /// weighted cost against `above` and the left/right neighbors drops.
    fn tune_against<R: Rng>(
        &self,
        slots: &mut [usize],
        palette: &Palette,
        above: &[Color],
        rng: &mut R,
    ) {
        let len = slots.len();
        let mut colors: Vec<Color> = slots.iter().map(|&s| palette[s]).collect();
        for _ in 0..CHAIN_TRIALS {
            let i = rng.gen_range(self.start_index..len);
            let j = rng.gen_range(self.start_index..len);
            if i == j {
                continue;
            }
            let before = local_cost(&colors, above, i, j);
            colors.swap(i, j);
            let after = local_cost(&colors, above, i, j);
            if after < before {
                slots.swap(i, j);
            } else {
                colors.swap(i, j);
            }
        }
    }
}

/// Cost terms of a chained palette that involve slot `i` or `j`.
fn local_cost(colors: &[Color], above: &[Color], i: usize, j: usize) -> f64 {
    let mut cost = VERTICAL_WEIGHT
        * (colors[i].distance(&above[i]) + colors[j].distance(&above[j]));

    let mut edges = [i.checked_sub(1), Some(i), j.checked_sub(1), Some(j)];
    // (left, left + 1) pairs; drop duplicates when i and j are adjacent
    edges.sort_unstable();
    let mut last = None;
    for left in edges.into_iter().flatten() {
        if left + 1 >= colors.len() || last == Some(left) {
            continue;
        }
        last = Some(left);
        cost += HORIZONTAL_WEIGHT * colors[left].distance(&colors[left + 1]);
    }
    cost
}

fn invert(map: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; map.len()];
    for (from, &to) in map.iter().enumerate() {
        inverse[to] = from;
    }
    inverse
}

fn path_cost(path: &[usize], dist: impl Fn(usize, usize) -> f64) -> f64 {
    path.windows(2).map(|w| dist(w[0], w[1])).sum()
}

/// Open-path 2-opt: reverse random segments of `path[start..]` whenever that
/// shortens the path.
fn optimize_path<R: Rng>(
    path: &mut [usize],
    start: usize,
    rng: &mut R,
    dist: impl Fn(usize, usize) -> f64,
) {
    let len = path.len();
    if len < start + 2 {
        return;
    }
    for _ in 0..PATH_TRIALS {
        let mut i = rng.gen_range(start..len);
        let mut j = rng.gen_range(start..len);
        if i == j {
            continue;
        }
        if i > j {
            std::mem::swap(&mut i, &mut j);
        }

        let mut before = 0.0;
        let mut after = 0.0;
        if i > 0 {
            before += dist(path[i - 1], path[i]);
            after += dist(path[i - 1], path[j]);
        }
        if j + 1 < len {
            before += dist(path[j], path[j + 1]);
            after += dist(path[i], path[j + 1]);
        }
        if after < before {
            path[i..=j].reverse();
        }
    }
}
