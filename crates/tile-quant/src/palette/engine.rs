//! Palette learning.
//!
//! The engine runs five phases over one [`PaletteSet`]:
//!
//! 1. [`seed`](PaletteEngine::seed): one palette grown from the mean color
//!    by repeatedly duplicating the color with the most residual error.
//! 2. [`split`](PaletteEngine::split): the worst palette is cloned until the
//!    set holds the configured number of palettes.
//! 3. [`replace_weak`](PaletteEngine::replace_weak): ten rounds of moving
//!    capacity from redundant colors and palettes to overloaded ones, keeping
//!    the lowest-error set seen.
//! 4. [`refine`](PaletteEngine::refine): a long run of small-step nudges.
//! 5. [`polish`](PaletteEngine::polish): three k-means rounds, plain mode only.
//!
//! A nudge samples one pixel, looks up its palette and slot through the
//! [`ColorFinder`], and moves that slot toward the pixel. Tile to palette
//! assignment is recomputed on every lookup since every nudge moves a color.

use rand::Rng;

use super::{ColorFinder, Palette, PaletteSet};
use crate::color::Color;
use crate::options::{ColorZeroBehavior, DitherMode, QuantizationOptions};
use crate::shuffle::RandomShuffle;
use crate::tile::{Tile, TileIndex};

const WEAK_REPLACEMENT_ROUNDS: usize = 10;
const KMEANS_ROUNDS: usize = 3;
const REFINE_FACTOR: usize = 10;

/// A color is replaced when removing it costs less than this share of the
/// worst color's error in the same palette.
const MIN_COLOR_FACTOR: f64 = 0.5;

/// A palette is replaced when removing it costs less than this share of the
/// worst palette's error.
const MIN_PALETTE_FACTOR: f64 = 0.5;

/// Learns a [`PaletteSet`] for the tiles of one image.
pub struct PaletteEngine<'a, R> {
    index: &'a TileIndex,
    finder: &'a dyn ColorFinder,
    shuffle: RandomShuffle<R>,
    set: PaletteSet,
    palette_count: usize,
    /// Colors per palette held by the engine (reserved transparent slot
    /// excluded).
    learned: usize,
    /// Leading slots that never move.
    pinned: usize,
    shared: Option<Color>,
    bits: u8,
    plain: bool,
    iterations: usize,
    alpha: f64,
    refine_alpha: f64,
}

impl<'a, R: Rng> PaletteEngine<'a, R> {
    /// Prepare an engine. No learning happens until [`seed`](Self::seed).
    pub fn new(
        index: &'a TileIndex,
        options: &QuantizationOptions,
        finder: &'a dyn ColorFinder,
        rng: R,
    ) -> Self {
        let slow = options.dither == DitherMode::Slow;
        let mut iterations = (options.fraction_of_pixels * index.pixel_count() as f64) as usize;
        if slow {
            iterations /= 5;
        }
        let shared = (options.color_zero == ColorZeroBehavior::Shared)
            .then(|| options.zero().to_nbit(options.bits_per_channel));

        Self {
            index,
            finder,
            shuffle: RandomShuffle::new(index.pixel_count(), rng),
            set: PaletteSet::default(),
            palette_count: options.palette_count,
            learned: options.learned_colors(),
            pinned: options.color_zero.pinned_slots(),
            shared,
            bits: options.bits_per_channel,
            plain: !options.dither.is_enabled(),
            iterations,
            alpha: if slow { 0.1 } else { 0.3 },
            refine_alpha: if slow { 0.02 } else { 0.05 },
        }
    }

    /// Current palettes.
    #[inline]
    pub fn palettes(&self) -> &PaletteSet {
        &self.set
    }

    /// Nudges per refinement pass.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Grow a single palette from the mean color until it holds every
    /// learned slot.
    pub fn seed(&mut self) {
        let mut colors = Vec::with_capacity(self.learned);
        if let Some(shared) = self.shared {
            colors.push(shared);
        }
        colors.push(self.index.mean_color());
        self.set = PaletteSet::new(vec![Palette::new(colors)]);

        while self.set[0].len() < self.learned {
            self.nudge(self.iterations, self.alpha);
            self.add_colors();
        }
        self.nudge(self.iterations, self.alpha);

        tracing::info!(colors = self.set[0].len(), mse = self.mse(), "Seeded palette");
    }

    /// Clone the worst palette until the set is full.
    pub fn split(&mut self) {
        while self.set.len() < self.palette_count {
            let errors = self.palette_errors();
            let worst = argmax(&errors, 0);
            let clone = self.set[worst].clone();
            self.set.push(clone);
            tracing::debug!(worst, error = errors[worst], "Split palette");
            self.nudge(self.iterations, self.alpha);
        }

        tracing::info!(palettes = self.set.len(), mse = self.mse(), "Split palettes");
    }

    /// Move capacity from redundant colors and palettes to overloaded ones,
    /// then keep the lowest-error set seen, entry state included.
    pub fn replace_weak(&mut self) {
        let mut best = self.set.clone();
        let mut best_mse = self.mse();

        for round in 0..WEAK_REPLACEMENT_ROUNDS {
            let stats = self.replacement_stats();
            self.replace_weak_colors(&stats);
            self.replace_weak_palette(&stats);
            self.nudge(self.iterations, self.alpha);

            let mse = self.mse();
            if mse < best_mse {
                tracing::debug!(round, mse, "New best palette set");
                best_mse = mse;
                best = self.set.clone();
            }
        }

        self.set = best;
        tracing::info!(mse = best_mse, "Replaced weak colors");
    }

    /// Long small-step refinement. In plain mode palettes are snapped to the
    /// output grid first.
    pub fn refine(&mut self) {
        if self.plain {
            self.set.reduce(self.bits);
        }
        self.nudge(self.iterations * REFINE_FACTOR, self.refine_alpha);
        tracing::info!(mse = self.mse(), "Refined palettes");
    }

    /// K-means polish. Does nothing when dithering.
    pub fn polish(&mut self) {
        if !self.plain {
            return;
        }
        for _ in 0..KMEANS_ROUNDS {
            self.kmeans_round();
        }
        tracing::info!(mse = self.mse(), "Polished palettes");
    }

    /// Snap to the output grid, restore the shared slot and hand back the
    /// palettes together with the generator.
    pub fn finish(mut self) -> (PaletteSet, R) {
        self.set.reduce(self.bits);
        if let Some(shared) = self.shared {
            for palette in self.set.iter_mut() {
                palette[0] = shared;
            }
        }
        (self.set, self.shuffle.into_rng())
    }

    /// Mean weighted distance per eligible pixel with each tile drawn by its
    /// best palette.
    pub fn mse(&self) -> f64 {
        let total: f64 = self
            .index
            .tiles()
            .iter()
            .map(|tile| self.rank_palettes(tile).1)
            .sum();
        total / self.index.pixel_count() as f64
    }

    fn nudge(&mut self, iterations: usize, alpha: f64) {
        for _ in 0..iterations {
            let Some(sample) = self.shuffle.next() else {
                return;
            };
            let index = self.index;
            let pixel = index.pixel(sample);
            let tile = index.tile(pixel.tile);
            let p = self.finder.nearest_palette(&self.set, tile);
            let slot = self.finder.find(&self.set[p], pixel);
            if slot < self.pinned {
                continue;
            }
            self.set[p][slot].move_closer(&pixel.color, alpha);
        }
    }

    /// Duplicate the highest-error color of every palette that is not yet
    /// full, measured over the tiles each palette draws.
    fn add_colors(&mut self) {
        if self.set.iter().any(Palette::is_empty) {
            return;
        }

        let mut errors: Vec<Vec<f64>> = self.set.iter().map(|p| vec![0.0; p.len()]).collect();
        for tile in self.index.tiles() {
            let p = self.finder.nearest_palette(&self.set, tile);
            for (color, count) in tile.histogram() {
                let (slot, distance) = self.set[p].nearest(color);
                errors[p][slot] += distance * count as f64;
            }
        }

        for (palette, errors) in self.set.iter_mut().zip(&errors) {
            if palette.len() < self.learned {
                let worst = argmax(errors, self.pinned.min(palette.len() - 1));
                palette.push(palette[worst]);
            }
        }
    }

    fn palette_errors(&self) -> Vec<f64> {
        let mut errors = vec![0.0; self.set.len()];
        for tile in self.index.tiles() {
            let (p, error, _) = self.rank_palettes(tile);
            errors[p] += error;
        }
        errors
    }

    /// Best palette for `tile`, its error and the error of the runner-up.
    ///
    /// With a single palette the runner-up error equals the best error.
    fn rank_palettes(&self, tile: &Tile) -> (usize, f64, f64) {
        let mut best = (0, f64::INFINITY);
        let mut second = f64::INFINITY;
        for (i, palette) in self.set.iter().enumerate() {
            let error = self.finder.tile_error(palette, tile);
            if error < best.1 {
                second = best.1;
                best = (i, error);
            } else if error < second {
                second = error;
            }
        }
        if !second.is_finite() {
            second = best.1;
        }
        (best.0, best.1, second)
    }

    fn replacement_stats(&self) -> ReplacementStats {
        let mut stats = ReplacementStats {
            palette_error: vec![0.0; self.set.len()],
            palette_removal: vec![0.0; self.set.len()],
            color_error: self.set.iter().map(|p| vec![0.0; p.len()]).collect(),
            color_removal: self.set.iter().map(|p| vec![0.0; p.len()]).collect(),
        };

        for tile in self.index.tiles() {
            let (p, best, second) = self.rank_palettes(tile);
            stats.palette_error[p] += best;
            stats.palette_removal[p] += second - best;

            for (color, count) in tile.histogram() {
                let (slot, nearest, runner_up) = self.set[p].nearest_two(color);
                let count = count as f64;
                stats.color_error[p][slot] += nearest * count;
                stats.color_removal[p][slot] += (runner_up - nearest) * count;
            }
        }
        stats
    }

    /// In every palette, overwrite the cheapest-to-remove color with a copy
    /// of the color carrying the most error.
    fn replace_weak_colors(&mut self, stats: &ReplacementStats) {
        let pinned = self.pinned;
        for (p, palette) in self.set.iter_mut().enumerate() {
            if palette.len() < pinned + 2 {
                continue;
            }
            let errors = &stats.color_error[p];
            let removal = &stats.color_removal[p];
            let worst = argmax(errors, pinned);
            let Some(weakest) = (pinned..palette.len())
                .filter(|&c| c != worst)
                .min_by(|&a, &b| removal[a].total_cmp(&removal[b]))
            else {
                continue;
            };

            if removal[weakest] < MIN_COLOR_FACTOR * errors[worst] {
                tracing::debug!(
                    palette = p,
                    weakest,
                    worst,
                    cost = removal[weakest],
                    "Replaced weak color"
                );
                palette[weakest] = palette[worst];
            }
        }
    }

    /// Overwrite the cheapest-to-remove palette with a copy of the palette
    /// carrying the most error.
    fn replace_weak_palette(&mut self, stats: &ReplacementStats) {
        if self.set.len() < 2 {
            return;
        }
        let worst = argmax(&stats.palette_error, 0);
        let weakest = argmin(&stats.palette_removal);
        if weakest == worst {
            return;
        }
        if stats.palette_removal[weakest] < MIN_PALETTE_FACTOR * stats.palette_error[worst] {
            tracing::debug!(
                weakest,
                worst,
                cost = stats.palette_removal[weakest],
                "Replaced weak palette"
            );
            self.set[weakest] = self.set[worst].clone();
        }
    }

    fn kmeans_round(&mut self) {
        let mut sums: Vec<Vec<(Color, f64)>> = self
            .set
            .iter()
            .map(|p| vec![(Color::BLACK, 0.0); p.len()])
            .collect();

        for tile in self.index.tiles() {
            let p = self.finder.nearest_palette(&self.set, tile);
            for (color, count) in tile.histogram() {
                let slot = self.set[p].nearest(color).0;
                if slot < self.pinned {
                    continue;
                }
                let count = count as f64;
                let entry = &mut sums[p][slot];
                entry.0 += *color * count;
                entry.1 += count;
            }
        }

        for (palette, sums) in self.set.iter_mut().zip(sums) {
            for (slot, (sum, count)) in sums.into_iter().enumerate() {
                if count > 0.0 {
                    palette[slot] = sum * (1.0 / count);
                }
            }
        }
    }
}

struct ReplacementStats {
    palette_error: Vec<f64>,
    /// Extra error if the palette were unavailable to its tiles.
    palette_removal: Vec<f64>,
    color_error: Vec<Vec<f64>>,
    /// Extra error if the color were unavailable to its samples.
    color_removal: Vec<Vec<f64>>,
}

/// Index of the largest value at or after `start`. Ties go to the lowest
/// index; an empty range yields `start`.
fn argmax(values: &[f64], start: usize) -> usize {
    let mut best = start;
    for i in start..values.len() {
        if values[i] > values[best] {
            best = i;
        }
    }
    best
}

fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for i in 1..values.len() {
        if values[i] < values[best] {
            best = i;
        }
    }
    best
}
