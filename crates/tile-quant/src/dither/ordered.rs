//! Ordered dithering over an error-diffusion candidate walk

use crate::color::{brightness, Color};
use crate::options::DitherPattern;
use crate::palette::{ColorFinder, Palette};
use crate::tile::{Pixel, Tile};

/// Maximum candidates any pattern ranks.
pub const MAX_LEVELS: usize = 4;

/// One step of the candidate walk. Only lives inside a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DitherCandidate {
    /// Palette slot.
    pub index: usize,
    /// Distance between the compared color and the slot color.
    pub distance: f64,
    /// Error-adjusted pixel color the slot was matched against (gamma space).
    pub compared: Color,
    /// Brightness of the bit-depth reduced slot color in linear space.
    pub brightness: f64,
}

/// Dithered lookup: error-diffusion candidates ranked by brightness and
/// selected by a 2×2 spatial pattern.
#[derive(Debug, Clone, Copy)]
pub struct DitherNearestColorFinder {
    pattern: DitherPattern,
    weight: f64,
    bits: u8,
}

impl DitherNearestColorFinder {
    /// Create a finder for `pattern`, diffusing `weight` of the running
    /// error and reducing candidates to `bits` per channel.
    pub fn new(pattern: DitherPattern, weight: f64, bits: u8) -> Self {
        Self {
            pattern,
            weight,
            bits,
        }
    }

    /// Run the candidate walk for `color`, writing into `out` and returning
    /// the filled prefix sorted by ascending brightness.
    ///
    /// The prefix has exactly [`DitherPattern::levels`] entries. The sort is
    /// stable, so equal brightness keeps walk order.
    pub fn candidates<'a>(
        &self,
        palette: &Palette,
        color: &Color,
        out: &'a mut [DitherCandidate; MAX_LEVELS],
    ) -> &'a [DitherCandidate] {
        let levels = self.pattern.levels();
        let target = color.to_linear();
        let mut error = Color::BLACK;

        for slot in out.iter_mut().take(levels) {
            let compared = (target + error * self.weight).clamp_linear().to_srgb();
            let (index, distance) = palette.nearest(&compared);
            let chosen = palette[index].to_nbit(self.bits).to_linear();
            *slot = DitherCandidate {
                index,
                distance,
                compared,
                brightness: brightness(&chosen),
            };
            error += target - chosen;
        }

        let ranked = &mut out[..levels];
        ranked.sort_by(|a, b| a.brightness.total_cmp(&b.brightness));
        ranked
    }

    /// Slot chosen for `color` at image position `(x, y)`.
    #[inline]
    pub fn select(&self, palette: &Palette, color: &Color, x: u32, y: u32) -> usize {
        let mut buf = [DitherCandidate::default(); MAX_LEVELS];
        let ranked = self.candidates(palette, color, &mut buf);
        ranked[self.pattern.rank(x, y)].index
    }
}

impl ColorFinder for DitherNearestColorFinder {
    #[inline]
    fn find(&self, palette: &Palette, pixel: &Pixel) -> usize {
        self.select(palette, &pixel.color, pixel.x, pixel.y)
    }

    fn tile_error(&self, palette: &Palette, tile: &Tile) -> f64 {
        tile.pixels
            .iter()
            .map(|p| p.color.distance(&palette[self.find(palette, p)]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn gray(v: f64) -> Color {
        Color::new(v, v, v)
    }

    fn random_color(rng: &mut StdRng) -> Color {
        Color::new(
            rng.gen_range(0.0..=255.0),
            rng.gen_range(0.0..=255.0),
            rng.gen_range(0.0..=255.0),
        )
    }

    fn black_white() -> Palette {
        Palette::new(vec![gray(0.0), gray(255.0)])
    }

    #[test]
    fn test_candidate_count_matches_pattern() {
        let palette = Palette::new(vec![gray(0.0), gray(80.0), gray(160.0), gray(255.0)]);
        for pattern in DitherPattern::ALL {
            let finder = DitherNearestColorFinder::new(pattern, 0.5, 5);
            let mut buf = [DitherCandidate::default(); MAX_LEVELS];
            let ranked = finder.candidates(&palette, &gray(120.0), &mut buf);
            assert_eq!(ranked.len(), pattern.levels(), "{pattern}");
            assert!(ranked
                .windows(2)
                .all(|w| w[0].brightness <= w[1].brightness));
        }
    }

    #[test]
    fn test_candidates_record_the_walk() {
        let palette = black_white();
        let mid = gray(128.0);

        // Without diffusion every step compares the input itself
        let finder = DitherNearestColorFinder::new(DitherPattern::Diagonal4, 0.0, 8);
        let mut buf = [DitherCandidate::default(); MAX_LEVELS];
        for candidate in finder.candidates(&palette, &mid, &mut buf) {
            assert_eq!(candidate.compared, mid);
            assert_eq!(candidate.index, 1);
            assert_eq!(candidate.distance, mid.distance(&palette[1]));
        }

        // With diffusion the compared color drifts, distance follows it
        let finder = DitherNearestColorFinder::new(DitherPattern::Diagonal4, 1.0, 8);
        let mut buf = [DitherCandidate::default(); MAX_LEVELS];
        let ranked = finder.candidates(&palette, &mid, &mut buf);
        assert!(ranked.iter().any(|c| c.compared != mid));
        assert!(ranked.iter().any(|c| c.index == 0) && ranked.iter().any(|c| c.index == 1));
        for candidate in ranked {
            assert_eq!(
                candidate.distance,
                candidate.compared.distance(&palette[candidate.index])
            );
        }
    }

    #[test]
    fn test_selection_is_always_a_valid_slot() {
        let mut rng = StdRng::seed_from_u64(3);
        let palette = Palette::new(
            (0..5)
                .map(|_| random_color(&mut rng))
                .collect(),
        );
        for pattern in DitherPattern::ALL {
            let finder = DitherNearestColorFinder::new(pattern, 1.0, 4);
            for _ in 0..200 {
                let color = random_color(&mut rng);
                let x = rng.gen_range(0..64);
                let y = rng.gen_range(0..64);
                let mut buf = [DitherCandidate::default(); MAX_LEVELS];
                let ranked: Vec<usize> = finder
                    .candidates(&palette, &color, &mut buf)
                    .iter()
                    .map(|c| c.index)
                    .collect();
                let chosen = finder.select(&palette, &color, x, y);
                assert!(chosen < palette.len());
                assert!(ranked.contains(&chosen));
            }
        }
    }

    #[test]
    fn test_mid_gray_alternates_in_checkerboard() {
        // Linear midpoint between black and white
        let mid = gray((255.0f64 * 255.0 / 2.0).sqrt());
        let finder = DitherNearestColorFinder::new(DitherPattern::Diagonal2, 1.0, 8);
        let palette = black_white();
        let a = finder.select(&palette, &mid, 0, 0);
        let b = finder.select(&palette, &mid, 1, 0);
        assert_ne!(a, b);
        assert_eq!(a, finder.select(&palette, &mid, 1, 1));
    }

    #[test]
    fn test_zero_weight_collapses_to_nearest() {
        let finder = DitherNearestColorFinder::new(DitherPattern::Diagonal4, 0.0, 8);
        let palette = black_white();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(finder.select(&palette, &gray(200.0), x, y), 1);
            assert_eq!(finder.select(&palette, &gray(20.0), x, y), 0);
        }
    }

    #[test]
    fn test_exact_palette_color_is_kept() {
        let finder = DitherNearestColorFinder::new(DitherPattern::Diagonal4, 0.5, 8);
        let palette = Palette::new(vec![gray(0.0), gray(100.0), gray(255.0)]);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(finder.select(&palette, &gray(100.0), x, y), 1);
        }
    }
}
