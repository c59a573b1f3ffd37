//! Palette and palette-set value types

use std::ops::{Index, IndexMut};

use crate::color::Color;

/// An ordered list of colors assignable to a tile.
///
/// Slot order is significant: with the shared color-zero policy slot 0 is
/// pinned to the shared color.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette from its colors.
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Append a copy of `color`.
    #[inline]
    pub fn push(&mut self, color: Color) {
        self.colors.push(color);
    }

    /// Index and distance of the nearest color. Ties go to the lowest index.
    ///
    /// Returns `(0, f64::INFINITY)` for an empty palette.
    pub fn nearest(&self, color: &Color) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (i, c) in self.colors.iter().enumerate() {
            let d = c.distance(color);
            if d < best.1 {
                best = (i, d);
            }
        }
        best
    }

    /// Nearest and second-nearest distances.
    ///
    /// With a single color the second distance equals the first.
    pub fn nearest_two(&self, color: &Color) -> (usize, f64, f64) {
        let mut best = (0, f64::INFINITY);
        let mut second = f64::INFINITY;
        for (i, c) in self.colors.iter().enumerate() {
            let d = c.distance(color);
            if d < best.1 {
                second = best.1;
                best = (i, d);
            } else if d < second {
                second = d;
            }
        }
        if !second.is_finite() {
            second = best.1;
        }
        (best.0, best.1, second)
    }

    /// Snap every color to the N-bit grid.
    pub fn reduce(&mut self, bits: u8) {
        for c in &mut self.colors {
            *c = c.to_nbit(bits);
        }
    }
}

impl Index<usize> for Palette {
    type Output = Color;

    #[inline]
    fn index(&self, index: usize) -> &Color {
        &self.colors[index]
    }
}

impl IndexMut<usize> for Palette {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Color {
        &mut self.colors[index]
    }
}

/// The palettes learned for one image.
///
/// Cloning a set is a deep value copy, which is how checkpoints are kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaletteSet {
    palettes: Vec<Palette>,
}

impl PaletteSet {
    pub fn new(palettes: Vec<Palette>) -> Self {
        Self { palettes }
    }

    /// Number of palettes.
    #[inline]
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    #[inline]
    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Palette> {
        self.palettes.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Palette> {
        self.palettes.iter_mut()
    }

    /// Append a palette.
    #[inline]
    pub fn push(&mut self, palette: Palette) {
        self.palettes.push(palette);
    }

    /// Length shared by every palette, or `None` if lengths differ.
    pub fn uniform_len(&self) -> Option<usize> {
        let first = self.palettes.first()?.len();
        self.palettes
            .iter()
            .all(|p| p.len() == first)
            .then_some(first)
    }

    /// Snap every color of every palette to the N-bit grid.
    pub fn reduce(&mut self, bits: u8) {
        for palette in &mut self.palettes {
            palette.reduce(bits);
        }
    }
}

impl Index<usize> for PaletteSet {
    type Output = Palette;

    #[inline]
    fn index(&self, index: usize) -> &Palette {
        &self.palettes[index]
    }
}

impl IndexMut<usize> for PaletteSet {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Palette {
        &mut self.palettes[index]
    }
}
