//! Pattern genomes — the per-slot parameter records driving the animations.
//!
//! A genome is a handful of independently random bytes; the renderer reads
//! them every frame. Threshold-encoded fields (`cd_dir`, `nonlin`, `hue_dir`)
//! are derived once per load into [`GenomeTraits`] so the render loop never
//! re-tests magic thresholds inline.

use core::fmt::Write as _;

use log::info;
use serde::{Deserialize, Serialize};

use crate::color::map_linear;

/// Number of pattern slots on the badge.
pub const NUM_PATTERNS: usize = 5;
/// Slot whose brightness is driven by the sound analyzer.
pub const SOUND_REACTIVE_SLOT: usize = 3;
/// Slot rendered as the VU meter.
pub const VU_METER_SLOT: usize = 4;

/// Fixed length of the display label, including headroom for "Pattern 99".
pub const GENOME_NAME_LEN: usize = 16;

/// One pattern's parameter record.
///
/// Every field is independently random at generation; only the
/// `hue_base`/`hue_bound` ordering fix-up couples two of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    /// Spatial phase multiplier for the brightness sinusoid (0–5).
    pub cd_period: u8,
    /// Maps linearly to the animation period τ (700–8000 ms).
    pub cd_rate: u8,
    /// Animation direction; >128 reverses the temporal sign.
    pub cd_dir: u8,
    /// HSV saturation.
    pub sat: u8,
    /// Lower edge of the hue span.
    pub hue_base: u8,
    /// Upper edge of the hue span; (0, 255) is the full-rainbow sentinel.
    pub hue_bound: u8,
    /// Hue rotation speed per animation tick.
    pub hue_rate: u8,
    /// Hue rotation direction, 0 or 1.
    pub hue_dir: u8,
    /// >127 selects quadratic gamma on brightness.
    pub nonlin: u8,
    /// Display label.
    pub name: heapless::String<GENOME_NAME_LEN>,
}

/// Named derivations of the genome's threshold-encoded fields, computed once
/// per genome load rather than re-tested throughout the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeTraits {
    /// Temporal animation runs backwards.
    pub reverse_direction: bool,
    /// Apply `v² / 256` to brightness.
    pub quadratic_gamma: bool,
    /// Hue rotation runs backwards.
    pub reverse_hue_rotation: bool,
    /// Animation period τ in milliseconds.
    pub period_ms: u32,
}

impl GenomeTraits {
    pub fn derive(g: &Genome) -> Self {
        Self {
            reverse_direction: g.cd_dir > 128,
            quadratic_gamma: g.nonlin > 127,
            reverse_hue_rotation: g.hue_dir == 1,
            period_ms: map_linear(i32::from(g.cd_rate), 0, 255, 700, 8000) as u32,
        }
    }
}

impl Genome {
    /// Generate a fresh random genome.
    pub fn generate() -> Self {
        let mut hue_base = fastrand::u8(..);
        let mut hue_bound = fastrand::u8(..);

        // 1-in-8 chance of the full-rainbow sentinel; otherwise enforce the
        // hue_base < hue_bound ordering invariant.
        if fastrand::u8(..8) == 0 {
            hue_base = 0;
            hue_bound = 255;
        } else {
            if hue_base > hue_bound {
                core::mem::swap(&mut hue_base, &mut hue_bound);
            }
            if hue_base == hue_bound {
                if hue_bound == 255 {
                    hue_base = 254;
                } else {
                    hue_bound += 1;
                }
            }
        }

        let mut name = heapless::String::new();
        // Cannot overflow: "Pattern 99" is 10 bytes.
        let _ = write!(name, "Pattern {}", fastrand::u8(..100));

        let g = Self {
            cd_period: fastrand::u8(..6),
            cd_rate: fastrand::u8(..),
            cd_dir: fastrand::u8(..),
            sat: fastrand::u8(..),
            hue_base,
            hue_bound,
            hue_rate: fastrand::u8(..),
            hue_dir: fastrand::u8(..2),
            nonlin: fastrand::u8(..),
            name,
        };
        info!("Generated genome: {}", g.name);
        g
    }

    /// True if this genome spans the entire hue wheel.
    pub fn full_rainbow(&self) -> bool {
        self.hue_base == 0 && self.hue_bound == 255
    }
}

/// The badge's pattern slots plus their derived trait cache.
///
/// The trait cache is rebuilt whenever a slot changes, keeping threshold
/// decoding out of the frame loop.
#[derive(Debug, Clone)]
pub struct PatternBank {
    genomes: [Genome; NUM_PATTERNS],
    traits: [GenomeTraits; NUM_PATTERNS],
}

impl PatternBank {
    /// Build a bank of freshly generated genomes.
    pub fn generate() -> Self {
        Self::from_genomes(core::array::from_fn(|_| Genome::generate()))
    }

    /// Build a bank from loaded genomes, deriving the trait cache.
    pub fn from_genomes(genomes: [Genome; NUM_PATTERNS]) -> Self {
        let traits = core::array::from_fn(|i| GenomeTraits::derive(&genomes[i]));
        Self { genomes, traits }
    }

    /// Replace one slot with a fresh random genome.
    pub fn regenerate(&mut self, slot: usize) {
        let slot = slot % NUM_PATTERNS;
        self.genomes[slot] = Genome::generate();
        self.traits[slot] = GenomeTraits::derive(&self.genomes[slot]);
    }

    pub fn genome(&self, slot: usize) -> &Genome {
        &self.genomes[slot % NUM_PATTERNS]
    }

    pub fn traits(&self, slot: usize) -> &GenomeTraits {
        &self.traits[slot % NUM_PATTERNS]
    }

    pub fn genomes(&self) -> &[Genome; NUM_PATTERNS] {
        &self.genomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_hue_span_is_ordered_or_rainbow() {
        fastrand::seed(7);
        for _ in 0..200 {
            let g = Genome::generate();
            assert!(
                g.full_rainbow() || g.hue_base < g.hue_bound,
                "span ({}, {}) violates ordering",
                g.hue_base,
                g.hue_bound
            );
            assert!(g.cd_period < 6);
            assert!(g.hue_dir < 2);
        }
    }

    #[test]
    fn traits_decode_thresholds() {
        fastrand::seed(11);
        let mut g = Genome::generate();
        g.cd_dir = 129;
        g.nonlin = 128;
        g.hue_dir = 1;
        g.cd_rate = 0;
        let t = GenomeTraits::derive(&g);
        assert!(t.reverse_direction);
        assert!(t.quadratic_gamma);
        assert!(t.reverse_hue_rotation);
        assert_eq!(t.period_ms, 700);

        g.cd_dir = 128; // boundary: not reversed
        g.nonlin = 127;
        g.cd_rate = 255;
        let t = GenomeTraits::derive(&g);
        assert!(!t.reverse_direction);
        assert!(!t.quadratic_gamma);
        assert_eq!(t.period_ms, 8000);
    }

    #[test]
    fn regenerate_refreshes_trait_cache() {
        fastrand::seed(3);
        let mut bank = PatternBank::generate();
        bank.regenerate(2);
        assert_eq!(*bank.traits(2), GenomeTraits::derive(bank.genome(2)));
    }

    #[test]
    fn postcard_roundtrip() {
        fastrand::seed(5);
        let g = Genome::generate();
        let bytes = postcard::to_allocvec(&g).unwrap();
        let g2: Genome = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(g, g2);
    }
}
