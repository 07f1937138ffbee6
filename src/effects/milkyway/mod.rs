//! Procedural Milky Way: a tilted galactic band of thousands of stars over
//! nebula washes, with field stars, coloured accents and flared bright stars.

pub mod band;
pub mod glow;
pub mod population;
pub mod random;
pub mod stars;

use super::Effect;
use crate::canvas::Surface;
use crate::config::{RandomMode, SkyConfig};
use band::BandGeometry;
use glow::GlowPainter;
use population::Populations;
use random::{HostRandom, Lcg, RandomSource};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    index: u64,
}

impl FrameState {
    pub fn index(&self) -> u64 {
        self.index
    }

    fn advance(&mut self) {
        self.index = self.index.wrapping_add(1);
    }
}

pub struct MilkyWayEffect {
    populations: Populations,
    glow: GlowPainter,
    frame: FrameState,
    pixel_ratio: f32,
}

impl MilkyWayEffect {
    pub fn new(config: &SkyConfig) -> Self {
        match config.random {
            RandomMode::Seeded(seed) => Self::with_source(config, &mut Lcg::new(seed)),
            RandomMode::Host => Self::with_source(config, &mut HostRandom::new()),
        }
    }

    /// Generates every population from `rng`, then one more roll seeds the haze texture.
    pub fn with_source(config: &SkyConfig, rng: &mut dyn RandomSource) -> Self {
        let populations = Populations::generate(config, rng);
        let haze_seed = (rng.next_f64() * u32::MAX as f64) as u32;
        Self {
            populations,
            glow: GlowPainter::new(haze_seed),
            frame: FrameState::default(),
            pixel_ratio: config.pixel_ratio,
        }
    }

    pub fn populations(&self) -> &Populations {
        &self.populations
    }

    #[cfg(test)]
    pub(crate) fn frame_index(&self) -> u64 {
        self.frame.index()
    }
}

impl Effect for MilkyWayEffect {
    fn update(&mut self) {
        self.frame.advance();
    }

    // Back to front: base sky, band glow and nebulae, stars, vignettes.
    fn render(&mut self, surface: &mut Surface) {
        if surface.is_empty() {
            return;
        }
        let frame = self.frame.index();
        let ratio = self.pixel_ratio;
        let band = BandGeometry::new(surface.width() as f64, surface.height() as f64);
        let sky = &self.populations;

        self.glow.paint_sky(surface);
        self.glow.paint_band(surface, &band, ratio);
        self.glow.paint_nebulae(surface);

        stars::paint_band_stars(surface, &sky.band, &band, frame, ratio);
        stars::paint_field_stars(surface, &sky.background, frame, ratio);
        stars::paint_accent_stars(surface, &sky.accent, frame, ratio);
        stars::paint_bright_stars(surface, &sky.bright, frame, ratio);

        self.glow.paint_vignettes(surface);
    }
}
