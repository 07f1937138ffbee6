use std::f64::consts::TAU;

use super::random::RandomSource;
use crate::config::{PopulationConfig, SkyConfig};

/// Stars whose band offset is this close to the centreline are always warm.
const NEAR_CORE_OFFSET: f64 = 0.15;
const WARM_CHANCE: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StarPosition {
    Field { x: f64, y: f64 },
    Band { along: f64, across: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCategory {
    BluePurple,
    WarmGold,
    CoolBlue,
    White,
    Warm,
    Cool,
}

impl ColorCategory {
    fn accent(roll: f64) -> Self {
        if roll < 0.3 {
            ColorCategory::BluePurple
        } else if roll < 0.55 {
            ColorCategory::WarmGold
        } else if roll < 0.75 {
            ColorCategory::CoolBlue
        } else {
            ColorCategory::White
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorCategory::BluePurple => (200, 180, 255),
            ColorCategory::WarmGold => (255, 245, 190),
            ColorCategory::CoolBlue => (180, 220, 255),
            ColorCategory::White => (255, 255, 255),
            ColorCategory::Warm => (255, 225, 175),
            ColorCategory::Cool => (210, 215, 245),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarDescriptor {
    pub position: StarPosition,
    pub size: f64,
    pub opacity: f64,
    pub phase: f64,
    pub speed: f64,
    pub color: Option<ColorCategory>,
}

impl StarDescriptor {
    pub fn field_position(&self) -> Option<(f64, f64)> {
        match self.position {
            StarPosition::Field { x, y } => Some((x, y)),
            StarPosition::Band { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationKind {
    Background,
    Band,
    Accent,
    Bright,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Populations {
    pub background: Vec<StarDescriptor>,
    pub band: Vec<StarDescriptor>,
    pub accent: Vec<StarDescriptor>,
    pub bright: Vec<StarDescriptor>,
}

impl Populations {
    /// Draws every population from `rng` in a fixed order: background,
    /// band, accent, bright. Each star takes its rolls in field order, so a
    /// seeded source reproduces the sky exactly.
    pub fn generate(config: &SkyConfig, rng: &mut dyn RandomSource) -> Self {
        let background = (0..config.background.count)
            .map(|_| field_star(&config.background, rng, None))
            .collect();
        let band = (0..config.band.count).map(|_| band_star(&config.band, rng)).collect();
        let accent = (0..config.accent.count)
            .map(|_| {
                let category = ColorCategory::accent(rng.next_f64());
                field_star(&config.accent, rng, Some(category))
            })
            .collect();
        let bright = (0..config.bright.count)
            .map(|_| field_star(&config.bright, rng, None))
            .collect();

        Self {
            background,
            band,
            accent,
            bright,
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, kind: PopulationKind) -> &[StarDescriptor] {
        match kind {
            PopulationKind::Background => &self.background,
            PopulationKind::Band => &self.band,
            PopulationKind::Accent => &self.accent,
            PopulationKind::Bright => &self.bright,
        }
    }

    pub fn total(&self) -> usize {
        self.background.len() + self.band.len() + self.accent.len() + self.bright.len()
    }
}

fn field_star(
    config: &PopulationConfig,
    rng: &mut dyn RandomSource,
    color: Option<ColorCategory>,
) -> StarDescriptor {
    let x = rng.next_f64();
    let y = rng.next_f64();
    StarDescriptor {
        position: StarPosition::Field { x, y },
        size: config.size.at(rng.next_f64()),
        opacity: config.opacity.at(rng.next_f64()),
        phase: rng.next_f64() * TAU,
        speed: config.speed.at(rng.next_f64()),
        color,
    }
}

fn band_star(config: &PopulationConfig, rng: &mut dyn RandomSource) -> StarDescriptor {
    // Mean of three uniforms, recentred: a cheap bell curve over [-1, 1].
    let across = (rng.next_f64() + rng.next_f64() + rng.next_f64() - 1.5) / 1.5;
    let near_core = across.abs() < NEAR_CORE_OFFSET;
    let along = rng.next_f64();
    let size = config.size.at(rng.next_f64());
    let opacity = config.opacity.at(rng.next_f64());
    let phase = rng.next_f64() * TAU;
    let speed = config.speed.at(rng.next_f64());
    // Near-core stars skip the roll entirely.
    let warm = near_core || rng.next_f64() < WARM_CHANCE;

    StarDescriptor {
        position: StarPosition::Band { along, across },
        size,
        opacity,
        phase,
        speed,
        color: Some(if warm { ColorCategory::Warm } else { ColorCategory::Cool }),
    }
}
