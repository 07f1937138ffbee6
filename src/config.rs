use crate::error::{SkyError, SkyResult};

pub const DEFAULT_SEED: u32 = 1337;

/// A uniform range expressed as `min + roll * width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub min: f64,
    pub width: f64,
}

impl Spread {
    pub const fn new(min: f64, width: f64) -> Self {
        Self { min, width }
    }

    #[inline]
    pub fn at(&self, roll: f64) -> f64 {
        roll * self.width + self.min
    }

    pub fn max(&self) -> f64 {
        self.min + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationConfig {
    pub count: usize,
    pub size: Spread,
    pub opacity: Spread,
    pub speed: Spread,
}

impl PopulationConfig {
    fn validate(&self, name: &str) -> SkyResult<()> {
        let fields = [
            ("size", self.size),
            ("opacity", self.opacity),
            ("speed", self.speed),
        ];
        for (field, spread) in fields {
            if !(spread.min > 0.0) || !(spread.width >= 0.0) || !spread.max().is_finite() {
                return Err(SkyError::InvalidConfig(format!(
                    "{name} {field} range must be positive, got {:?}",
                    spread
                )));
            }
        }
        if self.opacity.max() > 1.0 {
            return Err(SkyError::InvalidConfig(format!(
                "{name} opacity may not exceed 1.0, got max {}",
                self.opacity.max()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomMode {
    Seeded(u32),
    Host,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkyConfig {
    pub background: PopulationConfig,
    pub band: PopulationConfig,
    pub accent: PopulationConfig,
    pub bright: PopulationConfig,
    pub random: RandomMode,
    /// Device pixels per sky pixel. Star radii, flare widths and dust lane
    /// thickness are authored in sky pixels and scaled by this.
    pub pixel_ratio: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            background: PopulationConfig {
                count: 900,
                size: Spread::new(0.15, 1.0),
                opacity: Spread::new(0.15, 0.45),
                speed: Spread::new(0.002, 0.008),
            },
            band: PopulationConfig {
                count: 4500,
                size: Spread::new(0.1, 0.9),
                opacity: Spread::new(0.2, 0.55),
                speed: Spread::new(0.002, 0.006),
            },
            accent: PopulationConfig {
                count: 70,
                size: Spread::new(1.0, 2.0),
                opacity: Spread::new(0.55, 0.45),
                speed: Spread::new(0.003, 0.007),
            },
            bright: PopulationConfig {
                count: 20,
                size: Spread::new(1.8, 2.2),
                opacity: Spread::new(0.7, 0.3),
                speed: Spread::new(0.002, 0.005),
            },
            random: RandomMode::Seeded(DEFAULT_SEED),
            pixel_ratio: 1.0,
        }
    }
}

impl SkyConfig {
    pub fn validate(&self) -> SkyResult<()> {
        self.background.validate("background")?;
        self.band.validate("band")?;
        self.accent.validate("accent")?;
        self.bright.validate("bright")?;
        if !(self.pixel_ratio > 0.0) || !self.pixel_ratio.is_finite() {
            return Err(SkyError::InvalidConfig(format!(
                "pixel ratio must be a positive number, got {}",
                self.pixel_ratio
            )));
        }
        Ok(())
    }
}
