pub const BAND_ANGLE_DEG: f64 = -32.0;
// Band length relative to the viewport diagonal, so it always spans corner to corner.
pub const BAND_LENGTH_RATIO: f64 = 1.25;
pub const BAND_HALF_WIDTH_RATIO: f64 = 0.30;
pub const DENSITY_FALLOFF: f64 = 3.5;
pub const CULL_MARGIN: f64 = 10.0;

#[inline]
pub fn density(norm_off: f64) -> f64 {
    (-norm_off * norm_off * DENSITY_FALLOFF).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub x: f64,
    pub y: f64,
    /// Absolute offset from the centreline; 0 at centre, 1 at the nominal edge.
    pub norm_off: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct BandGeometry {
    width: f64,
    height: f64,
    length: f64,
    half_width: f64,
    cos: f64,
    sin: f64,
}

impl BandGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let angle = BAND_ANGLE_DEG.to_radians();
        Self {
            width,
            height,
            length: width.hypot(height) * BAND_LENGTH_RATIO,
            half_width: height * BAND_HALF_WIDTH_RATIO,
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    pub fn angle() -> f64 {
        BAND_ANGLE_DEG.to_radians()
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn thickness(&self) -> f64 {
        self.half_width * 2.0
    }

    /// Rotates the band-local `(along, across)` pair into screen space about the viewport centre.
    pub fn project(&self, along: f64, across: f64) -> BandPoint {
        let px = along * self.length - self.length * 0.5;
        let py = across * self.half_width;
        BandPoint {
            x: self.width * 0.5 + px * self.cos - py * self.sin,
            y: self.height * 0.5 + px * self.sin + py * self.cos,
            norm_off: across.abs(),
        }
    }

    pub fn is_visible(&self, point: &BandPoint, margin: f64) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }
}
