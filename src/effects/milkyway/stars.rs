use glam::Vec2;

use super::band::{self, BandGeometry, BandPoint};
use super::glow::CORE_ANCHOR;
use super::population::{ColorCategory, PopulationKind, StarDescriptor, StarPosition};
use crate::canvas::{Gradient, Paint, Rect, Rgba, Surface};

const BAND_ALPHA_CUTOFF: f64 = 0.025;
/// Half extents of the warm region around the galactic core, as fractions of width/height.
const CORE_HALF_EXTENT: (f64, f64) = (0.22, 0.18);
const FLARE_COLOR: (f32, f32, f32) = (230.0, 225.0, 255.0);

/// Sinusoidal brightness envelope: `sin(frame * speed + phase) * amplitude + bias`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwinkleEnvelope {
    pub amplitude: f64,
    pub bias: f64,
}

impl TwinkleEnvelope {
    pub const fn new(amplitude: f64, bias: f64) -> Self {
        Self { amplitude, bias }
    }

    pub fn for_population(kind: PopulationKind) -> Self {
        match kind {
            PopulationKind::Background => Self::new(0.28, 0.72),
            PopulationKind::Band | PopulationKind::Accent => Self::new(0.22, 0.78),
            PopulationKind::Bright => Self::new(0.18, 0.82),
        }
    }

    #[inline]
    pub fn factor(&self, frame: u64, star: &StarDescriptor) -> f64 {
        ((frame as f64 * star.speed + star.phase).sin() * self.amplitude + self.bias).clamp(0.0, 1.0)
    }

    /// Current alpha, always within `[0, star.opacity]`.
    #[inline]
    pub fn alpha(&self, frame: u64, star: &StarDescriptor) -> f64 {
        star.opacity * self.factor(frame, star)
    }
}

/// Warm inside the core rectangle or when generated warm; cool otherwise.
/// Evaluated from the projected position on every frame.
pub fn band_tint(point: &BandPoint, width: f64, height: f64, star: &StarDescriptor) -> ColorCategory {
    let near_core = (point.x - width * CORE_ANCHOR.0).abs() < width * CORE_HALF_EXTENT.0
        && (point.y - height * CORE_ANCHOR.1).abs() < height * CORE_HALF_EXTENT.1;
    if near_core || star.color == Some(ColorCategory::Warm) {
        ColorCategory::Warm
    } else {
        ColorCategory::Cool
    }
}

fn rgba((r, g, b): (u8, u8, u8), alpha: f64) -> Rgba {
    Rgba::rgb(r, g, b).with_alpha(alpha as f32)
}

fn field_point(surface: &Surface, star: &StarDescriptor) -> Option<Vec2> {
    let (x, y) = star.field_position()?;
    Some(Vec2::new(
        (x * surface.width() as f64) as f32,
        (y * surface.height() as f64) as f32,
    ))
}

pub fn paint_band_stars(
    surface: &mut Surface,
    stars: &[StarDescriptor],
    band: &BandGeometry,
    frame: u64,
    pixel_ratio: f32,
) {
    let envelope = TwinkleEnvelope::for_population(PopulationKind::Band);
    let (w, h) = (surface.width() as f64, surface.height() as f64);
    let margin = band::CULL_MARGIN * pixel_ratio as f64;

    for star in stars {
        let StarPosition::Band { along, across } = star.position else {
            continue;
        };
        let point = band.project(along, across);
        if !band.is_visible(&point, margin) {
            continue;
        }
        let alpha = envelope.alpha(frame, star) * band::density(point.norm_off);
        if alpha < BAND_ALPHA_CUTOFF {
            continue;
        }
        let tint = band_tint(&point, w, h, star);
        surface.fill_circle(
            Vec2::new(point.x as f32, point.y as f32),
            star.size as f32 * pixel_ratio,
            rgba(tint.rgb(), alpha),
        );
    }
}

pub fn paint_field_stars(surface: &mut Surface, stars: &[StarDescriptor], frame: u64, pixel_ratio: f32) {
    let envelope = TwinkleEnvelope::for_population(PopulationKind::Background);
    for star in stars {
        let Some(center) = field_point(surface, star) else {
            continue;
        };
        let alpha = envelope.alpha(frame, star);
        surface.fill_circle(center, star.size as f32 * pixel_ratio, rgba((255, 255, 255), alpha));
    }
}

pub fn paint_accent_stars(surface: &mut Surface, stars: &[StarDescriptor], frame: u64, pixel_ratio: f32) {
    let envelope = TwinkleEnvelope::for_population(PopulationKind::Accent);
    for star in stars {
        let Some(center) = field_point(surface, star) else {
            continue;
        };
        let color = star.color.unwrap_or(ColorCategory::White).rgb();
        let alpha = envelope.alpha(frame, star);
        let size = star.size as f32 * pixel_ratio;
        let halo = size * 4.0;

        let glow: Paint = Gradient::radial(center, halo)
            .stop(0.0, rgba(color, alpha * 0.30))
            .stop(1.0, Rgba::TRANSPARENT)
            .into();
        surface.fill_rect(Rect::new(center.x - halo, center.y - halo, halo * 2.0, halo * 2.0), &glow);
        surface.fill_circle(center, size, rgba(color, alpha));
    }
}

pub fn paint_bright_stars(surface: &mut Surface, stars: &[StarDescriptor], frame: u64, pixel_ratio: f32) {
    let envelope = TwinkleEnvelope::for_population(PopulationKind::Bright);
    for star in stars {
        let Some(center) = field_point(surface, star) else {
            continue;
        };
        let alpha = envelope.alpha(frame, star);
        let size = star.size as f32 * pixel_ratio;
        let halo = size * 7.0;

        let glow: Paint = Gradient::radial(center, halo)
            .stop(0.0, rgba((215, 205, 255), alpha * 0.22))
            .stop(0.5, rgba((180, 165, 255), alpha * 0.08))
            .stop(1.0, Rgba::TRANSPARENT)
            .into();
        surface.fill_rect(Rect::new(center.x - halo, center.y - halo, halo * 2.0, halo * 2.0), &glow);

        cross_flare(surface, center, size, alpha as f32, pixel_ratio);
        surface.fill_circle(center, size, rgba((255, 255, 255), alpha));
    }
}

fn cross_flare(surface: &mut Surface, center: Vec2, size: f32, alpha: f32, pixel_ratio: f32) {
    let len = size * 9.0;
    let nominal = 1.2 * pixel_ratio;
    // Streaks thinner than a pixel would miss every pixel centre; widen and dim instead.
    let thickness = nominal.max(1.0);
    let peak = Rgba::new(FLARE_COLOR.0, FLARE_COLOR.1, FLARE_COLOR.2, alpha * 0.55 * nominal / thickness);

    let streaks = [
        (
            Gradient::linear(center - Vec2::X * len, center + Vec2::X * len),
            Rect::new(center.x - len, center.y - thickness / 2.0, len * 2.0, thickness),
        ),
        (
            Gradient::linear(center - Vec2::Y * len, center + Vec2::Y * len),
            Rect::new(center.x - thickness / 2.0, center.y - len, thickness, len * 2.0),
        ),
    ];
    for (gradient, rect) in streaks {
        let paint: Paint = gradient
            .stop(0.0, Rgba::TRANSPARENT)
            .stop(0.5, peak)
            .stop(1.0, Rgba::TRANSPARENT)
            .into();
        surface.fill_rect(rect, &paint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SkyConfig;
    use crate::effects::milkyway::population::Populations;
    use crate::effects::milkyway::random::Lcg;

    fn star_at(x: f64, y: f64, opacity: f64) -> StarDescriptor {
        StarDescriptor {
            position: StarPosition::Field { x, y },
            size: 2.0,
            opacity,
            phase: 0.0,
            speed: 0.01,
            color: None,
        }
    }

    #[test]
    fn test_twinkle_alpha_bounded_for_all_stars() {
        let sky = Populations::generate(&SkyConfig::default(), &mut Lcg::new(1337));
        for kind in [
            PopulationKind::Background,
            PopulationKind::Band,
            PopulationKind::Accent,
            PopulationKind::Bright,
        ] {
            let envelope = TwinkleEnvelope::for_population(kind);
            let floor = envelope.bias - envelope.amplitude;
            for star in sky.get(kind) {
                for frame in (0..20_000).step_by(97) {
                    let alpha = envelope.alpha(frame, star);
                    assert!(alpha <= star.opacity, "{kind:?} alpha {alpha} > {}", star.opacity);
                    assert!(alpha >= star.opacity * floor - 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_band_envelope_range() {
        let env = TwinkleEnvelope::for_population(PopulationKind::Band);
        let star = star_at(0.0, 0.0, 1.0);
        let peak = StarDescriptor { phase: std::f64::consts::FRAC_PI_2, ..star };
        let trough = StarDescriptor { phase: -std::f64::consts::FRAC_PI_2, ..star };
        assert!((env.alpha(0, &peak) - 1.0).abs() < 1e-12);
        assert!((env.alpha(0, &trough) - 0.56).abs() < 1e-12);
    }

    #[test]
    fn test_band_tint_follows_projected_position() {
        let cool = StarDescriptor {
            color: Some(ColorCategory::Cool),
            ..star_at(0.0, 0.0, 1.0)
        };
        let at_core = BandPoint { x: 600.0, y: 460.0, norm_off: 0.0 };
        let far = BandPoint { x: 50.0, y: 900.0, norm_off: 0.0 };
        assert_eq!(band_tint(&at_core, 1000.0, 1000.0, &cool), ColorCategory::Warm);
        assert_eq!(band_tint(&far, 1000.0, 1000.0, &cool), ColorCategory::Cool);

        let warm = StarDescriptor { color: Some(ColorCategory::Warm), ..cool };
        assert_eq!(band_tint(&far, 1000.0, 1000.0, &warm), ColorCategory::Warm);
    }

    #[test]
    fn test_faint_band_edge_stars_are_skipped() {
        let mut surface = Surface::new(100, 100);
        let band = BandGeometry::new(100.0, 100.0);
        // At the nominal edge density is exp(-3.5) ~ 0.03; a dim star drops below the cut-off.
        let edge = StarDescriptor {
            position: StarPosition::Band { along: 0.5, across: 1.0 },
            opacity: 0.2,
            color: Some(ColorCategory::Cool),
            ..star_at(0.0, 0.0, 0.2)
        };
        paint_band_stars(&mut surface, &[edge], &band, 0, 1.0);
        assert!(surface.to_rgb8().iter().all(|&c| c == 0));

        let centre = StarDescriptor {
            position: StarPosition::Band { along: 0.5, across: 0.0 },
            ..edge
        };
        paint_band_stars(&mut surface, &[centre], &band, 0, 1.0);
        assert!(surface.pixel(50, 50).unwrap()[0] > 0);
    }

    #[test]
    fn test_offscreen_band_star_is_culled() {
        let mut surface = Surface::new(50, 50);
        let band = BandGeometry::new(50.0, 50.0);
        let star = StarDescriptor {
            position: StarPosition::Band { along: 0.0, across: 0.0 },
            color: Some(ColorCategory::Warm),
            ..star_at(0.0, 0.0, 1.0)
        };
        paint_band_stars(&mut surface, &[star], &band, 0, 1.0);
        assert!(surface.to_rgb8().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_bright_star_flare_reaches_past_halo() {
        let mut surface = Surface::new(200, 200);
        let star = StarDescriptor { size: 3.0, ..star_at(0.5, 0.5, 1.0) };
        paint_bright_stars(&mut surface, &[star], 0, 1.0);
        // Halo radius is 21px, flare half-length 27px.
        let on_flare = surface.pixel(100 + 24, 100).unwrap();
        let off_flare = surface.pixel(100 + 24, 100 + 8).unwrap();
        assert!(on_flare[0] > 0);
        assert_eq!(off_flare, [0; 3]);
        assert!(surface.pixel(100, 100).unwrap()[0] > 200);
    }

    #[test]
    fn test_accent_star_uses_its_color() {
        let mut surface = Surface::new(40, 40);
        let star = StarDescriptor {
            color: Some(ColorCategory::BluePurple),
            ..star_at(0.5, 0.5, 1.0)
        };
        paint_accent_stars(&mut surface, &[star], 0, 1.0);
        let [r, g, b] = surface.pixel(20, 20).unwrap();
        assert!(b > r && r > g, "expected blue-purple, got ({r}, {g}, {b})");
    }

    fn light(surface: &Surface, x: u32, y: u32) -> u32 {
        surface.pixel(x, y).unwrap().iter().map(|&c| c as u32).sum()
    }

    #[test]
    fn test_flare_follows_twinkle_alpha() {
        // Peak at frame 0, trough at frame 100.
        let star = StarDescriptor {
            size: 5.0,
            phase: std::f64::consts::FRAC_PI_2,
            speed: std::f64::consts::PI / 100.0,
            ..star_at(0.5, 0.5, 1.0)
        };
        let envelope = TwinkleEnvelope::for_population(PopulationKind::Bright);
        let expected = envelope.alpha(100, &star) / envelope.alpha(0, &star);
        assert!((expected - 0.64).abs() < 1e-9);

        // Radius 10, halo 70, flare half-length 90: 75px out only the flare is lit.
        let render = |frame| {
            let mut surface = Surface::new(300, 300);
            paint_bright_stars(&mut surface, &[star], frame, 2.0);
            light(&surface, 150 + 75, 150)
        };
        let (peak, trough) = (render(0), render(100));
        assert!(peak > 40, "peak flare light {peak}");
        let ratio = trough as f64 / peak as f64;
        assert!((ratio - expected).abs() < 0.06, "flare ratio {ratio}, alpha ratio {expected}");
    }

    #[test]
    fn test_accent_halo_sits_under_disc() {
        let mut surface = Surface::new(60, 60);
        let star = StarDescriptor {
            size: 4.0,
            phase: std::f64::consts::FRAC_PI_2,
            color: Some(ColorCategory::BluePurple),
            ..star_at(0.5, 0.5, 1.0)
        };
        paint_accent_stars(&mut surface, &[star], 0, 1.0);

        // The opaque disc covers the halo at the centre.
        let (r, g, b) = ColorCategory::BluePurple.rgb();
        let centre = surface.pixel(30, 30).unwrap();
        assert!(centre.iter().zip([r, g, b]).all(|(&a, e)| a.abs_diff(e) <= 2), "centre {centre:?}");

        // Halo reaches four radii (16px) and no further.
        assert!(light(&surface, 30 + 10, 30) > 0);
        assert!(light(&surface, 30 + 10, 30) < light(&surface, 30 + 6, 30));
        assert_eq!(light(&surface, 30 + 17, 30), 0);
        assert_eq!(light(&surface, 30, 30 - 18), 0);
    }
}
