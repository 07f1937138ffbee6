use glam::Vec2;
use noise::{NoiseFn, Perlin};

use super::band::BandGeometry;
use crate::canvas::{Gradient, Paint, Rect, Rgba, Surface};

pub const CORE_ANCHOR: (f64, f64) = (0.60, 0.46);
const CORE_RADIUS: f32 = 0.24;

const HAZE_STOPS: [(f32, Rgba); 7] = [
    (0.0, Rgba::TRANSPARENT),
    (0.12, Rgba::new(110.0, 90.0, 180.0, 0.05)),
    (0.30, Rgba::new(160.0, 140.0, 220.0, 0.10)),
    (0.50, Rgba::new(200.0, 180.0, 255.0, 0.17)),
    (0.70, Rgba::new(160.0, 140.0, 220.0, 0.10)),
    (0.88, Rgba::new(110.0, 90.0, 180.0, 0.05)),
    (1.0, Rgba::TRANSPARENT),
];
// Haze clumping ranges over [HAZE_FLOOR, HAZE_PEAK]. The stops are boosted by
// the peak so the mask, which cannot exceed 1, carries factor / peak.
const HAZE_FLOOR: f32 = 0.55;
const HAZE_PEAK: f32 = 1.45;

/// Nebula clouds: anchor (fractions of width/height), radius (fraction of width), stops.
const NEBULAE: [((f32, f32), f32, &[(f32, Rgba)]); 3] = [
    // Purple, left of the core
    (
        (0.28, 0.42),
        0.20,
        &[
            (0.0, Rgba::new(130.0, 55.0, 210.0, 0.18)),
            (0.5, Rgba::new(90.0, 35.0, 160.0, 0.09)),
            (1.0, Rgba::TRANSPARENT),
        ],
    ),
    // Blue-teal, lower right
    (
        (0.72, 0.58),
        0.17,
        &[
            (0.0, Rgba::new(70.0, 120.0, 240.0, 0.12)),
            (0.6, Rgba::new(20.0, 100.0, 180.0, 0.06)),
            (1.0, Rgba::TRANSPARENT),
        ],
    ),
    // Reddish emission, upper left
    (
        (0.14, 0.22),
        0.14,
        &[(0.0, Rgba::new(200.0, 60.0, 80.0, 0.10)), (1.0, Rgba::TRANSPARENT)],
    ),
];

fn gradient(base: Gradient, stops: &[(f32, Rgba)]) -> Paint {
    stops
        .iter()
        .fold(base, |g, &(offset, color)| g.stop(offset, color))
        .into()
}

fn dust_lane(surface: &mut Surface, length: f32, center: f32, half: f32, color: Rgba) {
    let paint = gradient(
        Gradient::linear(Vec2::new(0.0, center - half), Vec2::new(0.0, center + half)),
        &[(0.0, Rgba::TRANSPARENT), (0.5, color), (1.0, Rgba::TRANSPARENT)],
    );
    surface.fill_rect(Rect::new(-length / 2.0, center - half, length, half * 2.0), &paint);
}

pub struct GlowPainter {
    haze: Perlin,
}

impl GlowPainter {
    pub fn new(seed: u32) -> Self {
        Self {
            haze: Perlin::new(seed),
        }
    }

    fn haze_factor(&self, p: Vec2, length: f32, thickness: f32) -> f32 {
        if length <= 0.0 || thickness <= 0.0 {
            return 1.0;
        }
        let n = self.haze.get([
            (p.x / length * 14.0) as f64,
            (p.y / thickness * 3.0) as f64,
        ]) as f32;
        (1.0 + n * 0.45).clamp(HAZE_FLOOR, HAZE_PEAK)
    }

    pub fn paint_sky(&self, surface: &mut Surface) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let paint = gradient(
            Gradient::linear(Vec2::ZERO, Vec2::new(0.0, h)),
            &[
                (0.0, Rgba::rgb(0x00, 0x01, 0x0c)),
                (0.45, Rgba::rgb(0x01, 0x03, 0x10)),
                (1.0, Rgba::rgb(0x00, 0x01, 0x08)),
            ],
        );
        surface.fill_rect(Rect::new(0.0, 0.0, w, h), &paint);
    }

    /// Outer haze, bright core ribbon and the two dust lanes, drawn in band space.
    pub fn paint_band(&self, surface: &mut Surface, band: &BandGeometry, pixel_ratio: f32) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let length = band.length() as f32;
        let thick = band.thickness() as f32;

        surface.save();
        surface.translate(Vec2::new(w * 0.5, h * 0.5));
        surface.rotate(BandGeometry::angle() as f32);

        let haze = gradient(
            Gradient::linear(Vec2::new(0.0, -thick / 2.0), Vec2::new(0.0, thick / 2.0)),
            &HAZE_STOPS.map(|(offset, color)| (offset, color.with_alpha(color.a * HAZE_PEAK))),
        );
        surface.fill_rect_with(
            Rect::new(-length / 2.0, -thick / 2.0, length, thick),
            &haze,
            |p| self.haze_factor(p, length, thick) / HAZE_PEAK,
        );

        let ribbon_half = thick * 0.18;
        let ribbon = gradient(
            Gradient::linear(Vec2::new(0.0, -ribbon_half), Vec2::new(0.0, ribbon_half)),
            &[
                (0.0, Rgba::TRANSPARENT),
                (0.25, Rgba::new(220.0, 200.0, 255.0, 0.12)),
                (0.5, Rgba::new(240.0, 225.0, 255.0, 0.22)),
                (0.75, Rgba::new(220.0, 200.0, 255.0, 0.12)),
                (1.0, Rgba::TRANSPARENT),
            ],
        );
        surface.fill_rect(
            Rect::new(-length / 2.0, -ribbon_half, length, ribbon_half * 2.0),
            &ribbon,
        );

        dust_lane(
            surface,
            length,
            thick * 0.04,
            18.0 * pixel_ratio,
            Rgba::new(0.0, 0.0, 4.0, 0.30),
        );
        dust_lane(
            surface,
            length,
            -thick * 0.08,
            9.0 * pixel_ratio,
            Rgba::new(0.0, 0.0, 3.0, 0.18),
        );

        surface.restore();
    }

    pub fn paint_nebulae(&self, surface: &mut Surface) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let full = Rect::new(0.0, 0.0, w, h);

        let core = Vec2::new(w * CORE_ANCHOR.0 as f32, h * CORE_ANCHOR.1 as f32);
        let core_glow = gradient(
            Gradient::radial(core, w * CORE_RADIUS),
            &[
                (0.0, Rgba::new(255.0, 230.0, 170.0, 0.30)),
                (0.18, Rgba::new(240.0, 180.0, 100.0, 0.20)),
                (0.45, Rgba::new(180.0, 100.0, 200.0, 0.10)),
                (0.75, Rgba::new(100.0, 60.0, 160.0, 0.05)),
                (1.0, Rgba::TRANSPARENT),
            ],
        );
        surface.fill_rect(full, &core_glow);

        for ((ax, ay), radius, stops) in NEBULAE {
            let cloud = gradient(Gradient::radial(Vec2::new(w * ax, h * ay), w * radius), stops);
            surface.fill_rect(full, &cloud);
        }
    }

    pub fn paint_vignettes(&self, surface: &mut Surface) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let full = Rect::new(0.0, 0.0, w, h);
        let edge = Rgba::new(0.0, 0.0, 5.0, 0.35);

        let layers = [
            gradient(
                Gradient::linear(Vec2::new(0.0, h * 0.72), Vec2::new(0.0, h)),
                &[(0.0, Rgba::TRANSPARENT), (1.0, Rgba::new(0.0, 1.0, 6.0, 0.90))],
            ),
            gradient(
                Gradient::linear(Vec2::ZERO, Vec2::new(w * 0.12, 0.0)),
                &[(0.0, edge), (1.0, Rgba::TRANSPARENT)],
            ),
            gradient(
                Gradient::linear(Vec2::new(w * 0.88, 0.0), Vec2::new(w, 0.0)),
                &[(0.0, Rgba::TRANSPARENT), (1.0, edge)],
            ),
        ];
        for layer in &layers {
            surface.fill_rect(full, layer);
        }
    }
}
