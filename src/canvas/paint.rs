use glam::Vec2;
use tiny_skia::{Color, GradientStop, LinearGradient, Point, RadialGradient, Shader, SpreadMode, Transform};

/// Straight-alpha colour. Channels are 0..=255 and alpha 0..=1, same as CSS `rgba()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32, g as f32, b as f32, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub(crate) fn to_skia(self) -> Color {
        let channel = |c: f32| (c / 255.0).clamp(0.0, 1.0);
        Color::from_rgba(channel(self.r), channel(self.g), channel(self.b), self.a.clamp(0.0, 1.0))
            .unwrap_or(Color::TRANSPARENT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientShape {
    Linear { from: Vec2, to: Vec2 },
    Radial { center: Vec2, radius: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    shape: GradientShape,
    stops: Vec<ColorStop>,
}

fn point(v: Vec2) -> Point {
    Point::from_xy(v.x, v.y)
}

// tiny-skia interpolates unpremultiplied colours, so a fade into
// `TRANSPARENT` would darken on the way. A transparent stop takes the hue of
// its neighbours instead (split in two when both sides are visible), which
// gives the same result as interpolating premultiplied colours.
fn skia_stops(stops: &[ColorStop]) -> Vec<GradientStop> {
    let mut out = Vec::with_capacity(stops.len() + 2);
    for (i, stop) in stops.iter().enumerate() {
        if stop.color.a > 0.0 {
            out.push(GradientStop::new(stop.offset, stop.color.to_skia()));
            continue;
        }
        let visible = |s: &&ColorStop| s.color.a > 0.0;
        let before = i.checked_sub(1).and_then(|j| stops.get(j)).filter(visible);
        let after = stops.get(i + 1).filter(visible);
        if before.is_none() && after.is_none() {
            out.push(GradientStop::new(stop.offset, Color::TRANSPARENT));
        }
        for neighbour in [before, after].into_iter().flatten() {
            out.push(GradientStop::new(stop.offset, neighbour.color.with_alpha(0.0).to_skia()));
        }
    }
    out
}

impl Gradient {
    pub fn linear(from: Vec2, to: Vec2) -> Self {
        Self {
            shape: GradientShape::Linear { from, to },
            stops: Vec::with_capacity(4),
        }
    }

    pub fn radial(center: Vec2, radius: f32) -> Self {
        Self {
            shape: GradientShape::Radial { center, radius },
            stops: Vec::with_capacity(4),
        }
    }

    /// Appends a colour stop. Offsets are clamped to [0, 1] and must be added in order.
    pub fn stop(mut self, offset: f32, color: Rgba) -> Self {
        self.stops.push(ColorStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
        self
    }

    fn shader(&self) -> Option<Shader<'static>> {
        if self.stops.is_empty() {
            return None;
        }
        let stops = skia_stops(&self.stops);
        match self.shape {
            GradientShape::Linear { from, to } => {
                if from.distance_squared(to) <= f32::EPSILON {
                    return None;
                }
                LinearGradient::new(point(from), point(to), stops, SpreadMode::Pad, Transform::identity())
            }
            GradientShape::Radial { center, radius } => {
                if radius <= 0.0 {
                    return None;
                }
                RadialGradient::new(
                    point(center),
                    point(center),
                    radius,
                    stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Gradient(Gradient),
}

impl Paint {
    pub(crate) fn to_skia(&self) -> Option<tiny_skia::Paint<'static>> {
        let mut paint = tiny_skia::Paint::default();
        match self {
            Paint::Solid(color) => {
                if color.a <= 0.0 {
                    return None;
                }
                paint.set_color(color.to_skia());
            }
            Paint::Gradient(gradient) => paint.shader = gradient.shader()?,
        }
        Some(paint)
    }
}

impl From<Gradient> for Paint {
    fn from(gradient: Gradient) -> Self {
        Paint::Gradient(gradient)
    }
}
