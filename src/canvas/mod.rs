use glam::{Affine2, Vec2};
use tiny_skia::{FillRule, Mask, PathBuilder, Pixmap, Transform};

pub mod paint;

pub use paint::{Gradient, Paint, Rgba};

// Below this radius a disc is too small for the rasterizer's subsamples and
// is drawn as one pixel lit by the disc's area.
const AREA_RADIUS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    fn to_skia(self) -> Option<tiny_skia::Rect> {
        let (x, w) = if self.w < 0.0 { (self.x + self.w, -self.w) } else { (self.x, self.w) };
        let (y, h) = if self.h < 0.0 { (self.y + self.h, -self.h) } else { (self.y, self.h) };
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        tiny_skia::Rect::from_xywh(x, y, w, h)
    }
}

/// Canvas-style surface over a `tiny_skia::Pixmap`, composited over black.
/// A zero-sized surface has no pixmap and ignores drawing.
pub struct Surface {
    width: u32,
    height: u32,
    pixmap: Option<Pixmap>,
    transform: Affine2,
    saved: Vec<Affine2>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixmap: Pixmap::new(width, height),
            transform: Affine2::IDENTITY,
            saved: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    /// Like a canvas, resizing wipes the contents and resets the transform
    /// even when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let px = self.pixmap.as_ref()?.pixel(x, y)?;
        Some([px.red(), px.green(), px.blue()])
    }

    pub fn save(&mut self) {
        self.saved.push(self.transform);
    }

    pub fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
    }

    fn skia_transform(&self) -> Transform {
        let m = self.transform.matrix2;
        let t = self.transform.translation;
        Transform::from_row(m.x_axis.x, m.x_axis.y, m.y_axis.x, m.y_axis.y, t.x, t.y)
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint, transform: Transform, mask: Option<&Mask>) {
        let (Some(pixmap), Some(rect), Some(paint)) = (self.pixmap.as_mut(), rect.to_skia(), paint.to_skia())
        else {
            return;
        };
        pixmap.fill_rect(rect, &paint, transform, mask);
    }

    pub fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.draw_rect(rect, paint, self.skia_transform(), None);
    }

    /// Like `fill_rect`, with each pixel's alpha scaled by
    /// `modulate(local_point)` clamped to [0, 1].
    pub fn fill_rect_with<F>(&mut self, rect: Rect, paint: &Paint, modulate: F)
    where
        F: Fn(Vec2) -> f32,
    {
        let Some(mut mask) = Mask::new(self.width, self.height) else {
            return;
        };
        let inverse = self.transform.inverse();
        let width = self.width as usize;
        for (i, value) in mask.data_mut().iter_mut().enumerate() {
            let device = Vec2::new((i % width) as f32 + 0.5, (i / width) as f32 + 0.5);
            let scale = modulate(inverse.transform_point2(device)).clamp(0.0, 1.0);
            *value = (scale * 255.0).round() as u8;
        }
        self.draw_rect(rect, paint, self.skia_transform(), Some(&mask));
    }

    /// Anti-aliased disc. The radius is in device pixels; only the centre
    /// goes through the current transform.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        let c = self.transform.transform_point2(center);

        if radius < AREA_RADIUS {
            let area = std::f32::consts::PI * radius * radius;
            let cell = Rect::new(c.x.floor(), c.y.floor(), 1.0, 1.0);
            let paint = Paint::Solid(color.with_alpha(color.a * area));
            self.draw_rect(cell, &paint, Transform::identity(), None);
            return;
        }

        let (Some(pixmap), Some(path), Some(paint)) = (
            self.pixmap.as_mut(),
            PathBuilder::from_circle(c.x, c.y, radius),
            Paint::Solid(color).to_skia(),
        ) else {
            return;
        };
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Row-major RGB bytes. Pixels are premultiplied, i.e. already composited over black.
    pub fn to_rgb8(&self) -> Vec<u8> {
        match &self.pixmap {
            Some(pixmap) => pixmap
                .pixels()
                .iter()
                .flat_map(|px| [px.red(), px.green(), px.blue()])
                .collect(),
            None => Vec::new(),
        }
    }
}
