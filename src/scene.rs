//! Capabilities consumed from the rendering runtime.
//!
//! The harness never looks inside a scene: it advances it, asks for its
//! bounds, and asks it to draw itself onto a [`DrawSurface`].

use glam::{Affine2, Vec2};
use image::RgbaImage;

use crate::error::RenderError;

pub type RenderResult<T = ()> = std::result::Result<T, RenderError>;

/// Axis-aligned rectangle in surface or artboard units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fit {
    /// Uniform scale so the content fits entirely inside the frame.
    Contain,
    /// Uniform scale so the content covers the whole frame.
    Cover,
    /// Non-uniform scale, content stretched to the frame.
    Fill,
    /// No scaling.
    None,
}

/// Anchor within the frame, each axis in `-1.0..=1.0` (center is zero).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alignment {
    pub x: f32,
    pub y: f32,
}

#[allow(dead_code)]
impl Alignment {
    pub const TOP_LEFT: Self = Self::new(-1.0, -1.0);
    pub const TOP_CENTER: Self = Self::new(0.0, -1.0);
    pub const TOP_RIGHT: Self = Self::new(1.0, -1.0);
    pub const CENTER_LEFT: Self = Self::new(-1.0, 0.0);
    pub const CENTER: Self = Self::new(0.0, 0.0);
    pub const CENTER_RIGHT: Self = Self::new(1.0, 0.0);
    pub const BOTTOM_LEFT: Self = Self::new(-1.0, 1.0);
    pub const BOTTOM_CENTER: Self = Self::new(0.0, 1.0);
    pub const BOTTOM_RIGHT: Self = Self::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Transform mapping `content` into `frame` under the given fit and alignment.
pub fn compute_alignment(fit: Fit, alignment: Alignment, frame: Aabb, content: Aabb) -> Affine2 {
    let content_size = content.size();
    let frame_size = frame.size();

    // Degenerate content would produce an infinite scale.
    let ratio = if content_size.x > 0.0 && content_size.y > 0.0 {
        frame_size / content_size
    } else {
        Vec2::ONE
    };

    let scale = match fit {
        Fit::Contain => Vec2::splat(ratio.x.min(ratio.y)),
        Fit::Cover => Vec2::splat(ratio.x.max(ratio.y)),
        Fit::Fill => ratio,
        Fit::None => Vec2::ONE,
    };

    let anchor = Vec2::new(alignment.x, alignment.y);
    let content_anchor = content.min + content_size * 0.5 + anchor * content_size * 0.5;
    let frame_anchor = frame.min + frame_size * 0.5 + anchor * frame_size * 0.5;

    Affine2::from_translation(frame_anchor)
        * Affine2::from_scale(scale)
        * Affine2::from_translation(-content_anchor)
}

/// Output surface of the rendering runtime.
///
/// `fill` is the only drawing primitive. It takes a convex polygon and is
/// transformed by whatever transform is current when it is called.
pub trait DrawSurface {
    fn bounds(&self) -> Aabb;

    fn clear(&mut self);

    fn save(&mut self);

    fn restore(&mut self) -> RenderResult;

    fn align(&mut self, fit: Fit, alignment: Alignment, frame: Aabb, content: Aabb);

    fn fill(&mut self, vertices: &[Vec2], color: [f32; 4]) -> RenderResult;

    /// Diagnostic image composited above the scene on the next flush.
    fn set_overlay(&mut self, overlay: &RgbaImage);

    /// Submits everything recorded since the last flush and ends the frame.
    fn flush(&mut self) -> RenderResult;
}

pub trait StateMachine {
    fn advance(&mut self, dt: f32) -> RenderResult;
}

pub trait Scene {
    /// Intrinsic bounds in artboard units.
    fn bounds(&self) -> Aabb;

    fn advance(&mut self, dt: f32) -> RenderResult;

    fn draw(&self, surface: &mut dyn DrawSurface) -> RenderResult;

    fn state_machine_mut(&mut self) -> Option<&mut dyn StateMachine> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn contain_center_letterboxes_wide_frame() {
        let frame = Aabb::from_size(800.0, 400.0);
        let content = Aabb::from_size(100.0, 100.0);
        let t = compute_alignment(Fit::Contain, Alignment::CENTER, frame, content);

        assert!(close(t.transform_point2(Vec2::ZERO), Vec2::new(200.0, 0.0)));
        assert!(close(
            t.transform_point2(Vec2::new(100.0, 100.0)),
            Vec2::new(600.0, 400.0)
        ));
        assert!(close(
            t.transform_point2(Vec2::new(50.0, 50.0)),
            Vec2::new(400.0, 200.0)
        ));
    }

    #[test]
    fn contain_preserves_aspect_for_tall_frame() {
        let frame = Aabb::from_size(300.0, 900.0);
        let content = Aabb::new(10.0, 10.0, 210.0, 110.0);
        let t = compute_alignment(Fit::Contain, Alignment::CENTER, frame, content);

        let top_left = t.transform_point2(content.min);
        let bottom_right = t.transform_point2(content.max);
        let size = bottom_right - top_left;
        assert!((size.x - 300.0).abs() < 1e-3);
        assert!((size.y - 150.0).abs() < 1e-3);
        assert!((top_left.y - 375.0).abs() < 1e-3);
    }

    #[test]
    fn fill_stretches_to_frame() {
        let frame = Aabb::from_size(400.0, 100.0);
        let content = Aabb::from_size(100.0, 100.0);
        let t = compute_alignment(Fit::Fill, Alignment::CENTER, frame, content);
        assert!(close(
            t.transform_point2(Vec2::new(100.0, 100.0)),
            Vec2::new(400.0, 100.0)
        ));
    }

    #[test]
    fn none_with_top_left_is_identity_offset() {
        let frame = Aabb::new(20.0, 30.0, 500.0, 500.0);
        let content = Aabb::from_size(100.0, 100.0);
        let t = compute_alignment(Fit::None, Alignment::TOP_LEFT, frame, content);
        assert!(close(t.transform_point2(Vec2::ZERO), Vec2::new(20.0, 30.0)));
    }

    #[test]
    fn cover_fills_short_axis() {
        let frame = Aabb::from_size(800.0, 400.0);
        let content = Aabb::from_size(100.0, 100.0);
        let t = compute_alignment(Fit::Cover, Alignment::CENTER, frame, content);
        let size = t.transform_point2(content.max) - t.transform_point2(content.min);
        assert!(close(size, Vec2::new(800.0, 800.0)));
    }

    #[test]
    fn empty_content_does_not_blow_up() {
        let frame = Aabb::from_size(800.0, 400.0);
        let content = Aabb::from_size(0.0, 0.0);
        let t = compute_alignment(Fit::Contain, Alignment::CENTER, frame, content);
        assert!(t.transform_point2(Vec2::ZERO).is_finite());
    }
}
