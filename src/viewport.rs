//! Maps page layout (CSS pixels) into the mascot's world space.
//!
//! The camera sits on the +Z axis looking at the origin. Anchor elements on
//! the page are projected onto a plane at a fixed depth so the mascot can be
//! pinned next to them while the page scrolls.

use glam::{Mat4, Vec2, Vec3};
use web_sys::DomRect;

const SCROLL_TRIGGER_FRACTION: f64 = 0.8;
const START_SCALE: f32 = 0.82;
const TARGET_SCALE: f32 = 0.32;
const TARGET_GAP_PX: f32 = 60.0;
const TARGET_GAP_PER_SCALE_PX: f32 = 100.0;
const TARGET_DROP: f32 = 0.15;
const SHADOW_OPACITY: f32 = 0.2;
pub const ANCHOR_DEPTH: f32 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_dom(rect: &DomRect) -> Self {
        Self::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// CSS pixel position to normalized device coordinates (+Y up).
    pub fn to_ndc(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new(
            ((x / self.width) * 2.0 - 1.0) as f32,
            (-(y / self.height) * 2.0 + 1.0) as f32,
        )
    }
}

/// Which point of an anchor rectangle the mascot attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Center,
    LeftOf,
    RightCenter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub z: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_deg: 40.0,
            aspect: 1.0,
            z: 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            aspect: viewport.aspect(),
            ..Self::default()
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.z)
    }

    /// Visible world width/height of the plane `depth` units along Z.
    pub fn view_size_at(&self, depth: f32) -> Vec2 {
        let height = 2.0 * (self.fov_deg.to_radians() / 2.0).tan() * (self.z - depth);
        Vec2::new(height * self.aspect, height)
    }

    pub fn map_rect(&self, rect: &Rect, depth: f32, align: Align, viewport: Viewport) -> Vec2 {
        let view = self.view_size_at(depth);
        let (mut x, y) = rect.center();
        match align {
            Align::Center => {}
            Align::LeftOf => x = rect.left,
            Align::RightCenter => x = rect.right(),
        }
        let ndc = viewport.to_ndc(x, y);
        ndc * view / 2.0
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.eye())
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World point to normalized device coordinates.
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }
}

/// Raw scroll progress in `[0, 1]` over the first 80% of a viewport height.
pub fn scroll_progress(scroll_y: f64, viewport_height: f64) -> f64 {
    let range = viewport_height * SCROLL_TRIGGER_FRACTION;
    let t = if range.abs() > 1.0 {
        scroll_y / range
    } else {
        0.0
    };
    if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
}

pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Where the mascot's root sits for the current scroll position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub scale: f32,
    pub shadow_opacity: f32,
    pub ease: f32,
}

/// Scroll-driven travel from the hero anchor to the heading anchor.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollTrack {
    pub hero: Option<Rect>,
    pub heading: Option<Rect>,
}

impl ScrollTrack {
    pub fn placement(&self, camera: &Camera, viewport: Viewport, scroll_y: f64) -> Placement {
        let ease = smoothstep(scroll_progress(scroll_y, viewport.height)) as f32;
        let (Some(hero), Some(heading)) = (self.hero, self.heading) else {
            return Placement {
                position: Vec3::ZERO,
                scale: 1.0,
                shadow_opacity: SHADOW_OPACITY,
                ease,
            };
        };

        let start = camera.map_rect(&hero, ANCHOR_DEPTH, Align::Center, viewport);
        let anchor = camera.map_rect(&heading, ANCHOR_DEPTH, Align::RightCenter, viewport);

        let view = camera.view_size_at(ANCHOR_DEPTH);
        let pixels_per_unit = viewport.width as f32 / view.x;
        let gap = (TARGET_GAP_PX + TARGET_GAP_PER_SCALE_PX * TARGET_SCALE) / pixels_per_unit;
        let target = Vec2::new(anchor.x + gap, anchor.y - TARGET_DROP);

        let xy = start + (target - start) * ease;
        Placement {
            position: xy.extend(ANCHOR_DEPTH),
            scale: START_SCALE + (TARGET_SCALE - START_SCALE) * ease,
            shadow_opacity: SHADOW_OPACITY * (1.0 - ease),
            ease,
        }
    }
}
