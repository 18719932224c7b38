//! Index math and per-item layout for every gallery on the site.
//!
//! A gallery is a cursor over `len` items plus a [`Transition`] that decides
//! how far one step moves and where each item is drawn relative to the
//! cursor. DOM wiring lives in `gallery`; nothing here touches the page.

use std::fmt::Write as _;
use std::ops::Range;
use std::str::FromStr;

pub const DEFAULT_INTERVAL_MS: f64 = 5000.0;
pub const DEFAULT_PER_VIEW: usize = 5;
pub const WHEEL_THRESHOLD: f64 = 30.0;
pub const WHEEL_LOCK_MS: f64 = 900.0;

const COVERFLOW_SPACING_PCT: f32 = 60.0;
const COVERFLOW_ANGLE_DEG: f32 = 45.0;
const COVERFLOW_DEPTH_PX: f32 = 120.0;
const COVERFLOW_VISIBLE: usize = 2;
const CYLINDER_RADIUS_PX: f32 = 400.0;
const STACK_DEPTH: usize = 3;
const STACK_SHRINK: f32 = 0.05;
const STACK_LIFT_PX: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Pages of `per_view` cards at a time.
    Bento { per_view: usize },
    Coverflow,
    Cylinder,
    StickyStack,
    Slide,
}

impl Transition {
    pub fn name(self) -> &'static str {
        match self {
            Transition::Bento { .. } => "bento",
            Transition::Coverflow => "coverflow",
            Transition::Cylinder => "cylinder",
            Transition::StickyStack => "sticky-stack",
            Transition::Slide => "slide",
        }
    }

    pub fn steps_on_wheel(self) -> bool {
        matches!(self, Transition::StickyStack | Transition::Slide)
    }
}

impl FromStr for Transition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bento" => Ok(Transition::Bento {
                per_view: DEFAULT_PER_VIEW,
            }),
            "coverflow" => Ok(Transition::Coverflow),
            "cylinder" => Ok(Transition::Cylinder),
            "sticky-stack" | "stack" => Ok(Transition::StickyStack),
            "slide" | "slider" => Ok(Transition::Slide),
            other => Err(format!("unknown carousel style '{other}'")),
        }
    }
}

/// Outcome of a wheel event offered to a carousel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelStep {
    /// Too small, or the style does not listen to the wheel.
    Ignored,
    /// A previous step is still settling; the page should not scroll either.
    Locked,
    /// Already at the first or last item; let the page scroll.
    Boundary,
    Stepped(usize),
}

impl WheelStep {
    /// Whether the host should call `preventDefault` on the event.
    pub fn captures(self) -> bool {
        matches!(self, WheelStep::Locked | WheelStep::Stepped(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemTransform {
    /// Signed distance from the current item.
    pub offset: isize,
    pub translate_x_pct: f32,
    pub translate_x_px: f32,
    pub translate_y_pct: f32,
    pub translate_z_px: f32,
    pub rotate_y_deg: f32,
    pub scale: f32,
    pub opacity: f32,
    pub z_index: i32,
    pub active: bool,
    pub visible: bool,
}

impl ItemTransform {
    fn resting(offset: isize) -> Self {
        Self {
            offset,
            translate_x_pct: 0.0,
            translate_x_px: 0.0,
            translate_y_pct: 0.0,
            translate_z_px: 0.0,
            rotate_y_deg: 0.0,
            scale: 1.0,
            opacity: 1.0,
            z_index: 0,
            active: offset == 0,
            visible: true,
        }
    }

    /// Transform for a paired column that travels the other way, such as the
    /// image column beside a slide's text card.
    pub fn mirrored(self) -> Self {
        Self {
            translate_y_pct: -self.translate_y_pct,
            ..self
        }
    }

    /// CSS `transform` value.
    pub fn css(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "translateX({}%) translate3d({}px, {}%, {}px) rotateY({}deg) scale({})",
            round2(self.translate_x_pct),
            round2(self.translate_x_px),
            round2(self.translate_y_pct),
            round2(self.translate_z_px),
            round2(self.rotate_y_deg),
            round2(self.scale),
        );
        out
    }
}

// `+ 0.0` folds -0 into 0 so CSS never sees "-0px".
fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0 + 0.0
}

#[derive(Clone, Debug)]
pub struct Carousel {
    len: usize,
    index: usize,
    transition: Transition,
    interval_ms: Option<f64>,
    elapsed_ms: f64,
    wheel_locked_until: f64,
}

impl Carousel {
    pub fn new(len: usize, transition: Transition) -> Self {
        let transition = match transition {
            Transition::Bento { per_view } => Transition::Bento {
                per_view: per_view.max(1),
            },
            other => other,
        };
        Self {
            len,
            index: 0,
            transition,
            interval_ms: None,
            elapsed_ms: 0.0,
            wheel_locked_until: f64::NEG_INFINITY,
        }
    }

    /// Enables auto-advance. Non-positive or non-finite intervals disable it.
    pub fn with_interval(mut self, interval_ms: f64) -> Self {
        self.interval_ms = (interval_ms.is_finite() && interval_ms > 0.0).then_some(interval_ms);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub fn current(&self) -> usize {
        self.index
    }

    fn step(&self) -> usize {
        match self.transition {
            Transition::Bento { per_view } => per_view,
            _ => 1,
        }
    }

    /// Start index of the last page (the last item for step-1 styles).
    fn last_start(&self) -> usize {
        let step = self.step();
        ((self.len - 1) / step) * step
    }

    pub fn page_count(&self) -> usize {
        self.len.div_ceil(self.step())
    }

    pub fn next(&mut self) -> usize {
        self.advance();
        self.elapsed_ms = 0.0;
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len == 0 {
            return 0;
        }
        self.index = if self.index == 0 {
            self.last_start()
        } else {
            self.index.saturating_sub(self.step())
        };
        self.elapsed_ms = 0.0;
        self.index
    }

    /// Jumps to item `i`, snapped to the start of its page. Out of range is ignored.
    pub fn go_to(&mut self, i: usize) -> usize {
        if i < self.len {
            self.index = i - i % self.step();
            self.elapsed_ms = 0.0;
        }
        self.index
    }

    fn advance(&mut self) {
        if self.len == 0 {
            return;
        }
        let next = self.index + self.step();
        self.index = if next < self.len { next } else { 0 };
    }

    /// Feeds frame time to auto-advance. Returns true when the cursor moved.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        let Some(interval) = self.interval_ms else {
            return false;
        };
        if self.len < 2 || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return false;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms < interval {
            return false;
        }
        // A long stall (background tab) advances once, not once per missed interval.
        self.elapsed_ms = 0.0;
        let before = self.index;
        self.advance();
        before != self.index
    }

    pub fn wheel(&mut self, delta_y: f64, now_ms: f64) -> WheelStep {
        if self.len == 0 || !self.transition.steps_on_wheel() {
            return WheelStep::Ignored;
        }
        if now_ms < self.wheel_locked_until {
            return WheelStep::Locked;
        }
        if !delta_y.is_finite() || delta_y.abs() < WHEEL_THRESHOLD {
            return WheelStep::Ignored;
        }
        let target = if delta_y > 0.0 && self.index + 1 < self.len {
            self.index + 1
        } else if delta_y < 0.0 && self.index > 0 {
            self.index - 1
        } else {
            return WheelStep::Boundary;
        };
        self.index = target;
        self.elapsed_ms = 0.0;
        self.wheel_locked_until = now_ms + WHEEL_LOCK_MS;
        WheelStep::Stepped(target)
    }

    /// Items on screen right now.
    pub fn visible_range(&self) -> Range<usize> {
        if self.len == 0 {
            return 0..0;
        }
        let end = (self.index + self.step()).min(self.len);
        self.index..end
    }

    /// Shortest signed distance from the cursor, wrapping for circular styles.
    pub fn offset_of(&self, i: usize) -> isize {
        let raw = i as isize - self.index as isize;
        match self.transition {
            Transition::Coverflow | Transition::Cylinder if self.len > 0 => {
                let n = self.len as isize;
                let d = raw.rem_euclid(n);
                if d > n / 2 { d - n } else { d }
            }
            _ => raw,
        }
    }

    pub fn item_transform(&self, i: usize) -> ItemTransform {
        let d = self.offset_of(i);
        let mut t = ItemTransform::resting(d);
        let distance = d.unsigned_abs();
        let df = d as f32;
        match self.transition {
            Transition::Bento { .. } => {
                t.visible = self.visible_range().contains(&i);
                t.active = t.visible;
                t.opacity = if t.visible { 1.0 } else { 0.0 };
            }
            Transition::Coverflow => {
                t.translate_x_pct = df * COVERFLOW_SPACING_PCT;
                t.translate_z_px = -(distance as f32) * COVERFLOW_DEPTH_PX;
                t.rotate_y_deg = -df.signum() * COVERFLOW_ANGLE_DEG * (distance.min(1) as f32);
                t.scale = (1.0 - 0.15 * distance as f32).max(0.5);
                t.visible = distance <= COVERFLOW_VISIBLE;
                t.opacity = if t.visible {
                    1.0 - 0.3 * distance as f32
                } else {
                    0.0
                };
                t.z_index = 100 - distance as i32;
            }
            Transition::Cylinder => {
                let angle = 360.0 / self.len.max(1) as f32 * df;
                let rad = angle.to_radians();
                // rotateY(a) translateZ(r), pulled back so the front item sits at z = 0.
                t.translate_x_px = CYLINDER_RADIUS_PX * rad.sin();
                t.translate_z_px = CYLINDER_RADIUS_PX * rad.cos() - CYLINDER_RADIUS_PX;
                t.rotate_y_deg = angle;
                t.opacity = if angle.abs() <= 90.0 { 1.0 } else { 0.3 };
                t.z_index = 100 - distance as i32;
            }
            Transition::StickyStack => {
                if d < 0 {
                    let depth = distance.min(STACK_DEPTH) as f32;
                    t.scale = 1.0 - STACK_SHRINK * depth;
                    t.translate_z_px = -STACK_LIFT_PX * depth;
                    t.visible = distance <= STACK_DEPTH;
                    t.opacity = if t.visible { 1.0 } else { 0.0 };
                } else if d > 0 {
                    t.translate_y_pct = 100.0;
                    t.visible = false;
                    t.opacity = 0.0;
                }
                t.z_index = i as i32;
            }
            Transition::Slide => {
                if d != 0 {
                    t.translate_y_pct = if d < 0 { -100.0 } else { 100.0 };
                    t.visible = false;
                    t.opacity = 0.0;
                }
                t.z_index = if d == 0 { 1 } else { 0 };
            }
        }
        t
    }
}
