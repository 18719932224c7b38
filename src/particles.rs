//! Ambient particle field behind the "what we do" cards.
//!
//! Simulation is pure and seeded. Drawing and [`AmbientCanvas`] are the only
//! parts that touch the page.

use crate::viewport::Rect;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

pub const DEFAULT_COUNT: usize = 400;
pub const LINK_DISTANCE: f32 = 140.0;
pub const POINTER_LINK_DISTANCE: f32 = LINK_DISTANCE * 1.5;
pub const POINTER_RADIUS: f32 = 300.0;
pub const CARD_RADIUS: f32 = 400.0;

const POINTER_PUSH: f32 = 0.02;
const POINTER_EXCITE: f32 = 0.02;
const EXCITEMENT_DECAY: f32 = 0.01;
const CARD_PULL: f32 = 0.015;
const CARD_EXCITE: f32 = 0.03;
const CARD_EXCITE_MAX: f32 = 0.9;
const SPEED_BOOST: f32 = 0.3;
const CALM_BELOW: f32 = 0.5;

const SPARKLE_CHANCE: f64 = 0.3;
const SPARKLE_PAD: f32 = 8.0;
const SPARKLE_FADE: f32 = 0.015;
const SPARKLE_GRAVITY: f32 = 0.02;

const BASE: &str = "rgba(100, 149, 237, ";
const HIGHLIGHT: &str = "rgba(138, 43, 226, ";
const ACCENT: &str = "rgba(0, 255, 255, ";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub opacity: f32,
    pub excitement: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sparkle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub life: f32,
}

impl Sparkle {
    fn step(&mut self) {
        self.position += self.velocity;
        self.life -= SPARKLE_FADE;
        self.velocity.y += SPARKLE_GRAVITY;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Link {
    Pair { a: usize, b: usize, alpha: f32 },
    Pointer { a: usize, alpha: f32 },
}

pub struct ParticleField {
    width: f32,
    height: f32,
    count: usize,
    particles: Vec<Particle>,
    sparkles: Vec<Sparkle>,
    pointer: Option<Vec2>,
    focus: Option<Rect>,
    rng: SmallRng,
}

impl ParticleField {
    pub fn new(width: f32, height: f32, count: usize, seed: u64) -> Self {
        let mut field = Self {
            width: width.max(1.0),
            height: height.max(1.0),
            count,
            particles: Vec::with_capacity(count),
            sparkles: Vec::new(),
            pointer: None,
            focus: None,
            rng: SmallRng::seed_from_u64(seed),
        };
        field.scatter();
        field
    }

    /// Resizes the field and re-scatters every particle.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.scatter();
    }

    fn scatter(&mut self) {
        let (w, h) = (self.width, self.height);
        let rng = &mut self.rng;
        self.particles = (0..self.count)
            .map(|_| Particle {
                position: Vec2::new(rng.gen_range(0.0..w), rng.gen_range(0.0..h)),
                velocity: Vec2::new(rng.gen_range(-0.25..0.25), rng.gen_range(-0.25..0.25)),
                size: rng.gen_range(0.5..3.0),
                opacity: rng.gen_range(0.6..1.0),
                excitement: 0.0,
            })
            .collect();
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn sparkles(&self) -> &[Sparkle] {
        &self.sparkles
    }

    /// Pointer in field coordinates, or `None` when it left the field.
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer.filter(|p| p.is_finite());
    }

    /// Rectangle of the hovered card in field coordinates.
    pub fn set_focus(&mut self, focus: Option<Rect>) {
        self.focus = focus;
    }

    pub fn step(&mut self) {
        if let Some(rect) = self.focus {
            if self.rng.gen_bool(SPARKLE_CHANCE) {
                let position = self.edge_point(&rect);
                let sparkle = Sparkle {
                    position,
                    velocity: Vec2::new(
                        self.rng.gen_range(-1.0..1.0),
                        -self.rng.gen_range(1.0..3.0),
                    ),
                    size: self.rng.gen_range(1.0..3.0),
                    life: 1.0,
                };
                self.sparkles.push(sparkle);
            }
        }

        let focus = self.focus.map(|r| {
            let (cx, cy) = r.center();
            Vec2::new(cx as f32, cy as f32)
        });
        for p in &mut self.particles {
            step_particle(p, self.pointer, focus, self.width, self.height);
        }

        self.sparkles.retain_mut(|s| {
            s.step();
            !s.is_dead()
        });
    }

    fn edge_point(&mut self, rect: &Rect) -> Vec2 {
        let (left, top) = (rect.left as f32, rect.top as f32);
        let (w, h) = (rect.width as f32, rect.height as f32);
        let along_x = left + self.rng.gen_range(0.0..=1.0) * w;
        let along_y = top + self.rng.gen_range(0.0..=1.0) * h;
        match self.rng.gen_range(0..4) {
            0 => Vec2::new(along_x, top - SPARKLE_PAD),
            1 => Vec2::new(left + w + SPARKLE_PAD, along_y),
            2 => Vec2::new(along_x, top + h + SPARKLE_PAD),
            _ => Vec2::new(left - SPARKLE_PAD, along_y),
        }
    }

    /// Lines to draw this frame: calm particle pairs and particle-to-pointer.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for (i, p) in self.particles.iter().enumerate() {
            if let Some(pointer) = self.pointer {
                let d = p.position.distance(pointer);
                if d < POINTER_LINK_DISTANCE {
                    links.push(Link::Pointer {
                        a: i,
                        alpha: (1.0 - d / POINTER_LINK_DISTANCE) * 0.5,
                    });
                }
            }
            if p.excitement >= CALM_BELOW {
                continue;
            }
            for (j, q) in self.particles.iter().enumerate().skip(i + 1) {
                let d = p.position.distance(q.position);
                if d < LINK_DISTANCE {
                    links.push(Link::Pair {
                        a: i,
                        b: j,
                        alpha: (1.0 - d / LINK_DISTANCE) * 0.2,
                    });
                }
            }
        }
        links
    }

    pub fn draw(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        ctx.clear_rect(0.0, 0.0, self.width as f64, self.height as f64);

        for p in &self.particles {
            draw_particle(ctx, p)?;
        }

        for link in self.links() {
            let (from, to, style, width) = match link {
                Link::Pair { a, b, alpha } => (
                    self.particles[a].position,
                    self.particles[b].position,
                    format!("{BASE}{alpha})"),
                    0.5,
                ),
                Link::Pointer { a, alpha } => {
                    let Some(pointer) = self.pointer else {
                        continue;
                    };
                    (
                        self.particles[a].position,
                        pointer,
                        format!("{ACCENT}{alpha})"),
                        0.8,
                    )
                }
            };
            ctx.begin_path();
            ctx.move_to(from.x as f64, from.y as f64);
            ctx.line_to(to.x as f64, to.y as f64);
            ctx.set_stroke_style_str(&style);
            ctx.set_line_width(width);
            ctx.stroke();
        }

        for s in &self.sparkles {
            ctx.begin_path();
            ctx.arc(s.position.x as f64, s.position.y as f64, s.size as f64, 0.0, TAU)?;
            ctx.set_fill_style_str(&format!("{HIGHLIGHT}{})", s.life * 0.9));
            ctx.set_shadow_blur(6.0);
            ctx.set_shadow_color(&format!("{ACCENT}{})", s.life * 0.7));
            ctx.fill();
            ctx.set_shadow_blur(0.0);
        }
        Ok(())
    }
}

fn step_particle(p: &mut Particle, pointer: Option<Vec2>, focus: Option<Vec2>, w: f32, h: f32) {
    let near_pointer = pointer.and_then(|m| {
        let delta = m - p.position;
        let d = delta.length();
        (d < POINTER_RADIUS && d > f32::EPSILON).then(|| delta / d)
    });
    match near_pointer {
        Some(dir) => {
            p.velocity -= dir * POINTER_PUSH;
            p.excitement = (p.excitement + POINTER_EXCITE).min(1.0);
        }
        None => p.excitement = (p.excitement - EXCITEMENT_DECAY).max(0.0),
    }

    if let Some(center) = focus {
        let delta = center - p.position;
        let d = delta.length();
        if d < CARD_RADIUS && d > f32::EPSILON {
            p.velocity += delta / d * CARD_PULL;
            p.excitement = (p.excitement + CARD_EXCITE).min(CARD_EXCITE_MAX);
        }
    }

    p.position += p.velocity * (1.0 + p.excitement * SPEED_BOOST);

    if p.position.x < 0.0 {
        p.position.x = w;
    } else if p.position.x > w {
        p.position.x = 0.0;
    }
    if p.position.y < 0.0 {
        p.position.y = h;
    } else if p.position.y > h {
        p.position.y = 0.0;
    }
}

fn draw_particle(ctx: &CanvasRenderingContext2d, p: &Particle) -> Result<(), JsValue> {
    let (x, y) = (p.position.x as f64, p.position.y as f64);
    let e = p.excitement as f64;
    let size = p.size as f64 * (1.0 + e * 0.5);

    if e > 0.4 {
        let glow = ctx.create_radial_gradient(x, y, 0.0, x, y, size * 6.0)?;
        glow.add_color_stop(0.0, &format!("{ACCENT}{})", e * 0.3))?;
        glow.add_color_stop(1.0, &format!("{ACCENT}0)"))?;
        ctx.begin_path();
        ctx.arc(x, y, size * 6.0, 0.0, TAU)?;
        ctx.set_fill_style_canvas_gradient(&glow);
        ctx.fill();
    }

    ctx.begin_path();
    ctx.arc(x, y, size, 0.0, TAU)?;
    if e > 0.1 {
        ctx.set_fill_style_str(&format!("{HIGHLIGHT}{})", 0.4 + e * 0.6));
        if e > 0.5 {
            ctx.set_shadow_blur(8.0);
            ctx.set_shadow_color(&format!("{ACCENT}{})", e * 0.6));
        }
    } else {
        ctx.set_fill_style_str(&format!("{BASE}{})", p.opacity as f64 * 0.4));
    }
    ctx.fill();
    ctx.set_shadow_blur(0.0);
    Ok(())
}

/// The particle field bound to `#ambient-canvas` inside `#what-we-do`.
pub struct AmbientCanvas {
    canvas: web_sys::HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    section: web_sys::HtmlElement,
    cards: Vec<web_sys::Element>,
    active_card: Option<usize>,
    field: ParticleField,
}

impl AmbientCanvas {
    /// `Ok(None)` when the page has no ambient canvas.
    pub fn attach(
        document: &web_sys::Document,
        count: usize,
        seed: u64,
    ) -> Result<Option<Self>, JsValue> {
        use wasm_bindgen::JsCast;

        let Some(canvas) = document
            .get_element_by_id("ambient-canvas")
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            return Ok(None);
        };
        let Some(section) = document
            .get_element_by_id("what-we-do")
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            return Ok(None);
        };
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D canvas unavailable for particles"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let list = document.query_selector_all(".card")?;
        let cards = (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .collect();

        let field = ParticleField::new(
            canvas.width() as f32,
            canvas.height() as f32,
            count,
            seed,
        );
        Ok(Some(Self {
            canvas,
            ctx,
            section,
            cards,
            active_card: None,
            field,
        }))
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn resize(&mut self, viewport_width: f64) {
        let width = viewport_width.max(1.0) as u32;
        let height = self.section.offset_height().max(1) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.field.resize(width as f32, height as f32);
    }

    /// Pointer in client coordinates; outside the canvas rows it is forgotten.
    pub fn pointer(&mut self, client_x: f64, client_y: f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let inside = client_y >= rect.top() && client_y <= rect.bottom();
        self.field.set_pointer(inside.then(|| {
            Vec2::new((client_x - rect.left()) as f32, (client_y - rect.top()) as f32)
        }));
    }

    pub fn set_active_card(&mut self, index: Option<usize>) {
        self.active_card = index.filter(|&i| i < self.cards.len());
    }

    pub fn frame(&mut self) -> Result<(), JsValue> {
        let focus = self.active_card.map(|i| {
            let origin = self.canvas.get_bounding_client_rect();
            let r = self.cards[i].get_bounding_client_rect();
            Rect::new(
                r.left() - origin.left(),
                r.top() - origin.top(),
                r.width(),
                r.height(),
            )
        });
        self.field.set_focus(focus);
        self.field.step();
        self.field.draw(&self.ctx)
    }
}
