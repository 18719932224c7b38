//! Scroll reveal, stat counters and card tilt.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

pub const REVEAL_SELECTOR: &str = ".reveal, .scale-in, .blur-in, .slide-left, .slide-right";
pub const REVEAL_PERCENT: f64 = 85.0;
pub const COUNTER_SELECTOR: &str = ".stat-value[data-target]";
pub const COUNTER_DURATION_MS: f64 = 2000.0;
pub const COUNTER_FRAME_MS: f64 = 16.0;
pub const COUNTER_THRESHOLD: f64 = 0.5;
/// Cards owned by a carousel keep the carousel's transforms.
pub const FADE_IN_SELECTOR: &str = ".card:not([data-carousel-item])";
pub const FADE_IN_THRESHOLD: f64 = 0.1;
pub const FADE_IN_STAGGER_S: f64 = 0.1;

/// True once an element's top edge is above `percent`% of the viewport height.
pub fn in_view(top: f64, viewport_height: f64, percent: f64) -> bool {
    top <= viewport_height * (percent / 100.0)
}

/// Fraction of an element's height inside the viewport, in `[0, 1]`.
pub fn visible_fraction(top: f64, height: f64, viewport_height: f64) -> f64 {
    if height <= 0.0 {
        return if top >= 0.0 && top <= viewport_height { 1.0 } else { 0.0 };
    }
    let overlap = (top + height).min(viewport_height) - top.max(0.0);
    (overlap / height).clamp(0.0, 1.0)
}

/// Counts up to `target` in equal per-frame increments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Counter {
    target: i64,
    current: f64,
    increment: f64,
    done: bool,
}

impl Counter {
    pub fn new(target: i64) -> Self {
        Self {
            target,
            current: 0.0,
            increment: target as f64 / (COUNTER_DURATION_MS / COUNTER_FRAME_MS),
            done: false,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Advances one frame and returns the value to display.
    pub fn step(&mut self) -> i64 {
        if self.done {
            return self.target;
        }
        self.current += self.increment;
        // A zero or negative target never counts; it lands on the target right away.
        if self.increment > 0.0 && self.current < self.target as f64 {
            self.current.floor() as i64
        } else {
            self.done = true;
            self.target
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub scale: f64,
}

impl Tilt {
    pub const REST: Tilt = Tilt {
        rotate_x: 0.0,
        rotate_y: 0.0,
        scale: 1.0,
    };

    pub fn css(&self) -> String {
        format!(
            "perspective(1000px) rotateX({}deg) rotateY({}deg) scale({})",
            self.rotate_x, self.rotate_y, self.scale
        )
    }
}

/// Tilt for a pointer at `(x, y)` inside a `width` x `height` card.
pub fn tilt(x: f64, y: f64, width: f64, height: f64) -> Tilt {
    Tilt {
        rotate_x: (y - height / 2.0) / -20.0,
        rotate_y: (x - width / 2.0) / 20.0,
        scale: 1.02,
    }
}

pub fn apply_tilt(card: &HtmlElement, tilt: Tilt) -> Result<(), JsValue> {
    card.style().set_property("transform", &tilt.css())
}

/// Spotlight position used by the card hover gradient.
pub fn set_spotlight(card: &HtmlElement, x: f64, y: f64) -> Result<(), JsValue> {
    let style = card.style();
    style.set_property("--mouse-x", &format!("{x}px"))?;
    style.set_property("--mouse-y", &format!("{y}px"))
}

/// Runs `show` on every pending item that is `ready` and drops it from the
/// list. Every item is visited even after a failure; an item whose `show`
/// fails stays pending and the first error is returned.
pub fn show_ready<T, E>(
    pending: &mut Vec<T>,
    mut ready: impl FnMut(&T) -> bool,
    mut show: impl FnMut(&T) -> Result<(), E>,
) -> Result<(), E> {
    let mut first_err = None;
    pending.retain(|item| {
        if !ready(item) {
            return true;
        }
        match show(item) {
            Ok(()) => false,
            Err(err) => {
                first_err.get_or_insert(err);
                true
            }
        }
    });
    first_err.map_or(Ok(()), Err)
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// Elements waiting for their reveal class.
pub struct Reveal {
    pending: Vec<Element>,
}

impl Reveal {
    pub fn attach(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            pending: query_all(document, REVEAL_SELECTOR)?,
        })
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn update(&mut self, viewport_height: f64) -> Result<(), JsValue> {
        show_ready(
            &mut self.pending,
            |el| in_view(el.get_bounding_client_rect().top(), viewport_height, REVEAL_PERCENT),
            |el| el.class_list().add_1("active"),
        )
    }
}

/// Staggered fade-in for `.card` elements.
pub struct FadeIn {
    pending: Vec<HtmlElement>,
}

impl FadeIn {
    pub fn attach(document: &Document) -> Result<Self, JsValue> {
        let mut pending = Vec::new();
        for (index, el) in query_all(document, FADE_IN_SELECTOR)?.into_iter().enumerate() {
            let Ok(card) = el.dyn_into::<HtmlElement>() else {
                continue;
            };
            let style = card.style();
            style.set_property("opacity", "0")?;
            style.set_property("transform", "translateY(30px)")?;
            style.set_property("transition", "opacity 0.6s ease, transform 0.6s ease")?;
            style.set_property(
                "transition-delay",
                &format!("{}s", index as f64 * FADE_IN_STAGGER_S),
            )?;
            pending.push(card);
        }
        Ok(Self { pending })
    }

    pub fn update(&mut self, viewport_height: f64) -> Result<(), JsValue> {
        show_ready(
            &mut self.pending,
            |card| {
                let rect = card.get_bounding_client_rect();
                visible_fraction(rect.top(), rect.height(), viewport_height) >= FADE_IN_THRESHOLD
            },
            |card| {
                let style = card.style();
                style.set_property("opacity", "1")?;
                style.set_property("transform", "translateY(0)")
            },
        )
    }
}

/// Stat counters: wait until half visible, then count once.
pub struct Counters {
    waiting: Vec<(Element, i64)>,
    running: Vec<(Element, Counter)>,
}

impl Counters {
    pub fn attach(document: &Document) -> Result<Self, JsValue> {
        let mut waiting = Vec::new();
        for el in query_all(document, COUNTER_SELECTOR)? {
            let target = el
                .get_attribute("data-target")
                .and_then(|raw| raw.trim().parse::<i64>().ok());
            match target {
                Some(target) => waiting.push((el, target)),
                None => log::warn!("stat counter without a numeric data-target skipped"),
            }
        }
        Ok(Self {
            waiting,
            running: Vec::new(),
        })
    }

    pub fn is_idle(&self) -> bool {
        self.waiting.is_empty() && self.running.is_empty()
    }

    pub fn frame(&mut self, viewport_height: f64) {
        let mut still_waiting = Vec::with_capacity(self.waiting.len());
        for (el, target) in self.waiting.drain(..) {
            let rect = el.get_bounding_client_rect();
            if visible_fraction(rect.top(), rect.height(), viewport_height) >= COUNTER_THRESHOLD {
                self.running.push((el, Counter::new(target)));
            } else {
                still_waiting.push((el, target));
            }
        }
        self.waiting = still_waiting;

        self.running.retain_mut(|(el, counter)| {
            let shown = counter.step();
            el.set_text_content(Some(&shown.to_string()));
            !counter.is_done()
        });
    }
}
