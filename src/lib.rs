pub mod carousel;
pub mod config;
pub mod diagnostics;
pub mod effects;
pub mod gallery;
pub mod geometry;
pub mod mascot;
pub mod particles;
pub mod pose;
pub mod projects;
pub mod render;
pub mod scene;
pub mod viewport;

use crate::config::SiteConfig;
use crate::diagnostics::{Diagnostics, MascotStart, startup_status};
use crate::effects::{Counters, FadeIn, Reveal};
use crate::gallery::Gallery;
use crate::mascot::Mascot;
use crate::particles::AmbientCanvas;
use crate::pose::{FeatureKind, Mode, PoseInputs, PoseUpdater};
use crate::render::{Renderer, create_webgl_context, js_value_to_string};
use crate::viewport::{Camera, Rect, ScrollTrack, Viewport};
use js_sys::Promise;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, Event, HtmlCanvasElement, HtmlElement, MouseEvent, PointerEvent, Window,
};

const RESIZE_SETTLE_MS: i32 = 140;
const PARTICLE_SETTLE_MS: [i32; 2] = [100, 500];
const MAX_PIXEL_RATIO: f64 = 2.0;
const DIAGNOSTICS_EVERY_FRAMES: u64 = 15;
/// Frame gaps longer than this (background tab) are not fed to auto-advance.
const MAX_FRAME_GAP_MS: f64 = 250.0;

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u32::MAX as f64) as u64
}

fn viewport_of(win: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    Viewport::new(dim(win.inner_width()), dim(win.inner_height()))
}

fn element_rect(document: &Document, selector: &str) -> Option<Rect> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .map(|el| Rect::from_dom(&el.get_bounding_client_rect()))
}

/// Resolves after `ms` on the window timer queue.
async fn sleep(win: &Window, ms: i32) -> Result<(), JsValue> {
    let promise = Promise::new(&mut |resolve, _reject| {
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
    });
    JsFuture::from(promise).await.map(|_| ())
}

/// The robot overlay: owns the renderer, the scene and the pose state.
struct MascotController {
    canvas: HtmlCanvasElement,
    renderer: Renderer,
    mascot: Mascot,
    pose: PoseUpdater,
    inputs: PoseInputs,
    camera: Camera,
    viewport: Viewport,
    track: ScrollTrack,
    scroll_y: f64,
    mode: Mode,
    draws: usize,
    context_lost: bool,
}

impl MascotController {
    fn new(document: &Document, container: &HtmlElement, now_ms: f64) -> Result<Self, JsValue> {
        // Fullscreen click-through overlay above the page.
        let style = container.style();
        style.set_property("position", "fixed")?;
        style.set_property("top", "0")?;
        style.set_property("left", "0")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("z-index", "50")?;
        style.set_property("pointer-events", "none")?;
        if let Some(body) = document.body() {
            body.append_child(container)?;
        }

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        container.append_child(&canvas)?;

        let gl = create_webgl_context(&canvas)?;
        let mascot = Mascot::build();
        let renderer = Renderer::new(gl, mascot.scene())?;
        log::info!(
            "mascot ready: {} nodes, {} meshes on {}",
            mascot.scene().len(),
            renderer.mesh_count(),
            renderer.info().renderer
        );

        Ok(Self {
            canvas,
            renderer,
            mascot,
            pose: PoseUpdater::new(now_ms, random_seed()),
            inputs: PoseInputs::new(now_ms),
            camera: Camera::default(),
            viewport: Viewport::new(1.0, 1.0),
            track: ScrollTrack::default(),
            scroll_y: 0.0,
            mode: Mode::Tracking,
            draws: 0,
            context_lost: false,
        })
    }

    fn resize(&mut self, viewport: Viewport, pixel_ratio: f64) {
        let ratio = pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO);
        let width = (viewport.width * ratio).round() as u32;
        let height = (viewport.height * ratio).round() as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", viewport.width));
        let _ = style.set_property("height", &format!("{}px", viewport.height));

        self.viewport = viewport;
        self.camera = Camera::for_viewport(viewport);
        self.renderer.resize(width as i32, height as i32);
    }

    fn frame(&mut self, document: &Document, now_ms: f64) {
        if self.context_lost {
            return;
        }
        self.track = ScrollTrack {
            hero: element_rect(document, ".hero-blue-visual"),
            heading: element_rect(document, "#what-we-do .section-title"),
        };
        let placement = self
            .track
            .placement(&self.camera, self.viewport, self.scroll_y);
        let mode = self
            .pose
            .update(&self.inputs, now_ms, &placement, &self.camera);
        if std::mem::discriminant(&mode) != std::mem::discriminant(&self.mode) {
            log::debug!("mascot mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
        self.mascot.apply(self.pose.pose());
        self.draws = self.renderer.draw(self.mascot.scene(), &self.camera);
    }
}

/// Everything the page animates, owned in one place. Event handlers write
/// inputs here; the frame callback consumes them.
struct Site {
    window: Window,
    document: Document,
    viewport: Viewport,
    mascot: Option<MascotController>,
    ambient: Option<AmbientCanvas>,
    galleries: Vec<Rc<RefCell<Gallery>>>,
    reveal: Option<Reveal>,
    fade_in: Option<FadeIn>,
    counters: Option<Counters>,
    diagnostics: Option<Diagnostics>,
    last_event: String,
    last_frame_ms: Option<f64>,
    frames: u64,
}

impl Site {
    fn set_status(&self, status: &str, message: &str) {
        match &self.diagnostics {
            Some(diag) => diag.set_status(status, message),
            None => diagnostics::set_status(&self.document, None, status, message),
        }
    }

    fn resize(&mut self) {
        self.viewport = viewport_of(&self.window);
        let ratio = self.window.device_pixel_ratio();
        if let Some(mascot) = &mut self.mascot {
            mascot.resize(self.viewport, ratio);
        }
        if let Some(ambient) = &mut self.ambient {
            ambient.resize(self.viewport.width);
        }
    }

    fn scrolled(&mut self) {
        let scroll_y = self.window.scroll_y().unwrap_or_default();
        if let Some(mascot) = &mut self.mascot {
            mascot.scroll_y = scroll_y;
        }
        if let Some(reveal) = &mut self.reveal {
            if let Err(err) = reveal.update(self.viewport.height) {
                log::warn!("reveal update failed: {}", js_value_to_string(&err));
            }
        }
    }

    fn pointer_moved(&mut self, client_x: f64, client_y: f64, now_ms: f64) {
        if let Some(mascot) = &mut self.mascot {
            let ndc = self.viewport.to_ndc(client_x, client_y);
            mascot.inputs.pointer_moved(ndc, now_ms);
        }
        if let Some(ambient) = &mut self.ambient {
            ambient.pointer(client_x, client_y);
        }
    }

    fn hover_feature(&mut self, feature: Option<FeatureKind>) {
        if let Some(mascot) = &mut self.mascot {
            mascot.inputs.hover(feature);
        }
    }

    fn frame(&mut self, now_ms: f64) {
        let dt = self
            .last_frame_ms
            .map(|last| now_ms - last)
            .filter(|dt| *dt <= MAX_FRAME_GAP_MS)
            .unwrap_or(0.0);
        self.last_frame_ms = Some(now_ms);
        self.frames += 1;

        if let Some(mascot) = &mut self.mascot {
            mascot.frame(&self.document, now_ms);
        }
        if let Some(ambient) = &mut self.ambient {
            if let Err(err) = ambient.frame() {
                log::warn!("particles disabled: {}", js_value_to_string(&err));
                self.ambient = None;
            }
        }
        for gallery in &self.galleries {
            if let Err(err) = gallery.borrow_mut().frame(dt) {
                log::warn!("gallery frame failed: {}", js_value_to_string(&err));
            }
        }
        if let Some(fade_in) = &mut self.fade_in {
            if let Err(err) = fade_in.update(self.viewport.height) {
                log::warn!("fade-in update failed: {}", js_value_to_string(&err));
            }
        }
        if let Some(counters) = &mut self.counters {
            counters.frame(self.viewport.height);
            if counters.is_idle() {
                self.counters = None;
            }
        }
        if self.frames % DIAGNOSTICS_EVERY_FRAMES == 0 {
            self.update_diagnostics();
        }
    }

    fn diagnostics_lines(&self, diag: &Diagnostics) -> Vec<String> {
        let mut lines = vec![
            format!("status: {}", diag.status()),
            format!("event: {}", self.last_event),
            format!(
                "viewport: {}x{} (dpr {:.2})",
                self.viewport.width.floor(),
                self.viewport.height.floor(),
                self.window.device_pixel_ratio()
            ),
            format!("frames: {}", self.frames),
        ];
        match &self.mascot {
            Some(m) => {
                let pose = m.pose.pose();
                let info = m.renderer.info();
                lines.extend([
                    format!("mode: {}", m.mode),
                    format!("scroll_y: {:.0}", m.scroll_y),
                    format!(
                        "root: ({:.2}, {:.2}) @ scale {:.2}",
                        pose.root_position.x, pose.root_position.y, pose.root_scale
                    ),
                    format!(
                        "held: {}",
                        pose.held.map(|p| p.name()).unwrap_or("none")
                    ),
                    format!(
                        "anchors: hero {} heading {}",
                        m.track.hero.is_some(),
                        m.track.heading.is_some()
                    ),
                    format!("draws: {}", m.draws),
                    format!("context_lost: {}", m.context_lost),
                    format!(
                        "canvas: {}x{}",
                        m.canvas.width(),
                        m.canvas.height()
                    ),
                    format!("limits: max_tex {}", info.max_texture_size),
                    format!("gl: {}", info.version),
                    format!("renderer: {}", info.renderer),
                    format!("vendor: {}", info.vendor),
                    format!("gl_error: {}", m.renderer.last_gl_error().unwrap_or("none")),
                ]);
            }
            None => lines.push("mascot: off".to_string()),
        }
        match &self.ambient {
            Some(a) => lines.push(format!(
                "particles: {} (+{} sparkles)",
                a.field().particles().len(),
                a.field().sparkles().len()
            )),
            None => lines.push("particles: off".to_string()),
        }
        for gallery in &self.galleries {
            let g = gallery.borrow();
            lines.push(format!(
                "gallery {}: {}/{}",
                g.name(),
                g.carousel().current() + 1,
                g.carousel().len()
            ));
        }
        lines.push(format!(
            "reveal_pending: {}",
            self.reveal.as_ref().map(|r| r.pending()).unwrap_or(0)
        ));
        lines.push(format!("ua: {}", diag.user_agent_line()));
        lines
    }

    fn update_diagnostics(&self) {
        let Some(diag) = &self.diagnostics else {
            return;
        };
        if !diag.is_open() {
            return;
        }
        diag.show(&self.diagnostics_lines(diag));
        if let Err(err) = diag.update_lan_share_qr(&self.window.location()) {
            log::debug!("lan share unavailable: {}", js_value_to_string(&err));
        }
    }
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn listen<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn bind_feature_cards(document: &Document, site: &Rc<RefCell<Site>>) -> Result<(), JsValue> {
    for card in query_all(document, ".feature-card[data-feature]")? {
        let feature = card
            .get_attribute("data-feature")
            .unwrap_or_default()
            .parse::<FeatureKind>();
        let feature = match feature {
            Ok(feature) => feature,
            Err(reason) => {
                log::warn!("feature card ignored: {reason}");
                continue;
            }
        };

        let site_enter = Rc::clone(site);
        listen(&card, "mouseenter", move |_: Event| {
            let mut site = site_enter.borrow_mut();
            site.hover_feature(Some(feature));
            site.last_event = format!("hover_{}", feature.prop().name());
        })?;

        let site_leave = Rc::clone(site);
        listen(&card, "mouseleave", move |_: Event| {
            let mut site = site_leave.borrow_mut();
            site.hover_feature(None);
            site.last_event = "hover_none".to_string();
        })?;

        let spotlight = card.clone();
        listen(&card, "mousemove", move |event: MouseEvent| {
            let rect = spotlight.get_bounding_client_rect();
            if let Some(el) = spotlight.dyn_ref::<HtmlElement>() {
                let _ = effects::set_spotlight(
                    el,
                    event.client_x() as f64 - rect.left(),
                    event.client_y() as f64 - rect.top(),
                );
            }
        })?;
    }
    Ok(())
}

fn bind_tilt_cards(document: &Document, site: &Rc<RefCell<Site>>) -> Result<(), JsValue> {
    for (index, card) in query_all(document, ".card")?.into_iter().enumerate() {
        let Ok(card) = card.dyn_into::<HtmlElement>() else {
            continue;
        };

        let tilted = card.clone();
        listen(&card, "mousemove", move |event: MouseEvent| {
            let rect = tilted.get_bounding_client_rect();
            let x = event.client_x() as f64 - rect.left();
            let y = event.client_y() as f64 - rect.top();
            let _ = effects::apply_tilt(&tilted, effects::tilt(x, y, rect.width(), rect.height()));
            let _ = effects::set_spotlight(&tilted, x, y);
        })?;

        let site_enter = Rc::clone(site);
        listen(&card, "mouseenter", move |_: Event| {
            if let Some(ambient) = &mut site_enter.borrow_mut().ambient {
                ambient.set_active_card(Some(index));
            }
        })?;

        let site_leave = Rc::clone(site);
        let rested = card.clone();
        listen(&card, "mouseleave", move |_: Event| {
            let _ = effects::apply_tilt(&rested, effects::Tilt::REST);
            if let Some(ambient) = &mut site_leave.borrow_mut().ambient {
                ambient.set_active_card(None);
            }
        })?;
    }
    Ok(())
}

fn bind_window_events(win: &Window, document: &Document, site: &Rc<RefCell<Site>>) -> Result<(), JsValue> {
    let site_pointer = Rc::clone(site);
    listen(document, "pointermove", move |event: PointerEvent| {
        let mut site = site_pointer.borrow_mut();
        site.pointer_moved(
            event.client_x() as f64,
            event.client_y() as f64,
            event.time_stamp(),
        );
    })?;

    let site_scroll = Rc::clone(site);
    listen(win, "scroll", move |_: Event| {
        site_scroll.borrow_mut().scrolled();
    })?;

    let resize_timer_handle: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));
    let site_settle = Rc::clone(site);
    let resize_settle_cb: Rc<Closure<dyn FnMut()>> = Rc::new(Closure::wrap(Box::new(move || {
        let mut site = site_settle.borrow_mut();
        site.last_event = "resize_settled".to_string();
        site.resize();
        site.scrolled();
    }) as Box<dyn FnMut()>));

    let site_resize = Rc::clone(site);
    let win_resize = win.clone();
    listen(win, "resize", move |_: Event| {
        site_resize.borrow_mut().last_event = "resize_event".to_string();

        if let Some(id) = resize_timer_handle.borrow_mut().take() {
            win_resize.clear_timeout_with_handle(id);
        }

        match win_resize.set_timeout_with_callback_and_timeout_and_arguments_0(
            resize_settle_cb.as_ref().as_ref().unchecked_ref(),
            RESIZE_SETTLE_MS,
        ) {
            Ok(id) => {
                *resize_timer_handle.borrow_mut() = Some(id);
            }
            Err(_) => site_resize.borrow_mut().resize(),
        }
    })?;
    Ok(())
}

fn bind_diagnostics_toggle(site: &Rc<RefCell<Site>>) -> Result<(), JsValue> {
    let button = match site.borrow().diagnostics.as_ref().and_then(|d| d.tools_button().cloned()) {
        Some(button) => button,
        None => return Ok(()),
    };
    let site_toggle = Rc::clone(site);
    listen(&button, "click", move |_: Event| {
        let mut site = site_toggle.borrow_mut();
        site.last_event = "toggle_diagnostics".to_string();
        if let Some(diag) = &mut site.diagnostics {
            let open = !diag.is_open();
            diag.set_open(open);
        }
        site.update_diagnostics();
    })
}

fn bind_context_loss(site: &Rc<RefCell<Site>>) -> Result<(), JsValue> {
    let canvas = match &site.borrow().mascot {
        Some(mascot) => mascot.canvas.clone(),
        None => return Ok(()),
    };
    let site_lost = Rc::clone(site);
    listen(&canvas, "webglcontextlost", move |event: Event| {
        event.prevent_default();
        let mut site = site_lost.borrow_mut();
        if let Some(mascot) = &mut site.mascot {
            mascot.context_lost = true;
        }
        site.last_event = "webglcontextlost".to_string();
        log::error!("WebGL context lost; mascot stopped");
        site.set_status("context_lost", "WebGL context lost (try reloading)");
        site.update_diagnostics();
    })
}

/// One requestAnimationFrame loop drives every animated component.
fn start_frame_loop(win: &Window, site: Rc<RefCell<Site>>) -> Result<(), JsValue> {
    let frame_cb: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let frame_cb_next = Rc::clone(&frame_cb);
    let win_next = win.clone();

    *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        site.borrow_mut().frame(ts);
        if let Some(cb) = frame_cb_next.borrow().as_ref() {
            if win_next
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .is_err()
            {
                log::error!("requestAnimationFrame failed; animation stopped");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let first = frame_cb.borrow();
    let cb = first
        .as_ref()
        .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
    win.request_animation_frame(cb.as_ref().unchecked_ref())?;
    Ok(())
}

/// The particle canvas is re-measured shortly after load while fonts and
/// images settle the section height.
fn settle_particles(win: &Window, site: &Rc<RefCell<Site>>) {
    let win = win.clone();
    let site = Rc::clone(site);
    spawn_local(async move {
        for ms in PARTICLE_SETTLE_MS {
            if sleep(&win, ms).await.is_err() {
                return;
            }
            let mut site = site.borrow_mut();
            let width = site.viewport.width;
            if let Some(ambient) = &mut site.ambient {
                ambient.resize(width);
            }
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(err) = start_impl() {
        let message = format!("fatal: {}", js_value_to_string(&err));

        if let Some(win) = web_sys::window() {
            if let Some(doc) = win.document() {
                if let Some(el) = doc.document_element() {
                    let _ = el.set_attribute("data-render-status", "error");
                }
                if let Some(diag) = doc.get_element_by_id("diagnostics-text") {
                    diag.set_text_content(Some(&message));
                } else if let Some(diag) = doc.get_element_by_id("diagnostics") {
                    diag.set_text_content(Some(&message));
                }
            }
        }

        log::error!("{message}");
        web_sys::console::error_1(&err);
    }
}

fn start_impl() -> Result<(), JsValue> {
    let win = window()?;
    let document = win
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;

    let config = SiteConfig::from_query(&win.location().search().unwrap_or_default());
    if console_log::init_with_level(config.log_level).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("logger already initialised"));
    }
    log::debug!("config: {:?}", config);

    let user_agent = win.navigator().user_agent().unwrap_or_default();
    let is_headless = user_agent.to_ascii_lowercase().contains("headless");
    let mut diagnostics = Diagnostics::attach(&document, user_agent);
    if let Some(diag) = &mut diagnostics {
        diag.set_open(config.diagnostics || is_headless);
        diag.set_status("loading", "Starting");
    }

    let now_ms = win.performance().map(|p| p.now()).unwrap_or_default();

    // A broken mascot only hides the mascot; the rest of the page still animates.
    let (mascot, mascot_start) = if !config.mascot {
        log::info!("mascot disabled by config");
        (None, MascotStart::Disabled)
    } else {
        match document
            .get_element_by_id("robot-container")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            None => {
                log::warn!("#robot-container missing; mascot skipped");
                (None, MascotStart::NoContainer)
            }
            Some(container) => match MascotController::new(&document, &container, now_ms) {
                Ok(mascot) => (Some(mascot), MascotStart::Running),
                Err(err) => {
                    log::error!("mascot failed to start: {}", js_value_to_string(&err));
                    (None, MascotStart::Failed)
                }
            },
        }
    };

    let ambient = if config.particles {
        let ambient = AmbientCanvas::attach(&document, config.particle_count, random_seed())?;
        if ambient.is_none() {
            log::debug!("no ambient canvas on this page");
        }
        ambient
    } else {
        None
    };

    let galleries = gallery::attach_all(&document)?;
    let reveal = Reveal::attach(&document)?;
    let fade_in = FadeIn::attach(&document)?;
    let counters = Counters::attach(&document)?;

    let site = Rc::new(RefCell::new(Site {
        window: win.clone(),
        document: document.clone(),
        viewport: viewport_of(&win),
        mascot,
        ambient,
        galleries,
        reveal: Some(reveal),
        fade_in: Some(fade_in),
        counters: Some(counters),
        diagnostics,
        last_event: "init".to_string(),
        last_frame_ms: None,
        frames: 0,
    }));

    {
        let mut site = site.borrow_mut();
        site.resize();
        site.scrolled();
        log::info!(
            "site started: mascot {}, particles {}, {} galleries",
            site.mascot.is_some(),
            site.ambient.is_some(),
            site.galleries.len()
        );
    }

    bind_window_events(&win, &document, &site)?;
    bind_feature_cards(&document, &site)?;
    bind_tilt_cards(&document, &site)?;
    bind_diagnostics_toggle(&site)?;
    bind_context_loss(&site)?;
    settle_particles(&win, &site);

    {
        let site = site.borrow();
        let (status, message) = startup_status(mascot_start);
        site.set_status(status, message);
        site.update_diagnostics();
    }

    start_frame_loop(&win, site)
}
