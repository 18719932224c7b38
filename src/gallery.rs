//! Binds `[data-carousel]` elements on the page to [`Carousel`] cursors.

use crate::carousel::{Carousel, DEFAULT_INTERVAL_MS, ItemTransform, Transition, WheelStep};
use crate::projects::{self, Project};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event, HtmlElement, WheelEvent};

pub const GALLERY_SELECTOR: &str = "[data-carousel]";
const ITEM_SELECTOR: &str = "[data-carousel-item]";
const IMAGE_SELECTOR: &str = "[data-carousel-image]";

pub struct Gallery {
    root: Element,
    items: Vec<HtmlElement>,
    /// Optional second column paired with `items` by index.
    images: Vec<HtmlElement>,
    carousel: Carousel,
}

fn populate_bento(document: &Document, root: &Element, list: &[Project]) -> Result<(), JsValue> {
    for project in list {
        let card = document.create_element("div")?;
        card.set_class_name("bento-card");
        card.set_attribute("data-carousel-item", "")?;
        card.set_attribute("data-project-id", &project.id.to_string())?;
        card.append_child(&project_image(document, project)?.into())?;

        let overlay = document.create_element("div")?;
        overlay.set_class_name("bento-overlay");
        let content = document.create_element("div")?;
        content.set_class_name("bento-content");
        let title = document.create_element("h3")?;
        title.set_text_content(Some(project.title));
        let desc = document.create_element("p")?;
        desc.set_text_content(Some(project.description));
        content.append_child(&title)?;
        content.append_child(&desc)?;
        append_details(document, &content, project)?;
        overlay.append_child(&content)?;
        card.append_child(&overlay)?;

        root.append_child(&card)?;
    }
    Ok(())
}

/// Existing `.{class}` child of `root`, or a new one appended to it.
fn column(document: &Document, root: &Element, class: &str) -> Result<Element, JsValue> {
    if let Some(existing) = root.query_selector(&format!(".{class}"))? {
        return Ok(existing);
    }
    let column = document.create_element("div")?;
    column.set_class_name(class);
    root.append_child(&column)?;
    Ok(column)
}

/// Two columns per project: a text card on the left, its image on the right.
fn populate_slides(document: &Document, root: &Element, list: &[Project]) -> Result<(), JsValue> {
    let left = column(document, root, "left-column")?;
    let right = column(document, root, "right-column")?;
    for project in list {
        let id = project.id.to_string();

        let card = document.create_element("div")?;
        card.set_class_name("card");
        card.set_attribute("data-carousel-item", "")?;
        card.set_attribute("data-project-id", &id)?;
        let title = document.create_element("h1")?;
        title.set_text_content(Some(project.title));
        let desc = document.create_element("p")?;
        desc.set_text_content(Some(project.description));
        let link = document.create_element("a")?;
        link.set_class_name("explore-btn");
        link.set_attribute("href", project.link)?;
        link.set_attribute("target", "_blank")?;
        link.set_attribute("rel", "noopener")?;
        link.set_text_content(Some("View Project \u{2192}"));
        card.append_child(&title)?;
        card.append_child(&desc)?;
        append_details(document, &card, project)?;
        card.append_child(&link)?;
        left.append_child(&card)?;

        let image_card = document.create_element("div")?;
        image_card.set_class_name("image-card");
        image_card.set_attribute("data-carousel-image", "")?;
        image_card.set_attribute("data-project-id", &id)?;
        image_card.append_child(&project_image(document, project)?.into())?;
        right.append_child(&image_card)?;
    }
    Ok(())
}

/// Byline and tag chips under a project's description.
fn append_details(document: &Document, parent: &Element, project: &Project) -> Result<(), JsValue> {
    let byline = project.byline();
    if !byline.is_empty() {
        let meta = document.create_element("p")?;
        meta.set_class_name("project-meta");
        meta.set_text_content(Some(&byline));
        parent.append_child(&meta)?;
    }
    if !project.tags.is_empty() {
        let list = document.create_element("ul")?;
        list.set_class_name("project-tags");
        for &tag in project.tags {
            let item = document.create_element("li")?;
            item.set_text_content(Some(tag));
            list.append_child(&item)?;
        }
        parent.append_child(&list)?;
    }
    Ok(())
}

fn project_image(document: &Document, project: &Project) -> Result<Element, JsValue> {
    let img = document.create_element("img")?;
    img.set_attribute("src", project.image)?;
    img.set_attribute("alt", project.title)?;
    img.set_attribute("loading", "lazy")?;
    Ok(img)
}

fn populate_projects(
    document: &Document,
    root: &Element,
    list: &[Project],
    transition: Transition,
) -> Result<(), JsValue> {
    match transition {
        Transition::Slide => populate_slides(document, root, list),
        _ => populate_bento(document, root, list),
    }
}

fn parse_transition(root: &Element) -> Result<Transition, String> {
    let style = root.get_attribute("data-carousel").unwrap_or_default();
    let transition = style.parse::<Transition>()?;
    Ok(match transition {
        Transition::Bento { per_view } => Transition::Bento {
            per_view: root
                .get_attribute("data-per-view")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(per_view),
        },
        other => other,
    })
}

/// Auto-advance interval: `data-interval` wins, then the style's default.
fn interval_for(root: &Element, transition: Transition) -> f64 {
    if let Some(ms) = root
        .get_attribute("data-interval")
        .and_then(|raw| raw.trim().parse::<f64>().ok())
    {
        return ms;
    }
    if transition.steps_on_wheel() {
        0.0
    } else {
        DEFAULT_INTERVAL_MS
    }
}

fn collect(root: &Element, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

impl Gallery {
    fn new(document: &Document, root: Element) -> Result<Option<Self>, String> {
        let transition = parse_transition(&root)?;
        if root.get_attribute("data-source").as_deref() == Some("projects") {
            populate_projects(document, &root, projects::all(), transition)
                .map_err(|err| crate::render::js_value_to_string(&err))?;
        }
        let items =
            collect(&root, ITEM_SELECTOR).map_err(|err| crate::render::js_value_to_string(&err))?;
        if items.is_empty() {
            return Ok(None);
        }
        let mut images =
            collect(&root, IMAGE_SELECTOR).map_err(|err| crate::render::js_value_to_string(&err))?;
        if !images.is_empty() && images.len() != items.len() {
            log::warn!(
                "gallery has {} items but {} images; images ignored",
                items.len(),
                images.len()
            );
            images.clear();
        }
        let carousel =
            Carousel::new(items.len(), transition).with_interval(interval_for(&root, transition));
        Ok(Some(Self {
            root,
            items,
            images,
            carousel,
        }))
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn name(&self) -> String {
        self.root
            .get_attribute("id")
            .unwrap_or_else(|| self.carousel.transition().name().to_string())
    }

    /// Writes every item's transform, opacity and active class. Paired images
    /// get the mirrored transform.
    pub fn render(&self) -> Result<(), JsValue> {
        for (i, item) in self.items.iter().enumerate() {
            let t = self.carousel.item_transform(i);
            self.render_item(item, t)?;
            if let Some(image) = self.images.get(i) {
                self.render_item(image, t.mirrored())?;
            }
        }
        if matches!(self.carousel.transition(), Transition::Bento { .. }) {
            let classes = self.root.class_list();
            classes.remove_1("fade-in")?;
            // Force a reflow so the animation restarts on every page.
            if let Some(el) = self.root.dyn_ref::<HtmlElement>() {
                let _ = el.offset_width();
            }
            classes.add_1("fade-in")?;
        }
        Ok(())
    }

    fn render_item(&self, item: &HtmlElement, t: ItemTransform) -> Result<(), JsValue> {
        let style = item.style();
        match self.carousel.transition() {
            Transition::Bento { .. } => {
                style.set_property("display", if t.visible { "" } else { "none" })?;
            }
            _ => {
                style.set_property("transform", &t.css())?;
                style.set_property("opacity", &t.opacity.to_string())?;
                style.set_property("z-index", &t.z_index.to_string())?;
            }
        }
        item.class_list().toggle_with_force("active", t.active)?;
        item.set_attribute("aria-hidden", if t.visible { "false" } else { "true" })?;
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), JsValue> {
        self.carousel.next();
        self.render()
    }

    pub fn prev(&mut self) -> Result<(), JsValue> {
        self.carousel.prev();
        self.render()
    }

    /// Called once per animation frame.
    pub fn frame(&mut self, dt_ms: f64) -> Result<(), JsValue> {
        if self.carousel.tick(dt_ms) {
            self.render()?;
        }
        Ok(())
    }

    pub fn wheel(&mut self, delta_y: f64, now_ms: f64) -> Result<WheelStep, JsValue> {
        let step = self.carousel.wheel(delta_y, now_ms);
        if let WheelStep::Stepped(_) = step {
            self.render()?;
        }
        Ok(step)
    }
}

fn on_click(
    root: &Element,
    selector: &str,
    gallery: &Rc<RefCell<Gallery>>,
    forward: bool,
) -> Result<(), JsValue> {
    let Some(button) = root.query_selector(selector)? else {
        return Ok(());
    };
    let gallery = Rc::clone(gallery);
    let cb = Closure::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        let mut gallery = gallery.borrow_mut();
        let moved = if forward { gallery.next() } else { gallery.prev() };
        if let Err(err) = moved {
            log::warn!("gallery step failed: {}", crate::render::js_value_to_string(&err));
        }
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn on_wheel(root: &Element, gallery: &Rc<RefCell<Gallery>>) -> Result<(), JsValue> {
    let gallery = Rc::clone(gallery);
    let cb = Closure::wrap(Box::new(move |event: WheelEvent| {
        let step = gallery
            .borrow_mut()
            .wheel(event.delta_y(), event.time_stamp());
        match step {
            Ok(step) if step.captures() => event.prevent_default(),
            Ok(_) => {}
            Err(err) => log::warn!("gallery wheel failed: {}", crate::render::js_value_to_string(&err)),
        }
    }) as Box<dyn FnMut(_)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    root.add_event_listener_with_callback_and_add_event_listener_options(
        "wheel",
        cb.as_ref().unchecked_ref(),
        &options,
    )?;
    cb.forget();
    Ok(())
}

/// Finds every gallery on the page, renders its first state and binds its controls.
/// A gallery with an unknown style or no items is skipped with a warning.
pub fn attach_all(document: &Document) -> Result<Vec<Rc<RefCell<Gallery>>>, JsValue> {
    let roots = document.query_selector_all(GALLERY_SELECTOR)?;
    let mut galleries = Vec::new();
    for i in 0..roots.length() {
        let Some(root) = roots.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let gallery = match Gallery::new(document, root.clone()) {
            Ok(Some(gallery)) => gallery,
            Ok(None) => {
                log::warn!("gallery #{i} has no items; skipped");
                continue;
            }
            Err(reason) => {
                log::warn!("gallery #{i} skipped: {reason}");
                continue;
            }
        };
        gallery.render()?;
        log::debug!(
            "gallery {} bound: {} items, style {}",
            gallery.name(),
            gallery.carousel().len(),
            gallery.carousel().transition().name()
        );

        let gallery = Rc::new(RefCell::new(gallery));
        on_click(&root, "[data-carousel-next]", &gallery, true)?;
        on_click(&root, "[data-carousel-prev]", &gallery, false)?;
        if gallery.borrow().carousel().transition().steps_on_wheel() {
            on_wheel(&root, &gallery)?;
        }
        galleries.push(gallery);
    }
    Ok(galleries)
}
