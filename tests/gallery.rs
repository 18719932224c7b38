#![cfg(target_arch = "wasm32")]

use rlabz_site::effects::FadeIn;
use rlabz_site::gallery;
use rlabz_site::projects;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .expect("no window")
        .document()
        .expect("no document")
}

fn transform(root: &Element, selector: &str) -> String {
    root.query_selector(selector)
        .expect("query")
        .expect("element")
        .dyn_into::<HtmlElement>()
        .expect("html element")
        .style()
        .get_property_value("transform")
        .expect("transform")
}

#[wasm_bindgen_test]
fn project_slider_builds_paired_columns() {
    let document = document();
    let root = document.create_element("section").expect("section");
    root.set_id("our-works-slider");
    root.set_attribute("data-carousel", "slide").expect("attr");
    root.set_attribute("data-source", "projects").expect("attr");
    document
        .body()
        .expect("body")
        .append_child(&root)
        .expect("append");

    let galleries = gallery::attach_all(&document).expect("attach");
    let slider = galleries
        .iter()
        .find(|g| g.borrow().name() == "our-works-slider")
        .expect("slider bound");
    assert_eq!(slider.borrow().carousel().len(), projects::all().len());

    let cards = root.query_selector_all(".left-column .card").expect("cards");
    let images = root
        .query_selector_all(".right-column .image-card img")
        .expect("images");
    assert_eq!(cards.length() as usize, projects::all().len());
    assert_eq!(images.length(), cards.length());

    let first = root.query_selector(".card").expect("query").expect("card");
    assert!(first.class_list().contains("active"));
    assert_eq!(
        first.query_selector("h1").expect("query").and_then(|h| h.text_content()),
        Some("Splendore".to_string())
    );
    let link = first
        .query_selector("a.explore-btn")
        .expect("query")
        .expect("link");
    assert_eq!(link.get_attribute("href").as_deref(), Some("#"));
    assert_eq!(link.text_content().as_deref(), Some("View Project \u{2192}"));
    let tags = first.query_selector_all(".project-tags li").expect("tags");
    assert_eq!(tags.length() as usize, projects::all()[0].tags.len());
    assert_eq!(
        first
            .query_selector(".project-meta")
            .expect("query")
            .and_then(|m| m.text_content()),
        Some(projects::all()[0].byline())
    );

    // The second project waits below in the text column and above in the image column.
    let text_next = transform(&root, ".card:nth-child(2)");
    let image_next = transform(&root, ".image-card:nth-child(2)");
    assert!(!text_next.contains("-100%"), "{text_next}");
    assert!(text_next.contains("100%"), "{text_next}");
    assert!(image_next.contains("-100%"), "{image_next}");

    // The staggered card fade-in leaves carousel cards alone.
    FadeIn::attach(&document).expect("fade-in");
    let text_next_after = transform(&root, ".card:nth-child(2)");
    assert_eq!(text_next_after, text_next);

    slider.borrow_mut().next().expect("next");
    let image_prev = transform(&root, ".image-card:nth-child(1)");
    assert!(!image_prev.contains("-100%"), "{image_prev}");
    assert!(image_prev.contains("100%"), "{image_prev}");

    root.remove();
}
