#![cfg(target_arch = "wasm32")]

use rlabz_site::mascot::Mascot;
use rlabz_site::pose::{Pose, Prop};
use rlabz_site::render::{Renderer, create_webgl_context, gl_check};
use rlabz_site::viewport::{Camera, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, WebGlRenderingContext as Gl};

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> HtmlCanvasElement {
    let window = web_sys::window().expect("no window");
    let document = window.document().expect("no document");
    let canvas = document
        .create_element("canvas")
        .expect("create canvas")
        .dyn_into::<HtmlCanvasElement>()
        .expect("canvas element");
    canvas.set_width(320);
    canvas.set_height(240);
    canvas
}

#[wasm_bindgen_test]
fn webgl_context_available() {
    let gl = create_webgl_context(&canvas()).expect("webgl context");
    assert!(gl.get_error() == Gl::NO_ERROR);
}

#[wasm_bindgen_test]
fn renderer_uploads_every_mascot_mesh() {
    let mascot = Mascot::build();
    let gl = create_webgl_context(&canvas()).expect("webgl context");
    let renderer = Renderer::new(gl, mascot.scene()).expect("renderer");
    assert_eq!(renderer.mesh_count(), mascot.scene().meshes().len());
    assert_eq!(renderer.last_gl_error(), None);
    assert!(renderer.info().max_texture_size > 0);
}

#[wasm_bindgen_test]
fn renderer_draws_the_posed_mascot() {
    let mut mascot = Mascot::build();
    let gl = create_webgl_context(&canvas()).expect("webgl context");
    let mut renderer = Renderer::new(gl, mascot.scene()).expect("renderer");
    renderer.resize(320, 240);
    let camera = Camera::for_viewport(Viewport::new(320.0, 240.0));

    let idle = renderer.draw(mascot.scene(), &camera);
    assert_eq!(idle, mascot.scene().world_draws().len());

    mascot.apply(&Pose {
        held: Some(Prop::Laptop),
        ..Pose::default()
    });
    let holding = renderer.draw(mascot.scene(), &camera);
    assert!(holding > idle);
    assert_eq!(gl_check(renderer.gl(), "test draw"), None);
}
