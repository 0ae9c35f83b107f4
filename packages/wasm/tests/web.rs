//! Browser tests. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use network_backdrop_wasm::NetworkBackdrop;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn container() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let element = document
        .create_element("div")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

#[wasm_bindgen_test]
fn test_mount_and_unmount() {
    let element = container();

    let backdrop = NetworkBackdrop::new(Some(element.clone()), JsValue::UNDEFINED).unwrap();

    assert!(backdrop.is_active());
    assert_eq!(backdrop.node_count(), 40);
    assert_eq!(backdrop.particle_count(), 30);
    assert_eq!(backdrop.positions_x_view().length(), 40);
    assert_eq!(element.child_element_count(), 1);
    assert!(element.query_selector("canvas").unwrap().is_some());

    backdrop.unmount();
    backdrop.unmount();

    assert!(!backdrop.is_active());
    assert_eq!(element.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn test_missing_container_is_noop() {
    let backdrop = NetworkBackdrop::new(None, JsValue::NULL).unwrap();

    assert!(!backdrop.is_active());
    assert_eq!(backdrop.node_count(), 0);
    backdrop.unmount();
}

#[wasm_bindgen_test]
fn test_malformed_options_throw() {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"nodeCount".into(), &"many".into()).unwrap();

    assert!(NetworkBackdrop::new(Some(container()), options.into()).is_err());
}

#[wasm_bindgen_test]
fn test_invalid_threshold_throws() {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"connectionThreshold".into(), &JsValue::from(-1.0)).unwrap();

    assert!(NetworkBackdrop::new(Some(container()), options.into()).is_err());
}
