use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, Document, Element, EventTarget, HtmlElement, Window};

pub fn browser_window() -> Result<Window, JsValue> {
    window().ok_or_else(|| JsValue::from_str("no global window"))
}

pub fn document() -> Result<Document, JsValue> {
    browser_window()?
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))
}

pub fn body() -> Result<HtmlElement, JsValue> {
    document()?
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))
}

pub fn by_id(id: &str) -> Result<Option<HtmlElement>, JsValue> {
    Ok(document()?
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok()))
}

pub fn query(selector: &str) -> Result<Option<HtmlElement>, JsValue> {
    Ok(document()?
        .query_selector(selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok()))
}

/// All `HtmlElement`s under `root` matching `selector`, in document order.
pub fn query_all_in(root: &Element, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    collect_html(root.query_selector_all(selector)?)
}

pub fn query_all(selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    collect_html(document()?.query_selector_all(selector)?)
}

fn collect_html(list: web_sys::NodeList) -> Result<Vec<HtmlElement>, JsValue> {
    let mut out = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
            out.push(el);
        }
    }
    Ok(out)
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) -> Result<(), JsValue> {
    el.style().set_property(property, value)
}

/// Registers `handler` for the lifetime of the page.
pub fn listen<E>(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue>
where
    E: 'static,
    dyn FnMut(E): WasmClosure,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn scroll_y() -> f64 {
    browser_window()
        .and_then(|w| w.scroll_y())
        .unwrap_or(0.0)
}

/// Monotonic milliseconds since page load, falling back to wall time when
/// the Performance API is absent.
pub fn now_ms() -> f64 {
    browser_window()
        .ok()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(web_sys::js_sys::Date::now)
}
