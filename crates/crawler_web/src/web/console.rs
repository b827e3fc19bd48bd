use crawler_client::Console;
use wasm_bindgen::JsValue;

#[derive(Clone, Copy)]
pub(super) struct WebConsole;

impl Console for WebConsole {
    type Object = JsValue;

    fn log(&self, text: &str) {
        web_sys::console::log_1(&JsValue::from_str(text));
    }

    fn log_obj(&self, obj: &JsValue) {
        web_sys::console::log_1(obj);
    }
}
