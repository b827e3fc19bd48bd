use crawler_client::{ClientConfig, Page};
use tracing::warn;
use wasm_bindgen::prelude::*;

mod console;
mod dom;
mod logging;
mod socket;
mod xhr;

use console::WebConsole;
use dom::WebDom;
use socket::WebLogSocket;
use xhr::XhrTransport;

const CONFIG_ELEMENT_ID: &str = "crawler-config";

/// Bootstrap the page: live-log socket first, then the crawl controls.
///
/// Returns the container element the controls were rendered into.
#[wasm_bindgen]
pub fn init() -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let (config, config_err) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (ClientConfig::default(), Some(e)),
    };
    logging::install(&config);
    if let Some(e) = config_err {
        warn!("ignoring #{CONFIG_ELEMENT_ID}: {e}");
    }

    let dom = WebDom::new().map_err(to_js)?;
    let page = Page::new(dom, WebConsole, XhrTransport, WebLogSocket, config);
    let container = page.init().map_err(to_js)?;
    Ok(container.into())
}

fn load_config() -> Result<ClientConfig, crawler_client::ClientError> {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content())
        .unwrap_or_default();
    ClientConfig::from_json(&raw)
}

fn to_js(e: crawler_client::ClientError) -> JsValue {
    JsValue::from_str(&e.to_string())
}
