// WASM entrypoint for Trunk.
//
// Native builds are no-ops; the real client is behind `--features web` and
// `wasm32`.

fn main() {
    // No-op on native targets.
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    if let Err(e) = crawler_web::init() {
        web_sys::console::error_1(&e);
    }
}
