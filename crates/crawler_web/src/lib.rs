//! Browser build of the crawler control page.
//!
//! Without `--features web` on a wasm32 target this crate is empty, so the
//! workspace builds and tests natively.

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::init;
