//! WebAssembly bindings for Stratum work processing.
//!
//! The host (browser or Node) owns the pool connection. It hands decoded
//! subscribe/notify data to a [`Worker`] and gets back headers, header hashes,
//! midstates and share tuples.

use wasm_bindgen::prelude::*;

pub mod state;
pub mod worker;

// Re-export main types for JS access
pub use worker::Worker;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
