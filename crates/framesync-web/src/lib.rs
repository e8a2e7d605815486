#![forbid(unsafe_code)]

//! Browser binding for the frame height sync engine.
//!
//! This crate provides [`FrameSync`] (on `wasm32` only), a `wasm-bindgen`
//! export that wires `framesync_core::HeightSync` to the live DOM:
//!
//! - window `resize` → immediate check
//! - `MutationObserver` on the content container → debounced check
//! - `click` on the toggle control → expand/collapse
//! - `transitionend` on the content container → collapse settled
//! - one `setTimeout`, re-armed after every engine call, wakes the engine at
//!   its next deadline (startup, debounce, settle, poll)
//!
//! Dropping (or `free()`-ing) a `FrameSync` removes every listener, the
//! observer and the pending timeout.
//!
//! The timing helpers in [`schedule`] are target independent so they can be
//! tested natively.

pub mod schedule;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{FrameSync, auto_start};

pub use schedule::{load_config, wake_delay_ms};
