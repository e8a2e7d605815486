#![forbid(unsafe_code)]

//! `framesync-core` keeps an embedding page informed of an embedded
//! document's rendered height.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) forwards resize,
//!   mutation, transition-end and toggle events, and wakes the engine at
//!   its next deadline.
//! - **Deterministic time**: every entry point takes the host's monotonic
//!   timestamp; nothing reads a wall clock.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! Pipeline: a trigger fires → [`HeightReader`] measures →
//! [`HeightChangeFilter`] drops unchanged heights → [`ParentNotifier`] posts
//! `{type: "height-change", height}` to the parent window.
//!
//! The browser binding lives in `framesync-web`; this crate only sees the
//! [`HeightSource`], [`EmbeddingContext`] and [`Presentation`] traits.

pub mod config;
pub mod error;
pub mod filter;
pub mod message;
pub mod notifier;
pub mod reader;
pub mod signals;
pub mod sync;
pub mod timers;
pub mod toggle;

pub use config::SyncConfig;
pub use error::{ElementRole, HostError, SyncError};
pub use filter::HeightChangeFilter;
pub use message::{HeightMessage, MessageKind};
pub use notifier::{Delivery, DeliveryStats, EmbeddingContext, ParentNotifier};
pub use reader::{HeightReader, HeightSource};
pub use signals::{HostCapabilities, TransitionSource, Trigger};
pub use sync::{CheckOutcome, FiredCheck, HeightSync};
pub use timers::{DeterministicClock, TimerKind, TimerQueue};
pub use toggle::{
    ExpansionState, Presentation, SettleCause, SettleGate, SettlePlan, ToggleStateMachine,
};
