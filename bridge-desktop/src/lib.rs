//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop platforms
//! (macOS, Windows, Linux), CI and integration tests:
//!
//! - [`TokioResourceResolver`]: packaged resources and assets laid out as
//!   plain directories, existence checks via `tokio::fs`
//! - [`HeadlessEngine`]: a clock-driven `MediaEngine` that probes real
//!   durations with symphonia but produces no audio
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HeadlessEngineFactory, TokioResourceResolver};
//! use core_runtime::config::PlayerConfig;
//! use std::sync::Arc;
//!
//! let config = PlayerConfig::builder()
//!     .engine_factory(Arc::new(HeadlessEngineFactory::new()))
//!     .resource_resolver(Arc::new(TokioResourceResolver::with_root("./res")))
//!     .build()?;
//! ```

mod engine;
mod resources;

pub use engine::{
    HeadlessEngine, HeadlessEngineFactory, MEDIA_ERROR_IO, MEDIA_ERROR_MALFORMED,
    MEDIA_ERROR_UNKNOWN, MEDIA_ERROR_UNSUPPORTED,
};
pub use resources::TokioResourceResolver;
