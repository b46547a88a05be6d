//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playback core:
//! - Logging and tracing setup with host log forwarding
//! - Player configuration with fail-fast capability checks
//! - A typed broadcast event bus
//!
//! ## Overview
//!
//! Nothing in this crate knows about playback semantics. The controller in
//! `core-playback` builds on these pieces: it reads its tunables from
//! [`config::PlaybackSettings`], receives its capabilities through
//! [`config::PlayerConfig`] and publishes its events on an
//! [`events::EventBus`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
