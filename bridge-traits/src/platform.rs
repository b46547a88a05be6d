//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Engine callbacks on Android and iOS are delivered on threads owned by the
//! platform media framework, so every capability handed to the core must be
//! shareable across threads. The marker below keeps that requirement in one
//! place.

/// Marker trait for capabilities that may be shared across threads.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync {}
