//! Synchronization primitives.
//!
//! Async channels from Tokio, plus the cancellation token used
//! to tear down long-lived status streams when a controller is destroyed.

pub use tokio::sync::{broadcast, mpsc};

pub use tokio_util::sync::CancellationToken;
