//! Async runtime abstraction layer for the playback core.
//!
//! Every other crate in the workspace schedules work, sleeps and synchronizes
//! through this crate instead of naming Tokio directly. Host platforms embed
//! the core inside a Tokio runtime (desktop, Android, iOS); keeping the
//! surface in one place lets the controller stay agnostic of how the host
//! builds that runtime.
//!
//! # Modules
//!
//! - `task`: task spawning
//! - `time`: sleeps, intervals and the status ticker
//! - `sync`: channels and cancellation
//! - `runtime`: runtime handles and `block_on`
//!
//! `select!` is re-exported for racing a command against cancellation.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use tokio::select;
