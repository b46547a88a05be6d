//! Task spawning.
//!
//! `spawn` requires a running runtime on the calling thread. Code that may be
//! invoked from foreign threads (engine callbacks) should go through a channel
//! instead of spawning directly.

pub use tokio::task::JoinHandle;

/// Spawns a new asynchronous task on the current runtime.
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}
