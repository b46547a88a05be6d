//! Runtime utilities that wrap the underlying executor.
//!
//! Engine callbacks arrive on platform threads that are not part of the
//! runtime; [`current_handle`] lets bridge code discover whether it can spawn
//! onto an existing runtime before falling back to a plain thread.

pub use tokio::runtime::{Builder, Handle};

/// Returns a handle to the runtime driving the current thread, if any.
pub fn current_handle() -> Option<Handle> {
    Handle::try_current().ok()
}

/// Runs the provided future to completion on a lightweight current-thread runtime.
///
/// Fails only if the runtime itself cannot be built.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
