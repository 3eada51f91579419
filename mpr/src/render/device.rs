use super::ThreadCount;
use crate::Error;

/// Explicit execution context for a [`Renderable`](super::Renderable)
///
/// The device owns its worker pool, so every parallel dispatch made by the
/// evaluator stages runs inside this pool rather than on hidden process-wide
/// state.  Dropping the device joins its workers.
pub struct Device {
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl Device {
    /// Builds a new device with the given number of worker threads
    pub fn new(threads: ThreadCount) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|i| format!("mpr-worker-{i}"))
            .build()?;
        log::debug!("built device with {} worker threads", threads.get());
        Ok(Self { pool })
    }

    /// Runs a function inside the device's worker pool
    ///
    /// Parallel iterators used within `f` are dispatched to this pool.
    pub fn run<F: FnOnce() -> V + Send, V: Send>(&self, f: F) -> V {
        self.pool.install(f)
    }

    /// Returns the number of threads in the pool
    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}
