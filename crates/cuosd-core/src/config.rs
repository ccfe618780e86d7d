//! Runtime tunables. THE CORE has no on-disk configuration; this is the one
//! knob the original exposes (how the "massively parallel" execution is
//! scheduled) translated to a host thread pool.

/// Launch-time configuration. `Config::default()` reproduces the
/// unconditional original behavior: always parallel, on the global rayon
/// pool.
pub struct Config<'a> {
    /// Quad grids smaller than this many quads run single-threaded; below
    /// this size the synchronization overhead of `rayon`'s work-stealing
    /// split outweighs the benefit.
    pub parallel_threshold: usize,
    /// Use this pool instead of the global one, e.g. to avoid contending
    /// with a host application's own rayon usage.
    pub thread_pool: Option<&'a rayon::ThreadPool>,
}

impl<'a> Default for Config<'a> {
    fn default() -> Self {
        Self { parallel_threshold: 64, thread_pool: None }
    }
}
