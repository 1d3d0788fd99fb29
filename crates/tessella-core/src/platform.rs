//! Platform abstraction traits for the Tessella runtime.
//!
//! These traits let the toolkit delegate frame scheduling and timing to the
//! host environment, so the same core runs against a real display loop or a
//! deterministic test driver.

/// Schedules frame processing on behalf of the runtime.
///
/// Implementations are responsible for waking whatever loop drives
/// [`crate::RuntimeHandle::drain_frame_callbacks`]. They must be safe to use
/// from multiple threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host process a new frame.
    fn schedule_frame(&self);
}

/// Provides timing information for the runtime.
pub trait Clock: Send + Sync {
    /// Instant type produced by this clock implementation.
    type Instant: Copy + Send + Sync;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the number of milliseconds elapsed since `since`.
    fn elapsed_millis(&self, since: Self::Instant) -> u64;
}
