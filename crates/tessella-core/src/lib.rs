//! Frame scheduling runtime and event primitives for Tessella.
//!
//! Everything in the toolkit that happens "next frame" — coalesced redraws,
//! animation ticks — goes through the [`Runtime`] frame-callback registry.
//! The runtime itself never spins a loop; a host drives it through a
//! [`RuntimeScheduler`] implementation and calls
//! [`RuntimeHandle::drain_frame_callbacks`] once per display refresh.

mod events;
mod platform;
mod runtime;

pub use events::{handler, EventHandlerList, Handler};
pub use platform::{Clock, RuntimeScheduler};
pub use runtime::{FrameTicket, Runtime, RuntimeHandle};

/// Identifier of a registered one-shot frame callback.
pub type FrameCallbackId = u64;
