use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tessella_core::{FrameTicket, RuntimeHandle};

use crate::animation::Interpolator;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Error produced by animator configuration and transport operations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimatorError {
    /// The requested transition is not legal from the current state, for
    /// example `resume` while stopped.
    InvalidTransition {
        from: AnimationState,
        operation: &'static str,
    },
    /// Configuration is frozen while the animator is running or paused.
    NotStopped,
    /// A numeric parameter was out of range.
    InvalidValue { name: &'static str, value: f64 },
}

impl fmt::Display for AnimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimatorError::InvalidTransition { from, operation } => {
                write!(f, "cannot {operation} a {from:?} animator")
            }
            AnimatorError::NotStopped => {
                write!(f, "animator must be stopped before reconfiguration")
            }
            AnimatorError::InvalidValue { name, value } => {
                write!(f, "invalid animator parameter {name} = {value}")
            }
        }
    }
}

impl std::error::Error for AnimatorError {}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AnimationState {
    Stopped,
    Running,
    Paused,
}

/// Maps eased progress to the value handed to the animator callback.
///
/// Progress may leave `0..=1` for anticipating or overshooting
/// interpolators; producers must extrapolate rather than clamp.
pub trait ValueProducer {
    type Output;

    fn value(&self, progress: f64, duration_ms: f64) -> Self::Output;
}

/// Linear interpolation between two numbers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberProducer {
    pub(crate) from: f64,
    pub(crate) to: f64,
}

impl Default for NumberProducer {
    fn default() -> Self {
        Self { from: 0.0, to: 1.0 }
    }
}

impl ValueProducer for NumberProducer {
    type Output = f64;

    fn value(&self, progress: f64, _duration_ms: f64) -> f64 {
        self.from + (self.to - self.from) * progress
    }
}

/// Reports eased elapsed time in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeProducer;

impl ValueProducer for TimeProducer {
    type Output = f64;

    fn value(&self, progress: f64, duration_ms: f64) -> f64 {
        duration_ms * progress
    }
}

pub type NumberAnimator = Animator<NumberProducer>;
pub type TimeAnimator = Animator<TimeProducer>;

enum FrameOutcome {
    Continue,
    NextIteration,
    Finish,
}

struct AnimatorInner<P: ValueProducer> {
    runtime: RuntimeHandle,
    producer: P,
    callback: Option<Box<dyn FnMut(P::Output)>>,
    end_callback: Option<Box<dyn FnMut()>>,
    duration_ms: f64,
    delay_ms: f64,
    iterations: f64,
    interpolator: Interpolator,
    state: AnimationState,
    current_iteration: u64,
    start_time_nanos: Option<u64>,
    last_frame_nanos: Option<u64>,
    /// Elapsed time to credit to the next frame, set by pause so resume
    /// continues from the recorded progress.
    pending_offset_ms: f64,
    ticket: Option<FrameTicket>,
}

/// Frame-callback driven animation of a produced value.
///
/// Each frame the animator computes raw progress as elapsed time over
/// duration (clamped to 1), eases it through the interpolator, feeds it to
/// the producer and invokes the callback. The final frame of every
/// iteration always delivers raw progress exactly 1, so the callback is
/// guaranteed to observe the end value. Configuration setters fail unless
/// the animator is stopped.
pub struct Animator<P: ValueProducer + 'static> {
    inner: Rc<RefCell<AnimatorInner<P>>>,
}

impl<P: ValueProducer + 'static> Clone for Animator<P> {
    fn clone(&self) -> Self {
        Animator {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: ValueProducer + 'static> Animator<P> {
    pub fn new(
        runtime: RuntimeHandle,
        producer: P,
        callback: impl FnMut(P::Output) + 'static,
    ) -> Self {
        Animator {
            inner: Rc::new(RefCell::new(AnimatorInner {
                runtime,
                producer,
                callback: Some(Box::new(callback)),
                end_callback: None,
                duration_ms: 0.0,
                delay_ms: 0.0,
                iterations: 1.0,
                interpolator: Interpolator::Linear,
                state: AnimationState::Stopped,
                current_iteration: 0,
                start_time_nanos: None,
                last_frame_nanos: None,
                pending_offset_ms: 0.0,
                ticket: None,
            })),
        }
    }

    pub fn state(&self) -> AnimationState {
        self.inner.borrow().state
    }

    pub fn duration(&self) -> f64 {
        self.inner.borrow().duration_ms
    }

    pub fn set_duration(&self, duration_ms: f64) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(AnimatorError::InvalidValue {
                name: "duration_ms",
                value: duration_ms,
            });
        }
        inner.duration_ms = duration_ms;
        Ok(())
    }

    pub fn delay(&self) -> f64 {
        self.inner.borrow().delay_ms
    }

    /// Stored for hosts that schedule the start themselves; ticking starts
    /// with the first frame after [`start`](Self::start) regardless.
    pub fn set_delay(&self, delay_ms: f64) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        if !delay_ms.is_finite() || delay_ms < 0.0 {
            return Err(AnimatorError::InvalidValue {
                name: "delay_ms",
                value: delay_ms,
            });
        }
        inner.delay_ms = delay_ms;
        Ok(())
    }

    pub fn iterations(&self) -> f64 {
        self.inner.borrow().iterations
    }

    /// At least 1; `f64::INFINITY` repeats forever.
    pub fn set_iterations(&self, iterations: f64) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        if !(iterations >= 1.0) {
            return Err(AnimatorError::InvalidValue {
                name: "iterations",
                value: iterations,
            });
        }
        inner.iterations = iterations;
        Ok(())
    }

    pub fn interpolator(&self) -> Interpolator {
        self.inner.borrow().interpolator
    }

    pub fn set_interpolator(&self, interpolator: Interpolator) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        inner.interpolator = interpolator;
        Ok(())
    }

    pub fn set_callback(
        &self,
        callback: impl FnMut(P::Output) + 'static,
    ) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        inner.callback = Some(Box::new(callback));
        Ok(())
    }

    /// Invoked once per [`start`](Self::start) after the final iteration
    /// completes. Not invoked on [`stop`](Self::stop).
    pub fn set_end_callback(&self, callback: impl FnMut() + 'static) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        inner.end_callback = Some(Box::new(callback));
        Ok(())
    }

    pub fn clear_end_callback(&self) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        inner.end_callback = None;
        Ok(())
    }

    pub fn start(&self) -> Result<(), AnimatorError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != AnimationState::Stopped {
                return Err(AnimatorError::InvalidTransition {
                    from: inner.state,
                    operation: "start",
                });
            }
            inner.state = AnimationState::Running;
            inner.current_iteration = 1;
            inner.start_time_nanos = None;
            inner.last_frame_nanos = None;
            inner.pending_offset_ms = 0.0;
        }
        Self::schedule(&self.inner);
        Ok(())
    }

    /// Freezes the animation at its current progress.
    pub fn pause(&self) -> Result<(), AnimatorError> {
        let mut inner = self.inner.borrow_mut();
        if inner.state != AnimationState::Running {
            return Err(AnimatorError::InvalidTransition {
                from: inner.state,
                operation: "pause",
            });
        }
        if let Some(ticket) = inner.ticket.take() {
            ticket.cancel();
        }
        let fraction = if inner.duration_ms <= 0.0 {
            0.0
        } else {
            match (inner.start_time_nanos, inner.last_frame_nanos) {
                (Some(start), Some(last)) => {
                    let elapsed_ms = last.saturating_sub(start) as f64 / NANOS_PER_MILLI;
                    (elapsed_ms / inner.duration_ms).min(1.0)
                }
                // Paused before the first frame: keep any offset carried
                // over from a previous pause.
                _ => (inner.pending_offset_ms / inner.duration_ms).min(1.0),
            }
        };
        inner.pending_offset_ms = fraction * inner.duration_ms;
        inner.start_time_nanos = None;
        inner.last_frame_nanos = None;
        inner.state = AnimationState::Paused;
        Ok(())
    }

    pub fn resume(&self) -> Result<(), AnimatorError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != AnimationState::Paused {
                return Err(AnimatorError::InvalidTransition {
                    from: inner.state,
                    operation: "resume",
                });
            }
            inner.state = AnimationState::Running;
        }
        Self::schedule(&self.inner);
        Ok(())
    }

    /// Stops immediately from any state without firing the end callback.
    pub fn stop(&self) {
        let ticket = {
            let mut inner = self.inner.borrow_mut();
            inner.state = AnimationState::Stopped;
            inner.ticket.take()
        };
        if let Some(ticket) = ticket {
            ticket.cancel();
        }
    }

    fn ensure_stopped(&self) -> Result<std::cell::RefMut<'_, AnimatorInner<P>>, AnimatorError> {
        let inner = self.inner.borrow_mut();
        if inner.state == AnimationState::Stopped {
            Ok(inner)
        } else {
            Err(AnimatorError::NotStopped)
        }
    }

    fn schedule(inner: &Rc<RefCell<AnimatorInner<P>>>) {
        let runtime = {
            let state = inner.borrow();
            if state.ticket.is_some() {
                return;
            }
            state.runtime.clone()
        };
        let weak = Rc::downgrade(inner);
        let ticket = runtime.on_next_frame(move |frame_nanos| {
            if let Some(inner) = weak.upgrade() {
                Self::on_frame(&inner, frame_nanos);
            }
        });
        inner.borrow_mut().ticket = Some(ticket);
    }

    fn on_frame(inner: &Rc<RefCell<AnimatorInner<P>>>, frame_nanos: u64) {
        let value;
        let outcome;
        let mut callback;
        {
            let mut state = inner.borrow_mut();
            state.ticket = None;
            if state.state != AnimationState::Running {
                return;
            }
            let offset_nanos = (state.pending_offset_ms * NANOS_PER_MILLI) as u64;
            let start = match state.start_time_nanos {
                Some(start) => start,
                None => {
                    let start = frame_nanos.saturating_sub(offset_nanos);
                    state.start_time_nanos = Some(start);
                    start
                }
            };
            state.pending_offset_ms = 0.0;
            state.last_frame_nanos = Some(frame_nanos);

            let elapsed_ms = frame_nanos.saturating_sub(start) as f64 / NANOS_PER_MILLI;
            let raw = if state.duration_ms <= 0.0 {
                1.0
            } else {
                (elapsed_ms / state.duration_ms).min(1.0)
            };
            let eased = state.interpolator.interpolate(raw);
            value = state.producer.value(eased, state.duration_ms);

            outcome = if raw < 1.0 {
                FrameOutcome::Continue
            } else if (state.current_iteration as f64) < state.iterations.floor() {
                FrameOutcome::NextIteration
            } else {
                FrameOutcome::Finish
            };
            // Taken out of the cell so the callback can reconfigure or
            // replace itself without tripping the RefCell.
            callback = state.callback.take();
        }

        if let Some(callback) = callback.as_mut() {
            callback(value);
        }
        if let Some(callback) = callback {
            let mut state = inner.borrow_mut();
            if state.callback.is_none() {
                state.callback = Some(callback);
            }
        }

        match outcome {
            FrameOutcome::Continue => {
                if inner.borrow().state == AnimationState::Running {
                    Self::schedule(inner);
                }
            }
            FrameOutcome::NextIteration => {
                let still_running = {
                    let mut state = inner.borrow_mut();
                    if state.state == AnimationState::Running {
                        state.current_iteration += 1;
                        state.start_time_nanos = Some(frame_nanos);
                        true
                    } else {
                        false
                    }
                };
                if still_running {
                    Self::schedule(inner);
                }
            }
            FrameOutcome::Finish => {
                let mut end_callback = {
                    let mut state = inner.borrow_mut();
                    if state.state != AnimationState::Running {
                        return;
                    }
                    state.state = AnimationState::Stopped;
                    state.end_callback.take()
                };
                if let Some(callback) = end_callback.as_mut() {
                    callback();
                }
                if let Some(callback) = end_callback {
                    let mut state = inner.borrow_mut();
                    if state.end_callback.is_none() {
                        state.end_callback = Some(callback);
                    }
                }
            }
        }
    }
}

impl Animator<NumberProducer> {
    /// Animates a number between [`from`](Self::from) and [`to`](Self::to),
    /// 0 to 1 by default.
    pub fn number(runtime: RuntimeHandle, callback: impl FnMut(f64) + 'static) -> Self {
        Animator::new(runtime, NumberProducer::default(), callback)
    }

    pub fn from(&self) -> f64 {
        self.inner.borrow().producer.from
    }

    pub fn set_from(&self, from: f64) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        if !from.is_finite() {
            return Err(AnimatorError::InvalidValue {
                name: "from",
                value: from,
            });
        }
        inner.producer.from = from;
        Ok(())
    }

    pub fn to(&self) -> f64 {
        self.inner.borrow().producer.to
    }

    pub fn set_to(&self, to: f64) -> Result<(), AnimatorError> {
        let mut inner = self.ensure_stopped()?;
        if !to.is_finite() {
            return Err(AnimatorError::InvalidValue { name: "to", value: to });
        }
        inner.producer.to = to;
        Ok(())
    }
}

impl Animator<TimeProducer> {
    /// Reports eased elapsed milliseconds instead of an interpolated value.
    pub fn time(runtime: RuntimeHandle, callback: impl FnMut(f64) + 'static) -> Self {
        Animator::new(runtime, TimeProducer, callback)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Arc;

    use tessella_core::{Runtime, RuntimeScheduler};

    use super::*;

    struct NoopScheduler;

    impl RuntimeScheduler for NoopScheduler {
        fn schedule_frame(&self) {}
    }

    fn runtime() -> Runtime {
        Runtime::new(Arc::new(NoopScheduler))
    }

    const MS: u64 = 1_000_000;

    #[test]
    fn zero_duration_completes_on_the_first_frame() {
        let runtime = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let animator = Animator::number(runtime.handle(), move |value| {
            sink.borrow_mut().push(value);
        });
        let ended = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ended);
        animator.set_end_callback(move || flag.set(true)).unwrap();

        animator.start().unwrap();
        assert_eq!(animator.state(), AnimationState::Running);
        runtime.handle().drain_frame_callbacks(5 * MS);

        assert_eq!(*seen.borrow(), vec![1.0]);
        assert!(ended.get());
        assert_eq!(animator.state(), AnimationState::Stopped);
        assert!(!runtime.handle().has_frame_callbacks());
    }

    #[test]
    fn progress_tracks_elapsed_time_and_clamps_at_one() {
        let runtime = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let animator = Animator::number(runtime.handle(), move |value| {
            sink.borrow_mut().push(value);
        });
        animator.set_duration(100.0).unwrap();
        animator.set_from(10.0).unwrap();
        animator.set_to(20.0).unwrap();

        animator.start().unwrap();
        let handle = runtime.handle();
        handle.drain_frame_callbacks(0);
        handle.drain_frame_callbacks(50 * MS);
        handle.drain_frame_callbacks(250 * MS);

        assert_eq!(*seen.borrow(), vec![10.0, 15.0, 20.0]);
        assert_eq!(animator.state(), AnimationState::Stopped);
    }

    #[test]
    fn iterations_restart_from_the_completion_frame() {
        let runtime = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let animator = Animator::number(runtime.handle(), move |value| {
            sink.borrow_mut().push(value);
        });
        animator.set_duration(100.0).unwrap();
        animator.set_iterations(2.0).unwrap();

        animator.start().unwrap();
        let handle = runtime.handle();
        handle.drain_frame_callbacks(0);
        handle.drain_frame_callbacks(100 * MS);
        // First iteration ends with exactly 1.0, second starts at 0.
        handle.drain_frame_callbacks(150 * MS);
        handle.drain_frame_callbacks(200 * MS);

        assert_eq!(*seen.borrow(), vec![0.0, 1.0, 0.5, 1.0]);
        assert_eq!(animator.state(), AnimationState::Stopped);
    }

    #[test]
    fn pause_records_progress_and_resume_continues() {
        let runtime = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let animator = Animator::number(runtime.handle(), move |value| {
            sink.borrow_mut().push(value);
        });
        animator.set_duration(100.0).unwrap();

        animator.start().unwrap();
        let handle = runtime.handle();
        handle.drain_frame_callbacks(0);
        handle.drain_frame_callbacks(40 * MS);
        animator.pause().unwrap();
        assert_eq!(animator.state(), AnimationState::Paused);
        assert!(!handle.has_frame_callbacks());

        // Wall time passes while paused and must not count.
        animator.resume().unwrap();
        handle.drain_frame_callbacks(500 * MS);
        handle.drain_frame_callbacks(530 * MS);

        assert_eq!(*seen.borrow(), vec![0.0, 0.4, 0.4, 0.7]);
    }

    #[test]
    fn stop_cancels_the_pending_frame_without_end_callback() {
        let runtime = runtime();
        let ticks = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&ticks);
        let animator = Animator::number(runtime.handle(), move |_| {
            count.set(count.get() + 1);
        });
        animator.set_duration(100.0).unwrap();
        let ended = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ended);
        animator.set_end_callback(move || flag.set(true)).unwrap();

        animator.start().unwrap();
        animator.stop();
        runtime.handle().drain_frame_callbacks(0);

        assert_eq!(ticks.get(), 0);
        assert!(!ended.get());
        assert_eq!(animator.state(), AnimationState::Stopped);
    }

    #[test]
    fn configuration_is_frozen_while_running() {
        let runtime = runtime();
        let animator = Animator::number(runtime.handle(), |_| {});
        animator.set_duration(100.0).unwrap();
        animator.start().unwrap();

        assert_eq!(animator.set_duration(50.0), Err(AnimatorError::NotStopped));
        assert_eq!(animator.duration(), 100.0);
        assert_eq!(animator.set_from(2.0), Err(AnimatorError::NotStopped));
        assert_eq!(
            animator.set_iterations(2.0),
            Err(AnimatorError::NotStopped)
        );
        assert!(matches!(
            animator.start(),
            Err(AnimatorError::InvalidTransition { .. })
        ));

        animator.pause().unwrap();
        assert_eq!(animator.set_duration(50.0), Err(AnimatorError::NotStopped));
        animator.stop();
        assert!(animator.set_duration(50.0).is_ok());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let runtime = runtime();
        let animator = Animator::number(runtime.handle(), |_| {});
        assert!(matches!(
            animator.set_duration(-1.0),
            Err(AnimatorError::InvalidValue { .. })
        ));
        assert!(matches!(
            animator.set_iterations(0.5),
            Err(AnimatorError::InvalidValue { .. })
        ));
        assert!(matches!(
            animator.set_iterations(f64::NAN),
            Err(AnimatorError::InvalidValue { .. })
        ));
        // Infinite iterations repeat forever and are legal.
        assert!(animator.set_iterations(f64::INFINITY).is_ok());
        assert!(matches!(
            animator.set_from(f64::NAN),
            Err(AnimatorError::InvalidValue { .. })
        ));
        assert!(matches!(
            animator.resume(),
            Err(AnimatorError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn time_producer_reports_eased_milliseconds() {
        let runtime = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let animator = Animator::time(runtime.handle(), move |value| {
            sink.borrow_mut().push(value);
        });
        animator.set_duration(200.0).unwrap();

        animator.start().unwrap();
        let handle = runtime.handle();
        handle.drain_frame_callbacks(100 * MS);
        handle.drain_frame_callbacks(300 * MS);

        assert_eq!(*seen.borrow(), vec![0.0, 200.0]);
    }

    #[test]
    fn callback_may_stop_its_own_animator() {
        let runtime = runtime();
        let animator_cell: Rc<RefCell<Option<NumberAnimator>>> = Rc::new(RefCell::new(None));
        let cell = Rc::clone(&animator_cell);
        let ticks = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&ticks);
        let animator = Animator::number(runtime.handle(), move |_| {
            count.set(count.get() + 1);
            if let Some(animator) = cell.borrow().as_ref() {
                animator.stop();
            }
        });
        *animator_cell.borrow_mut() = Some(animator.clone());
        animator.set_duration(100.0).unwrap();

        animator.start().unwrap();
        let handle = runtime.handle();
        handle.drain_frame_callbacks(10 * MS);
        handle.drain_frame_callbacks(20 * MS);

        assert_eq!(ticks.get(), 1);
        assert_eq!(animator.state(), AnimationState::Stopped);
        assert!(!handle.has_frame_callbacks());
    }
}
