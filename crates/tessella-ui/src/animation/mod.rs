mod animator;
mod interpolator;

pub use animator::{
    AnimationState, Animator, AnimatorError, NumberAnimator, NumberProducer, TimeAnimator,
    TimeProducer, ValueProducer,
};
pub use interpolator::{Interpolator, InterpolatorError};
