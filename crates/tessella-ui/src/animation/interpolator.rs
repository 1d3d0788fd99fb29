use std::f64::consts::PI;
use std::fmt;

/// Error produced by the validating [`Interpolator`] constructors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InterpolatorError {
    InvalidParameter { name: &'static str, value: f64 },
}

impl fmt::Display for InterpolatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let InterpolatorError::InvalidParameter { name, value } = self;
        write!(f, "invalid interpolator parameter {name} = {value}")
    }
}

impl std::error::Error for InterpolatorError {}

/// Easing curve applied to an animator's raw progress.
///
/// Curves mapping 0 to 0 and 1 to 1 may still leave the unit range in
/// between (anticipate, overshoot, bounce near the end); value producers
/// must accept progress outside `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interpolator {
    Linear,
    Accelerate { factor: f64 },
    Decelerate { factor: f64 },
    AccelerateDecelerate,
    Anticipate { tension: f64 },
    Overshoot { tension: f64 },
    AnticipateOvershoot { tension: f64 },
    Bounce,
    Cycle { cycles: f64 },
}

impl Default for Interpolator {
    fn default() -> Self {
        Interpolator::Linear
    }
}

impl Interpolator {
    pub fn accelerate(factor: f64) -> Result<Self, InterpolatorError> {
        check_parameter("factor", factor)?;
        Ok(Interpolator::Accelerate { factor })
    }

    pub fn decelerate(factor: f64) -> Result<Self, InterpolatorError> {
        check_parameter("factor", factor)?;
        Ok(Interpolator::Decelerate { factor })
    }

    pub fn anticipate(tension: f64) -> Result<Self, InterpolatorError> {
        check_parameter("tension", tension)?;
        Ok(Interpolator::Anticipate { tension })
    }

    pub fn overshoot(tension: f64) -> Result<Self, InterpolatorError> {
        check_parameter("tension", tension)?;
        Ok(Interpolator::Overshoot { tension })
    }

    /// The stored tension is the product of the two parameters, so the
    /// anticipation and overshoot halves share one effective tension.
    pub fn anticipate_overshoot(
        tension: f64,
        extra_tension: f64,
    ) -> Result<Self, InterpolatorError> {
        check_parameter("tension", tension)?;
        check_parameter("extra_tension", extra_tension)?;
        Ok(Interpolator::AnticipateOvershoot {
            tension: tension * extra_tension,
        })
    }

    pub fn cycle(cycles: f64) -> Result<Self, InterpolatorError> {
        if !cycles.is_finite() || cycles < 1.0 {
            return Err(InterpolatorError::InvalidParameter {
                name: "cycles",
                value: cycles,
            });
        }
        Ok(Interpolator::Cycle { cycles })
    }

    /// Maps raw progress in `0..=1` through the curve.
    pub fn interpolate(&self, progress: f64) -> f64 {
        match *self {
            Interpolator::Linear => progress,
            Interpolator::Accelerate { factor } => {
                if factor == 1.0 {
                    progress * progress
                } else {
                    progress.powf(2.0 * factor)
                }
            }
            Interpolator::Decelerate { factor } => {
                if factor == 1.0 {
                    1.0 - (1.0 - progress) * (1.0 - progress)
                } else {
                    1.0 - (1.0 - progress).powf(2.0 * factor)
                }
            }
            Interpolator::AccelerateDecelerate => ((progress + 1.0) * PI).cos() / 2.0 + 0.5,
            Interpolator::Anticipate { tension } => anticipate_curve(progress, tension),
            Interpolator::Overshoot { tension } => {
                overshoot_curve(progress - 1.0, tension) + 1.0
            }
            Interpolator::AnticipateOvershoot { tension } => {
                if progress < 0.5 {
                    0.5 * anticipate_curve(progress * 2.0, tension)
                } else {
                    0.5 * (overshoot_curve(progress * 2.0 - 2.0, tension) + 2.0)
                }
            }
            Interpolator::Bounce => {
                let progress = progress * 1.1226;
                if progress < 0.3535 {
                    bounce_segment(progress)
                } else if progress < 0.7408 {
                    bounce_segment(progress - 0.54719) + 0.7
                } else if progress < 0.9644 {
                    bounce_segment(progress - 0.8526) + 0.9
                } else {
                    bounce_segment(progress - 1.0435) + 0.95
                }
            }
            Interpolator::Cycle { cycles } => (2.0 * PI * cycles * progress).sin(),
        }
    }
}

fn check_parameter(name: &'static str, value: f64) -> Result<(), InterpolatorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InterpolatorError::InvalidParameter { name, value })
    }
}

fn anticipate_curve(t: f64, tension: f64) -> f64 {
    t * t * ((tension + 1.0) * t - tension)
}

fn overshoot_curve(t: f64, tension: f64) -> f64 {
    t * t * ((tension + 1.0) * t + tension)
}

fn bounce_segment(t: f64) -> f64 {
    t * t * 8.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn linear_is_identity() {
        assert_eq!(Interpolator::Linear.interpolate(0.25), 0.25);
    }

    #[test]
    fn accelerate_squares_at_default_factor() {
        let curve = Interpolator::accelerate(1.0).unwrap();
        assert_close(curve.interpolate(0.5), 0.25);
        let steep = Interpolator::accelerate(2.0).unwrap();
        assert_close(steep.interpolate(0.5), 0.0625);
    }

    #[test]
    fn decelerate_mirrors_accelerate() {
        let curve = Interpolator::decelerate(1.0).unwrap();
        assert_close(curve.interpolate(0.5), 0.75);
        assert_close(curve.interpolate(0.0), 0.0);
        assert_close(curve.interpolate(1.0), 1.0);
    }

    #[test]
    fn accelerate_decelerate_is_symmetric() {
        let curve = Interpolator::AccelerateDecelerate;
        assert_close(curve.interpolate(0.0), 0.0);
        assert_close(curve.interpolate(0.5), 0.5);
        assert_close(curve.interpolate(1.0), 1.0);
    }

    #[test]
    fn anticipate_dips_below_zero() {
        let curve = Interpolator::anticipate(2.0).unwrap();
        assert_close(curve.interpolate(0.0), 0.0);
        assert_close(curve.interpolate(1.0), 1.0);
        assert!(curve.interpolate(0.3) < 0.0);
    }

    #[test]
    fn overshoot_exceeds_one() {
        let curve = Interpolator::overshoot(2.0).unwrap();
        assert_close(curve.interpolate(0.0), 0.0);
        assert_close(curve.interpolate(1.0), 1.0);
        assert!(curve.interpolate(0.7) > 1.0);
    }

    #[test]
    fn anticipate_overshoot_multiplies_tensions() {
        let combined = Interpolator::anticipate_overshoot(2.0, 1.5).unwrap();
        assert_eq!(
            combined,
            Interpolator::AnticipateOvershoot { tension: 3.0 }
        );
        assert_close(combined.interpolate(0.0), 0.0);
        assert_close(combined.interpolate(0.5), 0.5);
        assert_close(combined.interpolate(1.0), 1.0);
    }

    #[test]
    fn bounce_lands_near_one() {
        let curve = Interpolator::Bounce;
        assert!((curve.interpolate(1.0) - 1.0).abs() < 0.01);
        assert_close(curve.interpolate(0.0), 0.0);
    }

    #[test]
    fn cycle_oscillates() {
        let curve = Interpolator::cycle(1.0).unwrap();
        assert_close(curve.interpolate(0.25), 1.0);
        assert_close(curve.interpolate(0.5), 0.0);
        assert_close(curve.interpolate(0.75), -1.0);
    }

    #[test]
    fn constructors_reject_bad_parameters() {
        assert!(Interpolator::accelerate(-1.0).is_err());
        assert!(Interpolator::overshoot(f64::NAN).is_err());
        assert!(Interpolator::cycle(0.5).is_err());
        assert!(Interpolator::cycle(f64::INFINITY).is_err());
    }
}
