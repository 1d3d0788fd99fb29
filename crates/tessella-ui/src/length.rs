use std::fmt;
use std::rc::Rc;

/// Error produced while parsing or resolving a [`Length`].
#[derive(Clone, Debug, PartialEq)]
pub enum LengthError {
    /// A numeric input was NaN or infinite.
    NotFinite(f64),
    /// A string input matched none of the accepted forms.
    Unparseable(String),
    /// The reference value of a percentage length resolved to a non-finite
    /// number, usually because the owning widget is detached.
    RelativeNotFinite,
    /// A computed length returned a non-finite number.
    ComputedNotFinite,
    /// A value that must be non-negative was negative.
    Negative(f64),
}

impl fmt::Display for LengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthError::NotFinite(value) => write!(f, "length value {value} is not finite"),
            LengthError::Unparseable(input) => write!(f, "cannot parse {input:?} as a length"),
            LengthError::RelativeNotFinite => {
                write!(f, "percentage length has no finite reference value")
            }
            LengthError::ComputedNotFinite => {
                write!(f, "computed length produced a non-finite value")
            }
            LengthError::Negative(value) => write!(f, "length value {value} is negative"),
        }
    }
}

impl std::error::Error for LengthError {}

/// A number a [`Length`] resolves against, either captured once or read
/// through a closure every time the length is evaluated.
#[derive(Clone)]
pub enum ValueSource {
    Fixed(f64),
    Live(Rc<dyn Fn() -> f64>),
}

impl ValueSource {
    pub fn fixed(value: f64) -> Self {
        ValueSource::Fixed(value)
    }

    pub fn live(read: impl Fn() -> f64 + 'static) -> Self {
        ValueSource::Live(Rc::new(read))
    }

    pub fn get(&self) -> f64 {
        match self {
            ValueSource::Fixed(value) => *value,
            ValueSource::Live(read) => read(),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            ValueSource::Live(_) => f.write_str("Live(..)"),
        }
    }
}

/// Accepted inputs for [`Length::parse`] and the widget size setters.
#[derive(Clone, Debug)]
pub enum LengthInput {
    Number(f64),
    Text(String),
    Length(Length),
}

impl From<f64> for LengthInput {
    fn from(value: f64) -> Self {
        LengthInput::Number(value)
    }
}

impl From<i32> for LengthInput {
    fn from(value: i32) -> Self {
        LengthInput::Number(f64::from(value))
    }
}

impl From<&str> for LengthInput {
    fn from(value: &str) -> Self {
        LengthInput::Text(value.to_owned())
    }
}

impl From<String> for LengthInput {
    fn from(value: String) -> Self {
        LengthInput::Text(value)
    }
}

impl From<Length> for LengthInput {
    fn from(value: Length) -> Self {
        LengthInput::Length(value)
    }
}

#[derive(Clone)]
enum Kind {
    Absolute(f64),
    Percentage {
        fraction: f64,
        relative_to: ValueSource,
    },
    DevicePixels {
        pixels: f64,
        scale_factor: ValueSource,
    },
    Computed(Rc<dyn Fn() -> f64>),
}

/// A one-dimensional measure in viewport units.
///
/// Percentage and device-pixel lengths capture their reference as a
/// [`ValueSource`], so a length parsed once keeps tracking a live reference
/// (such as a parent's width) on every [`value`](Length::value) call.
#[derive(Clone)]
pub struct Length {
    kind: Kind,
}

impl Length {
    pub fn zero() -> Self {
        Length {
            kind: Kind::Absolute(0.0),
        }
    }

    /// A fixed number of viewport units.
    pub fn absolute(value: f64) -> Result<Self, LengthError> {
        if !value.is_finite() {
            return Err(LengthError::NotFinite(value));
        }
        Ok(Length {
            kind: Kind::Absolute(value),
        })
    }

    /// A fraction of a reference value, re-read on every evaluation.
    pub fn percentage(fraction: f64, relative_to: ValueSource) -> Self {
        Length {
            kind: Kind::Percentage {
                fraction,
                relative_to,
            },
        }
    }

    /// A physical pixel count divided by a scale factor on evaluation.
    pub fn device_pixels(pixels: f64, scale_factor: ValueSource) -> Self {
        Length {
            kind: Kind::DevicePixels {
                pixels,
                scale_factor,
            },
        }
    }

    /// A length computed by an arbitrary closure on every evaluation.
    pub fn computed(compute: impl Fn() -> f64 + 'static) -> Self {
        Length {
            kind: Kind::Computed(Rc::new(compute)),
        }
    }

    /// Parses a length with a fixed 1.0 scale factor for `px` inputs.
    pub fn parse(
        input: impl Into<LengthInput>,
        relative_to: ValueSource,
    ) -> Result<Self, LengthError> {
        Self::parse_scaled(input, relative_to, ValueSource::fixed(1.0))
    }

    /// Parses a length from a number, an existing length or a string.
    ///
    /// Accepted string forms are a plain number (`"12.5"`), a percentage
    /// (`"50%"`) and a device-pixel count (`"24px"`). Exponent notation is
    /// rejected.
    pub fn parse_scaled(
        input: impl Into<LengthInput>,
        relative_to: ValueSource,
        scale_factor: ValueSource,
    ) -> Result<Self, LengthError> {
        match input.into() {
            LengthInput::Length(length) => Ok(length),
            LengthInput::Number(value) => Length::absolute(value),
            LengthInput::Text(text) => {
                let trimmed = text.trim();
                if let Some(value) = parse_plain_number(trimmed) {
                    return Length::absolute(value);
                }
                if let Some(rest) = trimmed.strip_suffix('%') {
                    if let Some(value) = parse_plain_number(rest) {
                        return Ok(Length::percentage(value / 100.0, relative_to));
                    }
                }
                if let Some(rest) = trimmed.strip_suffix("px") {
                    if let Some(value) = parse_plain_number(rest) {
                        return Ok(Length::device_pixels(value, scale_factor));
                    }
                }
                Err(LengthError::Unparseable(text))
            }
        }
    }

    /// Resolves the length to viewport units.
    pub fn value(&self) -> Result<f64, LengthError> {
        match &self.kind {
            Kind::Absolute(value) => Ok(*value),
            Kind::Percentage {
                fraction,
                relative_to,
            } => {
                let reference = relative_to.get();
                if reference.is_nan() {
                    return Err(LengthError::RelativeNotFinite);
                }
                let value = fraction * reference;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(LengthError::RelativeNotFinite)
                }
            }
            Kind::DevicePixels {
                pixels,
                scale_factor,
            } => {
                let scale = scale_factor.get();
                let scale = if scale.is_finite() && scale != 0.0 {
                    scale
                } else {
                    1.0
                };
                Ok(pixels / scale)
            }
            Kind::Computed(compute) => {
                let value = compute();
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(LengthError::ComputedNotFinite)
                }
            }
        }
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Absolute(value) => f.debug_tuple("Absolute").field(value).finish(),
            Kind::Percentage { fraction, .. } => {
                f.debug_struct("Percentage").field("fraction", fraction).finish()
            }
            Kind::DevicePixels { pixels, .. } => {
                f.debug_struct("DevicePixels").field("pixels", pixels).finish()
            }
            Kind::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Validates a decimal literal: optional sign, optional integer part, one
/// optional dot, at least one digit after the dot if present. No exponents.
fn parse_plain_number(text: &str) -> Option<f64> {
    let unsigned = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);
    if unsigned.is_empty() {
        return None;
    }
    let mut parts = unsigned.splitn(2, '.');
    let integer = parts.next().unwrap_or("");
    let fraction = parts.next();
    if !integer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match fraction {
        Some(digits) => {
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
        }
        None => {
            if integer.is_empty() {
                return None;
            }
        }
    }
    text.parse::<f64>().ok()
}
