use std::cell::RefCell;
use std::rc::Rc;

use tessella_core::EventHandlerList;

use crate::length::{Length, LengthError, LengthInput, ValueSource};

struct Sides {
    top: Length,
    right: Length,
    bottom: Length,
    left: Length,
}

struct PaddingInner {
    sides: RefCell<Sides>,
    on_change: EventHandlerList<()>,
}

/// Inner spacing of a widget, one [`Length`] per side.
///
/// A padding is a shared handle: clones refer to the same sides, and every
/// mutation fires `on_change` so the owning widget can invalidate.
pub struct Padding {
    inner: Rc<PaddingInner>,
}

impl Clone for Padding {
    fn clone(&self) -> Self {
        Padding {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Padding {
    pub fn zero() -> Self {
        Self::from_sides(
            Length::zero(),
            Length::zero(),
            Length::zero(),
            Length::zero(),
        )
    }

    /// The same length on all four sides.
    pub fn uniform(value: impl Into<LengthInput>) -> Result<Self, LengthError> {
        let length = parse_side(value)?;
        Ok(Self::from_sides(
            length.clone(),
            length.clone(),
            length.clone(),
            length,
        ))
    }

    /// `vertical` on top and bottom, `horizontal` on left and right.
    pub fn symmetric(
        vertical: impl Into<LengthInput>,
        horizontal: impl Into<LengthInput>,
    ) -> Result<Self, LengthError> {
        let vertical = parse_side(vertical)?;
        let horizontal = parse_side(horizontal)?;
        Ok(Self::from_sides(
            vertical.clone(),
            horizontal.clone(),
            vertical,
            horizontal,
        ))
    }

    pub fn each(
        top: impl Into<LengthInput>,
        right: impl Into<LengthInput>,
        bottom: impl Into<LengthInput>,
        left: impl Into<LengthInput>,
    ) -> Result<Self, LengthError> {
        Ok(Self::from_sides(
            parse_side(top)?,
            parse_side(right)?,
            parse_side(bottom)?,
            parse_side(left)?,
        ))
    }

    fn from_sides(top: Length, right: Length, bottom: Length, left: Length) -> Self {
        Padding {
            inner: Rc::new(PaddingInner {
                sides: RefCell::new(Sides {
                    top,
                    right,
                    bottom,
                    left,
                }),
                on_change: EventHandlerList::new(),
            }),
        }
    }

    pub fn on_change(&self) -> EventHandlerList<()> {
        self.inner.on_change.clone()
    }

    pub fn top(&self) -> Length {
        self.inner.sides.borrow().top.clone()
    }

    pub fn right(&self) -> Length {
        self.inner.sides.borrow().right.clone()
    }

    pub fn bottom(&self) -> Length {
        self.inner.sides.borrow().bottom.clone()
    }

    pub fn left(&self) -> Length {
        self.inner.sides.borrow().left.clone()
    }

    pub fn set_top(&self, value: impl Into<LengthInput>) -> Result<(), LengthError> {
        let length = parse_side(value)?;
        self.inner.sides.borrow_mut().top = length;
        self.inner.on_change.invoke(&());
        Ok(())
    }

    pub fn set_right(&self, value: impl Into<LengthInput>) -> Result<(), LengthError> {
        let length = parse_side(value)?;
        self.inner.sides.borrow_mut().right = length;
        self.inner.on_change.invoke(&());
        Ok(())
    }

    pub fn set_bottom(&self, value: impl Into<LengthInput>) -> Result<(), LengthError> {
        let length = parse_side(value)?;
        self.inner.sides.borrow_mut().bottom = length;
        self.inner.on_change.invoke(&());
        Ok(())
    }

    pub fn set_left(&self, value: impl Into<LengthInput>) -> Result<(), LengthError> {
        let length = parse_side(value)?;
        self.inner.sides.borrow_mut().left = length;
        self.inner.on_change.invoke(&());
        Ok(())
    }

    pub fn resolved_top(&self) -> Result<f64, LengthError> {
        self.top().value()
    }

    pub fn resolved_right(&self) -> Result<f64, LengthError> {
        self.right().value()
    }

    pub fn resolved_bottom(&self) -> Result<f64, LengthError> {
        self.bottom().value()
    }

    pub fn resolved_left(&self) -> Result<f64, LengthError> {
        self.left().value()
    }

    /// True when every side resolves to exactly zero.
    pub fn is_zero(&self) -> bool {
        [
            self.resolved_top(),
            self.resolved_right(),
            self.resolved_bottom(),
            self.resolved_left(),
        ]
        .iter()
        .all(|side| matches!(side, Ok(value) if *value == 0.0))
    }
}

/// Padding sides must resolve to finite, non-negative numbers at set time.
fn parse_side(value: impl Into<LengthInput>) -> Result<Length, LengthError> {
    let length = Length::parse(value, ValueSource::fixed(0.0))?;
    let resolved = length.value()?;
    if resolved < 0.0 {
        return Err(LengthError::Negative(resolved));
    }
    Ok(length)
}
