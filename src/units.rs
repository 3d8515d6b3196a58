use derive_more::{Add, AddAssign, Display, From, Into, MulAssign, Sub, SubAssign, Sum};
use std::ops::{Div, Mul};

/// A length in device pixels on the rendered page. Fractional values are kept
/// while laying out glyphs and only rounded when touching the raster.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    MulAssign,
    Sum,
    From,
    Into,
    Display,
)]
#[display("{_0}px")]
pub struct Px(pub f32);

/// A typographic point, 1/72 of an inch. Font sizes are specified in points
/// and converted to pixels with the configured resolution.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, From, Into, Display)]
#[display("{_0}pt")]
pub struct Pt(pub f32);

impl Pt {
    /// Convert to pixels at the given resolution (dots per inch)
    pub fn to_px(self, dpi: u32) -> Px {
        Px(self.0 * dpi as f32 / 72.0)
    }
}

impl From<u32> for Px {
    fn from(value: u32) -> Self {
        Px(value as f32)
    }
}

impl Mul<f32> for Px {
    type Output = Px;

    fn mul(self, rhs: f32) -> Px {
        Px(self.0 * rhs)
    }
}

impl Div<f32> for Px {
    type Output = Px;

    fn div(self, rhs: f32) -> Px {
        Px(self.0 / rhs)
    }
}

impl Div<Px> for Px {
    type Output = f32;

    fn div(self, rhs: Px) -> f32 {
        self.0 / rhs.0
    }
}
