use image::Rgb;
use serde::{Deserialize, Serialize};

/// A colour, expressed in RGB, CMYK, or grey colour spaces. Everything is
/// converted to 8-bit RGB when it reaches the raster.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    /// r, g, b range from 0.0 to 1.0
    Rgb { r: f32, g: f32, b: f32 },
    /// c, m, y, and k range from 0.0 to 1.0
    Cmyk { c: f32, m: f32, y: f32, k: f32 },
    /// g ranges from 0.0 (black) to 1.0 (white)
    Grey { g: f32 },
}

fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::Rgb {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the CMYK space. c, m, y, and k range from 0.0 to 1.0
    pub fn new_cmyk(c: f32, m: f32, y: f32, k: f32) -> Colour {
        Colour::Cmyk { c, m, y, k }
    }

    /// Naive device conversion to an 8-bit RGB pixel, no colour management
    pub fn to_rgb(self) -> Rgb<u8> {
        match self {
            Colour::Rgb { r, g, b } => Rgb([channel(r), channel(g), channel(b)]),
            Colour::Cmyk { c, m, y, k } => Rgb([
                channel((1.0 - c) * (1.0 - k)),
                channel((1.0 - m) * (1.0 - k)),
                channel((1.0 - y) * (1.0 - k)),
            ]),
            Colour::Grey { g } => {
                let g = channel(g);
                Rgb([g, g, g])
            }
        }
    }
}

/// Blend `fg` over `bg` with the given coverage in `0.0..=1.0`
pub(crate) fn blend(bg: Rgb<u8>, fg: Rgb<u8>, coverage: f32) -> Rgb<u8> {
    let a = coverage.clamp(0.0, 1.0);
    let mix = |b: u8, f: u8| (b as f32 * (1.0 - a) + f as f32 * a).round() as u8;
    Rgb([mix(bg[0], fg[0]), mix(bg[1], fg[1]), mix(bg[2], fg[2])])
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    pub const GREY: Colour = Colour::Grey { g: 0.5 };
}
