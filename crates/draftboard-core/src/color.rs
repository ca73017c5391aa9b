//! Color handling for Draftboard diagrams
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Colors serialize as CSS strings (`#rrggbb`, or
//! `rgba(..)` when translucent) so published snapshots can be consumed by any
//! host renderer directly.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Srgb};
use serde::{Serialize, Serializer};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_css().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a CSS color string such as "#ff0000",
    /// "rgb(255, 0, 0)" or "red".
    ///
    /// # Examples
    ///
    /// ```
    /// use draftboard_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// assert_eq!(red.to_css(), "#ff0000");
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Builds a color from a palette literal.
    ///
    /// Only used with the compile-time palette constants in [`crate::style`],
    /// which are all valid hex colors.
    pub(crate) fn literal(hex: &str) -> Self {
        Self::new(hex).expect("palette literals are valid CSS colors")
    }

    /// Creates a new color with the specified alpha value in `0.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use draftboard_core::color::Color;
    ///
    /// let glow = Color::new("#3b82f6").unwrap().with_alpha(0.6);
    /// assert_eq!(glow.to_css(), "rgba(59, 130, 246, 0.6)");
    /// ```
    pub fn with_alpha(self, alpha: f32) -> Self {
        Color {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha component of this color.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }

    /// Renders the color as a CSS string.
    ///
    /// Opaque colors use the `#rrggbb` form, translucent colors use
    /// `rgba(r, g, b, a)` with the alpha rounded to two decimals.
    pub fn to_css(&self) -> String {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        let alpha = self.alpha();
        if alpha >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
        } else {
            let alpha = (alpha * 100.0).round() / 100.0;
            format!("rgba({}, {}, {}, {alpha})", rgba.r, rgba.g, rgba.b)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::literal("#000000")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}
