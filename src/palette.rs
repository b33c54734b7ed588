use crate::error::{DashboardError, Result};
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;

pub const DARK_TO_LIGHT: &str = "Dark-To-Light";
pub const CONTRASTING: &str = "Contrasting-1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Swatch {
    pub name: &'static str,
    pub hex: &'static str,
}

/// Named, ordered list of swatches, indexed cyclically
#[derive(Debug, PartialEq, Eq)]
pub struct ColorPalette {
    pub name: &'static str,
    swatches: &'static [Swatch],
}

impl ColorPalette {
    /// Swatch at `index mod len`
    pub fn swatch(&self, index: usize) -> Swatch {
        self.swatches[index % self.swatches.len()]
    }

    pub fn color(&self, index: usize) -> &'static str {
        self.swatch(index).hex
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}

// Palettes should stay accessible under WCAG contrast rules.
const DARK_TO_LIGHT_SWATCHES: [Swatch; 5] = [
    Swatch { name: "green", hex: "#029356" },
    Swatch { name: "teal", hex: "#009EB0" },
    Swatch { name: "blue", hex: "#0073E6" },
    Swatch { name: "indigo", hex: "#606FF3" },
    Swatch { name: "violet", hex: "#9B8BF4" },
];

const CONTRASTING_SWATCHES: [Swatch; 5] = [
    Swatch { name: "dark-orange", hex: "#C44601" },
    Swatch { name: "orange", hex: "#F57600" },
    Swatch { name: "baby-blue", hex: "#8BABF1" },
    Swatch { name: "blue", hex: "#0073E6" },
    Swatch { name: "dark-blue", hex: "#054FB9" },
];

lazy_static! {
    static ref PALETTES: HashMap<&'static str, ColorPalette> = {
        let mut palettes = HashMap::new();
        palettes.insert(
            DARK_TO_LIGHT,
            ColorPalette {
                name: DARK_TO_LIGHT,
                swatches: &DARK_TO_LIGHT_SWATCHES,
            },
        );
        palettes.insert(
            CONTRASTING,
            ColorPalette {
                name: CONTRASTING,
                swatches: &CONTRASTING_SWATCHES,
            },
        );
        palettes
    };
}

/// Looks up a registered palette by name
pub fn palette(name: &str) -> Result<&'static ColorPalette> {
    PALETTES
        .get(name)
        .ok_or_else(|| DashboardError::UnknownPalette(name.to_string()))
}

/// Hex code of the swatch at `index` in the named palette
///
/// # Examples
/// ```
/// use dashboard::palette::{palette_color, DARK_TO_LIGHT};
///
/// assert_eq!(palette_color(DARK_TO_LIGHT, 0).unwrap(), "#029356");
/// assert_eq!(palette_color(DARK_TO_LIGHT, 5).unwrap(), "#029356");
/// assert!(palette_color("Neon", 0).is_err());
/// ```
pub fn palette_color(name: &str, index: usize) -> Result<&'static str> {
    Ok(palette(name)?.color(index))
}
