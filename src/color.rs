use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Qualitative palettes
// ---------------------------------------------------------------------------

/// Colour-blind safe qualitative palette, used first.
pub const SAFE: [Srgb<u8>; 11] = [
    Srgb::new(136, 204, 238),
    Srgb::new(204, 102, 119),
    Srgb::new(221, 204, 119),
    Srgb::new(17, 119, 51),
    Srgb::new(51, 34, 136),
    Srgb::new(170, 68, 153),
    Srgb::new(68, 170, 153),
    Srgb::new(153, 153, 51),
    Srgb::new(136, 34, 85),
    Srgb::new(102, 17, 0),
    Srgb::new(136, 136, 136),
];

/// Appended after [`SAFE`] once there are more stores than it has colours.
pub const SET2: [Srgb<u8>; 8] = [
    Srgb::new(102, 194, 165),
    Srgb::new(252, 141, 98),
    Srgb::new(141, 160, 203),
    Srgb::new(231, 138, 195),
    Srgb::new(166, 216, 84),
    Srgb::new(255, 217, 47),
    Srgb::new(229, 196, 148),
    Srgb::new(179, 179, 179),
];

/// Palette colour for the `index`-th store: SAFE, then SET2, then wrap around.
pub fn palette_color(index: usize) -> Srgb<u8> {
    let i = index % (SAFE.len() + SET2.len());
    if i < SAFE.len() {
        SAFE[i]
    } else {
        SET2[i - SAFE.len()]
    }
}

fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: store → Color32
// ---------------------------------------------------------------------------

/// Maps each store to a fixed colour shared by every chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the store domain. Colours are handed out in
    /// sorted store order, whatever order `stores` comes in.
    pub fn new<'a>(stores: impl IntoIterator<Item = &'a String>) -> Self {
        let mut sorted: Vec<&String> = stores.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        let mapping = sorted
            .into_iter()
            .enumerate()
            .map(|(i, store)| (store.clone(), to_color32(palette_color(i))))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given store.
    pub fn color_for(&self, store: &str) -> Color32 {
        self.mapping
            .get(store)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Whether this map was built for exactly this sorted store domain.
    pub fn is_for(&self, stores: &[String]) -> bool {
        self.mapping.keys().eq(stores.iter())
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }
}
