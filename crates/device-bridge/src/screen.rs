//! Screen metrics
//!
//! Static iOS screen table and the Android density/offset conversions.
//!
//! Densities are expressed the way automation sessions report them:
//! dots-per-inch divided by 100 (a 420 dpi panel has density 4.2).

use serde::{Deserialize, Serialize};

/// Scale between a reported dpi value and a density
pub const DENSITY_SCALE: f64 = 100.0;

/// Height of the Android status bar in dp
pub const ANDROID_STATUS_BAR_DP: f64 = 24.0;

/// dpi of an mdpi (1x) Android screen
pub const ANDROID_BASELINE_DPI: f64 = 160.0;

/// Screen information for a known hardware name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    /// Hardware name fragment, matched against device names
    pub name: String,
    pub density: f64,
    /// Height of the status/action bar in pixels
    pub action_bar_height: i32,
}

impl ScreenInfo {
    pub fn new(name: &str, density: f64, action_bar_height: i32) -> Self {
        Self {
            name: name.to_string(),
            density,
            action_bar_height,
        }
    }
}

/// Known iOS hardware (points scale, status bar height in pixels)
const IOS_SCREENS: &[(&str, f64, i32)] = &[
    ("iPhone SE", 2.0, 40),
    ("iPhone 5", 2.0, 40),
    ("iPhone 6", 2.0, 40),
    ("iPhone 6 Plus", 3.0, 60),
    ("iPhone 7", 2.0, 40),
    ("iPhone 7 Plus", 3.0, 60),
    ("iPhone 8", 2.0, 40),
    ("iPhone 8 Plus", 3.0, 60),
    ("iPhone X", 3.0, 132),
    ("iPhone XR", 2.0, 88),
    ("iPhone XS", 3.0, 132),
    ("iPhone XS Max", 3.0, 132),
    ("iPhone 11", 2.0, 88),
    ("iPhone 11 Pro", 3.0, 132),
    ("iPhone 11 Pro Max", 3.0, 132),
    ("iPad", 2.0, 40),
    ("iPad Pro", 2.0, 48),
];

/// Built-in iOS screen table
pub fn ios_screen_table() -> Vec<ScreenInfo> {
    IOS_SCREENS
        .iter()
        .map(|(name, density, bar)| ScreenInfo::new(name, *density, *bar))
        .collect()
}

/// Find the screen entry for a device name.
///
/// Entries match when their name is a substring of the device name. When
/// several match ("iPhone X" and "iPhone XS Max") the longest one wins.
pub fn lookup_screen<'a>(table: &'a [ScreenInfo], device_name: &str) -> Option<&'a ScreenInfo> {
    table
        .iter()
        .filter(|info| device_name.contains(info.name.as_str()))
        .max_by_key(|info| info.name.len())
}

/// Android status bar height in pixels for a density
pub fn android_screen_offset(density: f64) -> i32 {
    let px = ANDROID_STATUS_BAR_DP * density * DENSITY_SCALE / ANDROID_BASELINE_DPI;
    px.floor() as i32
}

/// Convert a reported dpi value into a density
pub fn density_from_dpi(dpi: f64) -> f64 {
    dpi / DENSITY_SCALE
}

/// Parse `wm density` output.
///
/// ```text
/// Physical density: 420
/// Override density: 480
/// ```
///
/// An override density wins over the physical one.
pub fn parse_wm_density(output: &str) -> Option<f64> {
    let mut physical = None;
    let mut overridden = None;

    for line in output.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("Physical density:") {
            physical = value.trim().parse::<f64>().ok();
        } else if let Some(value) = line.strip_prefix("Override density:") {
            overridden = value.trim().parse::<f64>().ok();
        } else if physical.is_none() {
            // bare number
            physical = line.parse::<f64>().ok();
        }
    }

    overridden.or(physical).map(density_from_dpi)
}
