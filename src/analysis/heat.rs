//! Heat scale: session-wide min/max and the monochrome cell palette

/// Hue of every heat cell (blue)
pub const HEAT_HUE: f64 = 210.0;

/// Saturation of every heat cell
pub const HEAT_SATURATION: f64 = 0.70;

/// Lightness range of heat cells in percent
pub const HEAT_LIGHTNESS_MIN: f64 = 20.0;
pub const HEAT_LIGHTNESS_MAX: f64 = 85.0;

/// Cells at or above this lightness get dark text
pub const DARK_TEXT_THRESHOLD: f64 = 60.0;

/// `#0b0b0b`
pub const DARK_TEXT: [u8; 4] = [0x0b, 0x0b, 0x0b, 255];

/// `#e5e7eb`
pub const LIGHT_TEXT: [u8; 4] = [0xe5, 0xe7, 0xeb, 255];

/// Colors of one painted grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStyle {
    /// Lightness in percent, in `[20, 85]`
    pub lightness: f64,
    pub background: [u8; 4],
    pub text: [u8; 4],
}

/// Running min/max over every value seen in the session.
///
/// The bounds only ever widen; a new session starts with a fresh scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeatScale {
    bounds: Option<(f64, f64)>,
}

impl HeatScale {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the bounds to include every finite value in `values`
    pub fn observe(&mut self, values: &[f64]) {
        for &v in values.iter().filter(|v| v.is_finite()) {
            self.bounds = Some(match self.bounds {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.bounds.map(|(lo, _)| lo)
    }

    pub fn max(&self) -> Option<f64> {
        self.bounds.map(|(_, hi)| hi)
    }

    /// Position of `value` within the bounds, clamped to `[0, 1]`.
    ///
    /// Returns 0.5 when nothing has been observed, when min equals max,
    /// or when the result is not finite.
    pub fn normalize(&self, value: f64) -> f64 {
        let Some((lo, hi)) = self.bounds else {
            return 0.5;
        };
        if hi == lo {
            return 0.5;
        }
        let t = (value - lo) / (hi - lo);
        if !t.is_finite() {
            return 0.5;
        }
        t.clamp(0.0, 1.0)
    }

    /// Colors for a cell showing `value`
    pub fn cell_style(&self, value: f64) -> CellStyle {
        let t = self.normalize(value);
        let lightness = (HEAT_LIGHTNESS_MIN + 65.0 * t).clamp(HEAT_LIGHTNESS_MIN, HEAT_LIGHTNESS_MAX);
        CellStyle {
            lightness,
            background: hsl_to_rgb(HEAT_HUE, HEAT_SATURATION, lightness / 100.0),
            text: if lightness >= DARK_TEXT_THRESHOLD {
                DARK_TEXT
            } else {
                LIGHT_TEXT
            },
        }
    }
}

/// Convert HSL (hue 0-360, saturation 0-1, lightness 0-1) to RGBA
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 4] {
    let hue = hue.rem_euclid(360.0);
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
        255,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unobserved_scale_is_midpoint() {
        let scale = HeatScale::new();
        assert_eq!(scale.normalize(123.0), 0.5);
        assert_eq!(scale.min(), None);
    }

    #[test]
    fn test_equal_bounds_is_midpoint() {
        let mut scale = HeatScale::new();
        scale.observe(&[42.0, 42.0]);
        assert_eq!(scale.normalize(42.0), 0.5);
        assert_eq!(scale.normalize(1000.0), 0.5);
    }

    #[test]
    fn test_bounds_only_widen() {
        let mut scale = HeatScale::new();
        scale.observe(&[10.0, 20.0]);
        scale.observe(&[15.0]);
        assert_eq!((scale.min(), scale.max()), (Some(10.0), Some(20.0)));
        scale.observe(&[5.0, 30.0]);
        assert_eq!((scale.min(), scale.max()), (Some(5.0), Some(30.0)));
        scale.observe(&[]);
        assert_eq!((scale.min(), scale.max()), (Some(5.0), Some(30.0)));
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let mut scale = HeatScale::new();
        scale.observe(&[f64::NAN, 1.0, f64::INFINITY, 3.0]);
        assert_eq!((scale.min(), scale.max()), (Some(1.0), Some(3.0)));
        assert_eq!(scale.normalize(f64::NAN), 0.5);
    }

    #[test]
    fn test_normalize_clamps() {
        let mut scale = HeatScale::new();
        scale.observe(&[0.0, 100.0]);
        assert_eq!(scale.normalize(50.0), 0.5);
        assert_eq!(scale.normalize(-10.0), 0.0);
        assert_eq!(scale.normalize(250.0), 1.0);
    }

    #[test]
    fn test_cell_style_text_contrast() {
        let mut scale = HeatScale::new();
        scale.observe(&[0.0, 100.0]);

        let low = scale.cell_style(0.0);
        assert_eq!(low.lightness, 20.0);
        assert_eq!(low.text, LIGHT_TEXT);

        let high = scale.cell_style(100.0);
        assert_eq!(high.lightness, 85.0);
        assert_eq!(high.text, DARK_TEXT);

        assert_eq!(scale.cell_style(70.0).text, DARK_TEXT);
        assert_eq!(scale.cell_style(30.0).text, LIGHT_TEXT);
    }

    #[test]
    fn test_hsl_to_rgb() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0, 255]);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), [0, 255, 0, 255]);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), [0, 0, 255, 255]);
        assert_eq!(hsl_to_rgb(210.0, 0.0, 1.0), [255, 255, 255, 255]);
        // hsl(210, 70%, 20%)
        assert_eq!(hsl_to_rgb(210.0, 0.7, 0.2), [15, 51, 87, 255]);
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_normalize_is_monotone_and_bounded(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..50),
            a in -2.0e6f64..2.0e6,
            b in -2.0e6f64..2.0e6,
        ) {
            let mut scale = HeatScale::new();
            scale.observe(&values);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (tl, th) = (scale.normalize(lo), scale.normalize(hi));
            prop_assert!((0.0..=1.0).contains(&tl));
            prop_assert!((0.0..=1.0).contains(&th));
            prop_assert!(tl <= th);
        }

        #[test]
        fn test_normalize_is_deterministic(
            values in prop::collection::vec(-1.0e3f64..1.0e3, 1..20),
            v in -1.0e3f64..1.0e3,
        ) {
            let mut scale = HeatScale::new();
            scale.observe(&values);
            prop_assert_eq!(scale.normalize(v), scale.normalize(v));
        }
    }
}
