//! Color themes for the formations.
//!
//! Each theme is a five-stop ramp. The shell samples the ramp around its
//! circumference; the core takes its base color from a single stop.

use crate::color::Color;
use crate::error::ConfigError;

/// Ramp stop the core formation is tinted with.
pub const CORE_STOP: usize = 1;

/// The selectable color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// Magenta, cyan, green, yellow, blue.
    Neon,

    /// Red, orange, yellow, dark red, darker red.
    #[default]
    Fire,

    /// Aqua, light blue, lime, blue, teal.
    Aqua,
}

impl Palette {
    /// All themes in index order.
    pub const ALL: [Palette; 3] = [Palette::Neon, Palette::Fire, Palette::Aqua];

    /// Look up a theme by index.
    pub fn from_index(index: usize) -> Result<Self, ConfigError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ConfigError::PaletteOutOfRange {
                index,
                available: Self::ALL.len(),
            })
    }

    /// Position of this theme in [`Palette::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Palette::Neon => 0,
            Palette::Fire => 1,
            Palette::Aqua => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Neon => "neon",
            Palette::Fire => "fire",
            Palette::Aqua => "aqua",
        }
    }

    /// Ramp stops as sRGB hex literals.
    pub fn hex_stops(&self) -> [u32; 5] {
        match self {
            Palette::Neon => [0xff00ff, 0x00ffff, 0x00ff00, 0xffff00, 0x0077ff],
            Palette::Fire => [0xff2200, 0xff8800, 0xffdd00, 0x880000, 0x440000],
            Palette::Aqua => [0x00ffaa, 0x00ddff, 0xaaff00, 0x0088cc, 0x006644],
        }
    }

    /// Ramp stops in linear RGB.
    pub fn colors(&self) -> [Color; 5] {
        self.hex_stops().map(Color::from_hex)
    }

    /// Sample the ramp at `progress` in [0, 1].
    ///
    /// Interpolates linearly between the two nearest stops. Values outside
    /// [0, 1] are clamped.
    pub fn sample(&self, progress: f32) -> Color {
        let colors = self.colors();
        let last = colors.len() - 1;
        let scaled = progress.clamp(0.0, 1.0) * last as f32;
        let c1 = (scaled.floor() as usize).min(last);
        let c2 = (c1 + 1).min(last);
        colors[c1].lerp(colors[c2], scaled.fract())
    }

    /// Base color of the core formation.
    pub fn core_color(&self) -> Color {
        self.colors()[CORE_STOP]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index() {
        assert_eq!(Palette::from_index(0).unwrap(), Palette::Neon);
        assert_eq!(Palette::from_index(1).unwrap(), Palette::Fire);
        assert_eq!(Palette::from_index(2).unwrap(), Palette::Aqua);
        assert!(matches!(
            Palette::from_index(3),
            Err(ConfigError::PaletteOutOfRange { index: 3, available: 3 })
        ));
    }

    #[test]
    fn test_index_round_trip() {
        for p in Palette::ALL {
            assert_eq!(Palette::from_index(p.index()).unwrap(), p);
        }
    }

    #[test]
    fn test_default_is_fire() {
        assert_eq!(Palette::default().index(), 1);
    }

    #[test]
    fn test_sample_hits_stops() {
        let p = Palette::Neon;
        let colors = p.colors();
        assert!(p.sample(0.0).approx_eq(&colors[0], 1e-6));
        assert!(p.sample(0.25).approx_eq(&colors[1], 1e-6));
        assert!(p.sample(1.0).approx_eq(&colors[4], 1e-6));
    }

    #[test]
    fn test_sample_midpoint_is_lerp() {
        let p = Palette::Aqua;
        let colors = p.colors();
        let expected = colors[2].lerp(colors[3], 0.5);
        assert!(p.sample(0.625).approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_core_color_is_second_stop() {
        assert_eq!(Palette::Fire.core_color(), Color::from_hex(0xff8800));
    }
}
