//! Linear RGB colors with HSL conversions.
//!
//! Colors are stored in linear RGB, the space the shaders blend in. Hex
//! literals and HSL values are interpreted in sRGB, so every conversion in
//! or out of those forms goes through the sRGB transfer functions.

/// A linear RGB color. Components are normally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Hue, saturation and lightness, each in [0, 1], measured in sRGB space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }
}

/// sRGB electro-optical transfer: encoded value to linear light.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Inverse of [`srgb_to_linear`].
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create from linear components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create from a `0xRRGGBB` sRGB literal.
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self::from_srgb(r, g, b)
    }

    /// Create from sRGB-encoded components.
    pub fn from_srgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }

    /// sRGB-encoded components.
    pub fn to_srgb(self) -> [f32; 3] {
        [linear_to_srgb(self.r), linear_to_srgb(self.g), linear_to_srgb(self.b)]
    }

    /// Linear components as an array, ready for a vertex buffer.
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub const fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// Componentwise linear interpolation in linear RGB.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// HSL of this color's sRGB encoding.
    pub fn to_hsl(self) -> Hsl {
        let [r, g, b] = self.to_srgb();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (min + max) / 2.0;

        if min == max {
            return Hsl::new(0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l <= 0.5 {
            d / (max + min)
        } else {
            d / (2.0 - max - min)
        };

        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl::new(h / 6.0, s, l)
    }

    /// Build a color from HSL in sRGB space.
    ///
    /// Hue wraps into [0, 1); saturation and lightness are clamped.
    pub fn from_hsl(hsl: Hsl) -> Self {
        let h = hsl.h.rem_euclid(1.0);
        let s = hsl.s.clamp(0.0, 1.0);
        let l = hsl.l.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::from_srgb(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        Self::from_srgb(
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        )
    }

    /// Shift hue, saturation and lightness by the given amounts.
    pub fn offset_hsl(self, dh: f32, ds: f32, dl: f32) -> Self {
        let hsl = self.to_hsl();
        Self::from_hsl(Hsl::new(hsl.h + dh, hsl.s + ds, hsl.l + dl))
    }

    pub fn approx_eq(&self, other: &Color, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
    }
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

/// Closed-form HSL to linear RGB, used on the per-frame recolor path.
///
/// Computes each channel without picking a hue sector; only the sRGB
/// transfer still branches. Matches [`Color::from_hsl`] for `h` in [0, 1).
/// Saturation and lightness are clamped the same way.
#[inline]
pub fn hsl_to_linear(h: f32, s: f32, l: f32) -> [f32; 3] {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let a = s * l.min(1.0 - l);
    let channel = |n: f32| {
        let k = (n + h * 12.0).rem_euclid(12.0);
        let srgb = l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
        srgb_to_linear(srgb)
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<Color> for [f32; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_stored_linear() {
        let c = Color::from_hex(0xff8800);
        assert!((c.r - 1.0).abs() < 1e-6);
        // 0x88 = 136 -> 0.2462 linear
        assert!((c.g - 0.2462).abs() < 1e-3);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_srgb_round_trip() {
        for i in 0..=20 {
            let v = i as f32 / 20.0;
            assert!((linear_to_srgb(srgb_to_linear(v)) - v).abs() < 1e-3);
        }
    }

    #[test]
    fn test_hsl_of_primaries() {
        let red = Color::from_hex(0xff0000).to_hsl();
        assert!(red.h.abs() < 1e-5);
        assert!((red.s - 1.0).abs() < 1e-5);
        assert!((red.l - 0.5).abs() < 1e-5);

        let cyan = Color::from_hex(0x00ffff).to_hsl();
        assert!((cyan.h - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_hsl_round_trip() {
        for hex in [0xff2200, 0x0077ff, 0xaaff00, 0x440000, 0x006644] {
            let c = Color::from_hex(hex);
            let back = Color::from_hsl(c.to_hsl());
            assert!(c.approx_eq(&back, 1e-3), "{:06x}: {:?} vs {:?}", hex, c, back);
        }
    }

    #[test]
    fn test_from_hsl_wraps_hue_and_clamps() {
        let a = Color::from_hsl(Hsl::new(1.25, 2.0, 0.5));
        let b = Color::from_hsl(Hsl::new(0.25, 1.0, 0.5));
        assert!(a.approx_eq(&b, 1e-6));

        let negative = Color::from_hsl(Hsl::new(-0.75, 1.0, 0.5));
        assert!(negative.approx_eq(&b, 1e-5));
    }

    #[test]
    fn test_gray_has_zero_saturation() {
        let gray = Color::from_srgb(0.4, 0.4, 0.4).to_hsl();
        assert_eq!(gray.s, 0.0);
        assert_eq!(gray.h, 0.0);
    }

    #[test]
    fn test_closed_form_matches_reference() {
        for hi in 0..24 {
            for &(s, l) in &[(0.7, 0.5), (1.0, 0.3), (0.85, 0.8), (0.0, 0.6), (1.15, 0.55)] {
                let h = hi as f32 / 24.0;
                let expected = Color::from_hsl(Hsl::new(h, s, l));
                let got = Color::from_array(hsl_to_linear(h, s, l));
                assert!(got.approx_eq(&expected, 1e-4), "h={} s={} l={}", h, s, l);
            }
        }
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::from_hex(0xff00ff);
        let b = Color::from_hex(0x00ffff);
        assert_eq!(a.lerp(b, 0.0), a);
        assert!(a.lerp(b, 1.0).approx_eq(&b, 1e-6));
    }
}
